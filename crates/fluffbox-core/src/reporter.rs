//! Reporter trait for dependency injection
//!
//! Lets the manager report progress and status without being coupled to a
//! specific terminal or GUI front-end.

use fluffbox_schema::RuntimeKind;

pub trait Reporter: Send + Sync {
    /// Indicates a new section or phase has started (e.g. "Fetching", "Installing").
    fn section(&self, title: &str);

    /// Updates the progress of a download.
    fn downloading(&self, kind: RuntimeKind, version: &str, current: u64, total: Option<u64>);

    /// A downloaded archive is being unpacked.
    fn extracting(&self, kind: RuntimeKind, version: &str);

    /// Marks an operation on a version as successfully completed.
    fn done(&self, kind: RuntimeKind, version: &str, detail: &str);

    /// Marks an operation on a version as failed with a specific reason.
    fn failed(&self, kind: RuntimeKind, version: &str, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn downloading(&self, kind: RuntimeKind, version: &str, current: u64, total: Option<u64>) {
        (**self).downloading(kind, version, current, total);
    }
    fn extracting(&self, kind: RuntimeKind, version: &str) {
        (**self).extracting(kind, version);
    }
    fn done(&self, kind: RuntimeKind, version: &str, detail: &str) {
        (**self).done(kind, version, detail);
    }
    fn failed(&self, kind: RuntimeKind, version: &str, reason: &str) {
        (**self).failed(kind, version, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn downloading(&self, _: RuntimeKind, _: &str, _: u64, _: Option<u64>) {}
    fn extracting(&self, _: RuntimeKind, _: &str) {}
    fn done(&self, _: RuntimeKind, _: &str, _: &str) {}
    fn failed(&self, _: RuntimeKind, _: &str, _: &str) {}
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
}
