//! Shared types for fluffbox.
//!
//! This crate holds the vocabulary every other fluffbox crate speaks: which
//! runtime kinds exist, how the host platform is named by each upstream, what
//! a downloadable release looks like, and how version identifiers are ordered.
//! It performs no I/O.

pub mod kind;
pub mod platform;
pub mod types;
pub mod version;

pub use kind::RuntimeKind;
pub use platform::{Arch, KindPlatform, Os, Platform, PlatformError};
pub use types::*;
pub use version::{compare_versions, sort_descending};
