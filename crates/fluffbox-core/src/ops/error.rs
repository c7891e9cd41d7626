//! Domain-specific errors for runtime operations

use std::path::PathBuf;

use fluffbox_schema::{PlatformError, RuntimeKind};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::env::EnvError;
use crate::io::download::DownloadError;
use crate::io::extract::ExtractError;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Environment update failed: {0}")]
    Environment(#[from] EnvError),

    #[error("{kind} {version} not found")]
    NotFound { kind: RuntimeKind, version: String },

    #[error("{kind} {version} is the active version and cannot be deleted")]
    ActiveVersionUndeletable { kind: RuntimeKind, version: String },

    #[error("{kind} {version} is incomplete or missing (expected {})", expected.display())]
    IncompleteInstallation {
        kind: RuntimeKind,
        version: String,
        expected: PathBuf,
    },

    #[error("No active {0} version. Activate one first.")]
    NoActiveVersion(RuntimeKind),

    #[error("Command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error(transparent)]
    UnsupportedPlatform(#[from] PlatformError),

    #[error("{context}: {message}")]
    Context {
        context: &'static str,
        message: String,
    },
}

impl ManagerError {
    /// Create an error with context for better debugging.
    pub fn context(ctx: &'static str, msg: impl std::fmt::Display) -> Self {
        Self::Context {
            context: ctx,
            message: msg.to_string(),
        }
    }
}

impl From<DownloadError> for ManagerError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Http(e) => Self::Network(e.to_string()),
            DownloadError::Io(e) => Self::Io(e),
        }
    }
}

impl From<CatalogError> for ManagerError {
    fn from(err: CatalogError) -> Self {
        if err.is_network() {
            Self::Network(err.to_string())
        } else {
            Self::Parse(err.to_string())
        }
    }
}
