//! Shared operation context.
//!
//! Groups the state every operation needs so signatures stay short.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use fluffbox_schema::Platform;

use crate::Reporter;
use crate::env::Environment;

/// Groups common state used by install, activate and delete.
#[derive(Clone)]
pub struct Context {
    pub home: PathBuf,
    pub platform: Platform,
    pub client: reqwest::Client,
    pub env: Arc<Environment>,
    pub reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("home", &self.home)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}
