//! Core library for fluffbox: catalog resolution, installation, switching
//! and removal of Node.js, Python and Java runtimes.

pub mod catalog;
pub mod config;
pub mod env;
pub mod io;
pub mod link;
pub mod manager;
pub mod ops;
pub mod paths;
pub mod registry;
pub mod reporter;
pub mod runtimes;

pub use config::{Config, ConfigError};
pub use env::{EnvStore, Environment};
pub use manager::RuntimeManager;
pub use ops::ManagerError;
pub use paths::*;
pub use reporter::{NullReporter, Reporter};
pub use runtimes::Runtime;

/// User Agent string for upstream requests
pub const USER_AGENT: &str = concat!("fluffbox/", env!("CARGO_PKG_VERSION"));
