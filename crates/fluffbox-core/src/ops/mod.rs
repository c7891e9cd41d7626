//! Runtime operations: install, activate, delete, run, check.

pub mod check;
pub mod context;
pub mod delete;
pub mod error;
pub mod install;
pub mod run;
pub mod switch;

pub use check::check_accessible;
pub use context::Context;
pub use delete::{clear_all, delete_version};
pub use error::ManagerError;
pub use install::install_release;
pub use run::run_with_active;
pub use switch::{activate, rewrite_path};
