//! fluffbox - side-by-side runtime versions
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Installs Node.js, Python and Java releases next to each other and
//! switches which one new shells see.
//!
//! # Directory Layout
//!
//! ```text
//! <FLUFFBOX_HOME>/
//! ├── nodejs_versions/
//! │   ├── v20.11.1/
//! │   └── current -> v20.11.1
//! ├── python_versions/
//! ├── java_versions/
//! ├── tmp/          # In-flight downloads
//! └── env.sh        # Sourced by the shell profile (Unix)
//! ```

pub mod cmd;
pub mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fluffbox_core::{Config, Reporter, RuntimeManager};
use fluffbox_schema::RuntimeKind;

#[derive(Debug, Parser)]
#[command(name = "fluffbox")]
#[command(author, version = env!("FLUFFBOX_VERSION"), about = "Side-by-side Node.js, Python and Java versions")]
pub struct Cli {
    /// Managed root directory
    #[arg(long, global = true, env = "FLUFFBOX_HOME")]
    pub home: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, env = "FLUFFBOX_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List releases available for this platform
    Available {
        /// Runtime kind (node, python, java)
        kind: RuntimeKind,
        /// Only show long-term-support releases
        #[arg(long)]
        lts: bool,
        /// Maximum number of releases to show (0 for all)
        #[arg(long, short = 'n', default_value_t = 20)]
        limit: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List installed versions
    List {
        /// Restrict to one runtime kind
        kind: Option<RuntimeKind>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Check whether each runtime is reachable
    Check {
        /// Restrict to one runtime kind
        kind: Option<RuntimeKind>,
    },
    /// Download and install a version
    Install {
        /// Runtime kind (node, python, java)
        kind: RuntimeKind,
        /// Version as listed by `available`
        version: String,
    },
    /// Make an installed version the active one
    Use {
        /// Runtime kind (node, python, java)
        kind: RuntimeKind,
        /// Installed version
        version: String,
    },
    /// Remove an installed version
    Remove {
        /// Runtime kind (node, python, java)
        kind: RuntimeKind,
        /// Installed version
        version: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Remove every installed version of a runtime
    Clear {
        /// Runtime kind (node, python, java)
        kind: RuntimeKind,
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Run a command with the active version first on PATH
    Run {
        /// Runtime kind (node, python, java)
        kind: RuntimeKind,
        /// Program to run (e.g. node, npm, pip, javac)
        program: String,
        /// Arguments for the program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Assemble configuration from flags and `FLUFFBOX_*` variables.
pub fn load_config(home: Option<PathBuf>, timeout: Option<u64>) -> Result<Config> {
    let mut config = match home {
        Some(home) => Config::new(home).with_env_overrides()?,
        None => Config::from_env()?,
    };
    if let Some(secs) = timeout {
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

/// Build the manager for the host platform.
pub fn build_manager(config: &Config, reporter: Arc<dyn Reporter>) -> Result<RuntimeManager> {
    tracing::debug!(home = %config.home.display(), "Using managed root");
    RuntimeManager::new(config, reporter).context("Failed to initialise runtime manager")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_keeps_hyphenated_args() {
        let cli = Cli::parse_from(["fluffbox", "run", "node", "node", "-e", "1"]);
        match cli.command {
            Commands::Run { kind, program, args } => {
                assert_eq!(kind, RuntimeKind::Node);
                assert_eq!(program, "node");
                assert_eq!(args, vec!["-e", "1"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_kind_aliases_parse() {
        let cli = Cli::parse_from(["fluffbox", "use", "jdk", "21.0.2+13"]);
        assert!(matches!(
            cli.command,
            Commands::Use {
                kind: RuntimeKind::Java,
                ..
            }
        ));
    }

    #[test]
    fn test_timeout_flag_overrides() {
        let config = load_config(Some(PathBuf::from("/tmp/fb")), Some(5)).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.home, PathBuf::from("/tmp/fb"));
    }
}
