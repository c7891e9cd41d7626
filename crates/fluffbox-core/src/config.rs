//! Runtime configuration.
//!
//! Every upstream URL is configurable so that tests (and users behind a
//! mirror) can point the catalog resolver somewhere else.

use std::path::PathBuf;
use std::time::Duration;

use crate::paths::try_fluffbox_home;

/// Default Node.js distribution mirror.
pub const DEFAULT_NODE_MIRROR: &str = "https://nodejs.org/dist";
/// Default python.org FTP root, holding the Windows package indices.
pub const DEFAULT_PYTHON_INDEX: &str = "https://www.python.org/ftp/python";
/// Default GitHub API endpoint for python-build-standalone releases.
pub const DEFAULT_PYTHON_STANDALONE: &str =
    "https://api.github.com/repos/astral-sh/python-build-standalone/releases";
/// Default Eclipse Adoptium API root.
pub const DEFAULT_ADOPTIUM_API: &str = "https://api.adoptium.net/v3";

/// Default whole-request timeout. Runtime archives run to a few hundred MB.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while assembling a [`Config`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine a home directory. Set FLUFFBOX_HOME to override.")]
    NoHome,

    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Where fluffbox keeps its files and where it looks for releases.
#[derive(Debug, Clone)]
pub struct Config {
    /// Managed root directory (`<home>/<kind>_versions/...`).
    pub home: PathBuf,
    /// Node.js distribution base (`<mirror>/index.json`, `<mirror>/<v>/<file>`).
    pub node_mirror: String,
    /// python.org FTP base holding `index-windows-*.json`.
    pub python_index: String,
    /// GitHub releases API URL for python-build-standalone.
    pub python_standalone: String,
    /// Adoptium API base (`<api>/info/available_releases`).
    pub adoptium_api: String,
    /// Whole-request HTTP timeout.
    pub timeout: Duration,
    /// HTTP connect timeout.
    pub connect_timeout: Duration,
}

impl Config {
    /// Configuration rooted at `home` with the public upstreams.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            node_mirror: DEFAULT_NODE_MIRROR.to_string(),
            python_index: DEFAULT_PYTHON_INDEX.to_string(),
            python_standalone: DEFAULT_PYTHON_STANDALONE.to_string(),
            adoptium_api: DEFAULT_ADOPTIUM_API.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Point every upstream at `base` (used by tests with a mock server).
    pub fn with_upstream_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.node_mirror = format!("{base}/node");
        self.python_index = format!("{base}/python");
        self.python_standalone = format!("{base}/standalone/releases");
        self.adoptium_api = format!("{base}/adoptium/v3");
        self
    }

    /// Read configuration from `FLUFFBOX_*` environment variables.
    ///
    /// # Errors
    ///
    /// Fails when no home directory can be resolved or a timeout value does
    /// not parse as whole seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = try_fluffbox_home().ok_or(ConfigError::NoHome)?;
        Self::new(home).with_env_overrides()
    }

    /// Apply the upstream and timeout overrides from `FLUFFBOX_*` variables,
    /// keeping `home` as is.
    ///
    /// # Errors
    ///
    /// Fails when a timeout value does not parse as whole seconds.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let mut config = self;

        if let Some(v) = env_nonempty("FLUFFBOX_NODE_MIRROR") {
            config.node_mirror = v;
        }
        if let Some(v) = env_nonempty("FLUFFBOX_PYTHON_INDEX") {
            config.python_index = v;
        }
        if let Some(v) = env_nonempty("FLUFFBOX_PYTHON_STANDALONE") {
            config.python_standalone = v;
        }
        if let Some(v) = env_nonempty("FLUFFBOX_ADOPTIUM_API") {
            config.adoptium_api = v;
        }
        if let Some(v) = env_nonempty("FLUFFBOX_TIMEOUT_SECS") {
            config.timeout = parse_secs("FLUFFBOX_TIMEOUT_SECS", &v)?;
        }

        Ok(config)
    }

    /// Build the shared HTTP client. Redirects are followed (reqwest's default
    /// policy, up to 10 hops).
    ///
    /// # Errors
    ///
    /// Fails only if the TLS backend cannot be initialised.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()
    }
}

fn env_nonempty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a whole number of seconds.
pub fn parse_secs(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::Invalid {
            var,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_base_rewrites_all_urls() {
        let config = Config::new("/tmp/fb").with_upstream_base("http://127.0.0.1:1234/");
        assert_eq!(config.node_mirror, "http://127.0.0.1:1234/node");
        assert_eq!(config.python_index, "http://127.0.0.1:1234/python");
        assert_eq!(config.adoptium_api, "http://127.0.0.1:1234/adoptium/v3");
        assert!(config.python_standalone.ends_with("/standalone/releases"));
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(
            parse_secs("FLUFFBOX_TIMEOUT_SECS", " 45 ").unwrap(),
            Duration::from_secs(45)
        );
        assert!(matches!(
            parse_secs("FLUFFBOX_TIMEOUT_SECS", "soon"),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
