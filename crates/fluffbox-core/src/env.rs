//! Persistent environment variables.
//!
//! Activation changes variables that must outlive this process: the user's
//! `PATH` and, for Java, `JAVA_HOME`. Where they live depends on the host:
//! the per-user registry hive on Windows, a sourced shell snippet on Unix.
//! [`Environment`] serialises every read-modify-write against the store so
//! two kinds being activated at once cannot lose each other's `PATH` edit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fluffbox_schema::Os;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{program} failed: {message}")]
    Command { program: String, message: String },

    #[error("Could not locate the shell profile to update")]
    NoProfile,
}

/// A durable, user-level variable store.
#[async_trait]
pub trait EnvStore: Send + Sync {
    /// Current persistent value of `name`, if set.
    async fn get(&self, name: &str) -> Result<Option<String>, EnvError>;

    /// Persist `value` for `name`. Only new shells or sessions observe it.
    async fn set(&self, name: &str, value: &str) -> Result<(), EnvError>;

    /// Separator between `PATH` entries in this store.
    fn path_separator(&self) -> char;
}

/// Coordinator for read-modify-write cycles on an [`EnvStore`].
pub struct Environment {
    store: Arc<dyn EnvStore>,
    lock: Mutex<()>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment").finish_non_exhaustive()
    }
}

impl Environment {
    pub fn new(store: Arc<dyn EnvStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// The user-level store for `os`, keeping its Unix snippet under `home`.
    pub fn for_host(os: Os, home: &Path) -> Self {
        match os {
            Os::Windows => Self::new(Arc::new(WindowsUserStore)),
            Os::MacOs | Os::Linux => Self::new(Arc::new(ProfileStore::for_user(home))),
        }
    }

    pub fn path_separator(&self) -> char {
        self.store.path_separator()
    }

    pub async fn get(&self, name: &str) -> Result<Option<String>, EnvError> {
        let _guard = self.lock.lock().await;
        self.store.get(name).await
    }

    pub async fn set(&self, name: &str, value: &str) -> Result<(), EnvError> {
        let _guard = self.lock.lock().await;
        self.store.set(name, value).await
    }

    /// Replace `name` with `transform(current)` atomically with respect to
    /// other updates through this coordinator. Returns the written value.
    pub async fn update<F>(&self, name: &str, transform: F) -> Result<String, EnvError>
    where
        F: FnOnce(Option<String>) -> String + Send,
    {
        let _guard = self.lock.lock().await;
        let current = self.store.get(name).await?;
        let next = transform(current);
        self.store.set(name, &next).await?;
        tracing::debug!(name, "Persisted environment variable");
        Ok(next)
    }
}

/// Per-user variables on Windows (`HKCU\Environment`), through PowerShell.
///
/// `setx` truncates values at 1024 characters, which long `PATH`s exceed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsUserStore;

impl WindowsUserStore {
    async fn powershell(script: &str, value: Option<&str>) -> Result<String, EnvError> {
        let mut cmd = tokio::process::Command::new("powershell");
        cmd.args(["-NoProfile", "-NonInteractive", "-Command", script]);
        if let Some(value) = value {
            // Passed through the environment to avoid quoting the value.
            cmd.env("FLUFFBOX_ENV_VALUE", value);
        }

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(EnvError::Command {
                program: "powershell".to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[async_trait]
impl EnvStore for WindowsUserStore {
    async fn get(&self, name: &str) -> Result<Option<String>, EnvError> {
        if !is_valid_name(name) {
            return Ok(None);
        }
        let script = format!("[Environment]::GetEnvironmentVariable('{name}', 'User')");
        let value = Self::powershell(&script, None).await?;
        Ok((!value.is_empty()).then_some(value))
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), EnvError> {
        if !is_valid_name(name) {
            return Err(EnvError::Command {
                program: "powershell".to_string(),
                message: format!("invalid variable name {name:?}"),
            });
        }
        let script = format!(
            "[Environment]::SetEnvironmentVariable('{name}', $env:FLUFFBOX_ENV_VALUE, 'User')"
        );
        Self::powershell(&script, Some(value)).await.map(|_| ())
    }

    fn path_separator(&self) -> char {
        ';'
    }
}

/// Variables persisted in a shell snippet (`<home>/env.sh`) that the user's
/// shell profile sources.
///
/// `PATH` is stored with a literal `$PATH` entry so the login `PATH` is
/// extended rather than frozen; an unset `PATH` therefore reads as `$PATH`.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    env_file: PathBuf,
    profile: Option<PathBuf>,
}

const ENV_FILE_HEADER: &str = "# Managed by fluffbox. Changes are overwritten on activation.\n";

impl ProfileStore {
    pub fn new(env_file: impl Into<PathBuf>, profile: Option<PathBuf>) -> Self {
        Self {
            env_file: env_file.into(),
            profile,
        }
    }

    /// Snippet at `<home>/env.sh`, sourced from the profile matching `$SHELL`.
    pub fn for_user(home: &Path) -> Self {
        let shell = std::env::var("SHELL").unwrap_or_default();
        let profile = dirs::home_dir().map(|h| h.join(profile_name(&shell)));
        Self::new(home.join("env.sh"), profile)
    }

    pub fn env_file(&self) -> &Path {
        &self.env_file
    }

    async fn read_vars(&self) -> Result<Vec<(String, String)>, EnvError> {
        match tokio::fs::read_to_string(&self.env_file).await {
            Ok(content) => Ok(content.lines().filter_map(parse_export).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_vars(&self, vars: &[(String, String)]) -> Result<(), EnvError> {
        let mut content = String::from(ENV_FILE_HEADER);
        for (name, value) in vars {
            content.push_str(&format!("export {name}=\"{}\"\n", escape(value)));
        }

        if let Some(parent) = self.env_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.env_file.with_extension("sh.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.env_file).await?;
        Ok(())
    }

    /// Append a line sourcing the snippet to the profile, once.
    async fn ensure_sourced(&self) -> Result<(), EnvError> {
        let profile = self.profile.as_ref().ok_or(EnvError::NoProfile)?;
        let line = format!(". \"{}\"", self.env_file.display());

        let existing = match tokio::fs::read_to_string(profile).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        if existing.lines().any(|l| l.trim() == line) {
            return Ok(());
        }

        let mut appended = existing;
        if !appended.is_empty() && !appended.ends_with('\n') {
            appended.push('\n');
        }
        appended.push_str("\n# fluffbox\n");
        appended.push_str(&line);
        appended.push('\n');
        tokio::fs::write(profile, appended).await?;
        tracing::info!(profile = %profile.display(), "Added fluffbox to shell profile");
        Ok(())
    }
}

#[async_trait]
impl EnvStore for ProfileStore {
    async fn get(&self, name: &str) -> Result<Option<String>, EnvError> {
        let vars = self.read_vars().await?;
        let value = vars.into_iter().find(|(n, _)| n == name).map(|(_, v)| v);
        if value.is_none() && name == "PATH" {
            return Ok(Some("$PATH".to_string()));
        }
        Ok(value)
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), EnvError> {
        let mut vars = self.read_vars().await?;
        match vars.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => vars.push((name.to_string(), value.to_string())),
        }
        self.write_vars(&vars).await?;
        self.ensure_sourced().await
    }

    fn path_separator(&self) -> char {
        ':'
    }
}

fn profile_name(shell: &str) -> &'static str {
    if shell.ends_with("zsh") {
        ".zshrc"
    } else if shell.ends_with("bash") {
        ".bashrc"
    } else {
        ".profile"
    }
}

/// Escape for a double-quoted shell string, leaving `$` live so `$PATH` expands.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_export(line: &str) -> Option<(String, String)> {
    let rest = line.trim().strip_prefix("export ")?;
    let (name, value) = rest.split_once('=')?;
    let value = value.strip_prefix('"')?.strip_suffix('"')?;
    Some((name.to_string(), unescape(value)))
}

/// In-memory store for tests and embedders.
#[derive(Debug)]
pub struct MemoryStore {
    vars: std::sync::Mutex<HashMap<String, String>>,
    separator: char,
}

impl MemoryStore {
    pub fn new(separator: char) -> Self {
        Self {
            vars: std::sync::Mutex::new(HashMap::new()),
            separator,
        }
    }

    pub fn with_var(self, name: &str, value: &str) -> Self {
        if let Ok(mut vars) = self.vars.lock() {
            vars.insert(name.to_string(), value.to_string());
        }
        self
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.vars.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EnvStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<String>, EnvError> {
        Ok(self.vars.lock().ok().and_then(|v| v.get(name).cloned()))
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), EnvError> {
        if let Ok(mut vars) = self.vars.lock() {
            vars.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    fn path_separator(&self) -> char {
        self.separator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_escape_roundtrip_keeps_dollar() {
        let raw = r#"/opt/a "b"/c\d:$PATH"#;
        let escaped = escape(raw);
        assert!(escaped.contains("$PATH"));
        assert_eq!(unescape(&escaped), raw);
    }

    #[test]
    fn test_profile_choice() {
        assert_eq!(profile_name("/bin/zsh"), ".zshrc");
        assert_eq!(profile_name("/usr/bin/bash"), ".bashrc");
        assert_eq!(profile_name("/usr/bin/fish"), ".profile");
        assert_eq!(profile_name(""), ".profile");
    }

    #[tokio::test]
    async fn test_profile_store_persists_and_sources_once() {
        let dir = tempdir().unwrap();
        let profile = dir.path().join(".bashrc");
        std::fs::write(&profile, "alias ll='ls -l'").unwrap();
        let store = ProfileStore::new(dir.path().join("fb/env.sh"), Some(profile.clone()));

        assert_eq!(store.get("PATH").await.unwrap().as_deref(), Some("$PATH"));
        assert_eq!(store.get("JAVA_HOME").await.unwrap(), None);

        store.set("PATH", "/fb/java_versions/current/bin:$PATH").await.unwrap();
        store.set("JAVA_HOME", "/fb/java_versions/current").await.unwrap();
        store.set("PATH", "/fb/nodejs_versions/current/bin:$PATH").await.unwrap();

        assert_eq!(
            store.get("PATH").await.unwrap().as_deref(),
            Some("/fb/nodejs_versions/current/bin:$PATH")
        );
        assert_eq!(
            store.get("JAVA_HOME").await.unwrap().as_deref(),
            Some("/fb/java_versions/current")
        );

        let env_sh = std::fs::read_to_string(store.env_file()).unwrap();
        assert!(env_sh.contains("export JAVA_HOME=\"/fb/java_versions/current\"\n"));

        let rc = std::fs::read_to_string(&profile).unwrap();
        assert!(rc.starts_with("alias ll='ls -l'\n"));
        assert_eq!(rc.matches("env.sh").count(), 1);
    }

    #[tokio::test]
    async fn test_update_is_serialised() {
        let env = Arc::new(Environment::new(Arc::new(
            MemoryStore::new(':').with_var("PATH", "base"),
        )));

        let mut handles = Vec::new();
        for i in 0..16 {
            let env = Arc::clone(&env);
            handles.push(tokio::spawn(async move {
                env.update("PATH", |old| format!("p{i}:{}", old.unwrap_or_default()))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let path = env.get("PATH").await.unwrap().unwrap();
        assert_eq!(path.split(':').count(), 17);
        assert!(path.ends_with(":base"));
    }
}
