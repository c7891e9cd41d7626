use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fluffbox_schema::{KindPlatform, Os, Platform, Release, RuntimeKind};
use reqwest::Client;
use serde::Deserialize;

use super::{Runtime, is_plain_triple};
use crate::catalog::{CatalogError, parse_json};

/// Node.js from the official distribution index (`<mirror>/index.json`).
#[derive(Debug, Clone)]
pub struct NodeRuntime {
    mirror: String,
    platform: KindPlatform,
}

#[derive(Deserialize)]
struct NodeIndexEntry {
    version: String,
    #[serde(default)]
    files: Vec<String>,
    /// `false` for current releases, the codename for LTS lines.
    #[serde(default)]
    lts: serde_json::Value,
}

impl NodeRuntime {
    pub fn new(mirror: &str, platform: Platform) -> Self {
        Self {
            mirror: mirror.trim_end_matches('/').to_string(),
            platform: platform.for_kind(RuntimeKind::Node),
        }
    }

    /// Token the index's `files` array uses for this platform's archive.
    fn file_token(&self) -> String {
        let arch = self.platform.arch_token;
        match self.platform.os {
            Os::Windows => format!("win-{arch}-zip"),
            Os::MacOs => format!("osx-{arch}-tar"),
            Os::Linux => format!("linux-{arch}"),
        }
    }

    fn archive_stem(&self, version: &str) -> String {
        format!(
            "node-{version}-{}-{}",
            self.platform.platform_token, self.platform.arch_token
        )
    }
}

#[async_trait]
impl Runtime for NodeRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Node
    }

    async fn sub_indices(&self, _client: &Client) -> Result<Vec<String>, CatalogError> {
        Ok(vec![format!("{}/index.json", self.mirror)])
    }

    fn parse_index(&self, url: &str, body: &str) -> Result<Vec<Release>, CatalogError> {
        let entries: Vec<NodeIndexEntry> = parse_json(url, body)?;
        let token = self.file_token();

        Ok(entries
            .into_iter()
            .filter(|e| e.files.iter().any(|f| *f == token))
            .map(|e| {
                let stem = self.archive_stem(&e.version);
                let url = format!(
                    "{}/{}/{stem}{}",
                    self.mirror, e.version, self.platform.archive_ext
                );
                let release = Release::new(e.version, url);
                match e.lts.as_str() {
                    Some(codename) => release.with_lts(codename),
                    None => release,
                }
            })
            .collect())
    }

    fn is_prerelease(&self, version: &str) -> bool {
        version.contains('-')
    }

    fn version_dir_name(&self, version: &str) -> String {
        if version.starts_with('v') {
            version.to_string()
        } else {
            format!("v{version}")
        }
    }

    fn version_from_dir_name(&self, name: &str) -> Option<String> {
        let rest = name.strip_prefix('v')?;
        is_plain_triple(rest).then(|| name.to_string())
    }

    fn wrapper_hint(&self, release: &Release) -> Option<String> {
        Some(self.archive_stem(&release.version))
    }

    fn entry_point(&self, install_dir: &Path) -> PathBuf {
        match self.platform.os {
            Os::Windows => install_dir.join("node.exe"),
            Os::MacOs | Os::Linux => install_dir.join("bin").join("node"),
        }
    }

    fn path_entries(&self, install_dir: &Path) -> Vec<PathBuf> {
        match self.platform.os {
            Os::Windows => vec![install_dir.to_path_buf()],
            Os::MacOs | Os::Linux => vec![install_dir.join("bin")],
        }
    }

    fn executable_name(&self) -> &'static str {
        "node"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluffbox_schema::Arch;

    const INDEX: &str = r#"[
        {"version":"v22.0.0-rc.1","files":["linux-x64","osx-arm64-tar","win-x64-zip"],"lts":false},
        {"version":"v21.6.2","files":["linux-x64","osx-arm64-tar","win-x64-zip"],"lts":false},
        {"version":"v20.11.1","files":["linux-x64","linux-arm64","osx-arm64-tar","osx-x64-tar","win-x64-zip"],"lts":"Iron"},
        {"version":"v0.8.6","files":["src","win-x86-exe"],"lts":false}
    ]"#;

    #[test]
    fn test_parse_filters_by_platform_file_token() {
        let runtime = NodeRuntime::new("https://nodejs.org/dist", Platform::new(Os::MacOs, Arch::Arm64));
        let releases = runtime.parse_index("index.json", INDEX).unwrap();
        let versions: Vec<_> = releases.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["v22.0.0-rc.1", "v21.6.2", "v20.11.1"]);

        let lts = &releases[2];
        assert_eq!(lts.lts.as_deref(), Some("Iron"));
        assert_eq!(
            lts.download_url,
            "https://nodejs.org/dist/v20.11.1/node-v20.11.1-darwin-arm64.tar.gz"
        );
        assert_eq!(lts.file_name, "node-v20.11.1-darwin-arm64.tar.gz");
    }

    #[test]
    fn test_windows_url_and_layout() {
        let runtime = NodeRuntime::new("https://nodejs.org/dist/", Platform::new(Os::Windows, Arch::X64));
        let releases = runtime.parse_index("index.json", INDEX).unwrap();
        let release = releases.iter().find(|r| r.version == "v21.6.2").unwrap();
        assert_eq!(
            release.download_url,
            "https://nodejs.org/dist/v21.6.2/node-v21.6.2-win-x64.zip"
        );
        assert_eq!(
            runtime.wrapper_hint(release).as_deref(),
            Some("node-v21.6.2-win-x64")
        );
        let dir = Path::new(r"C:\fb\nodejs_versions\v21.6.2");
        assert_eq!(runtime.entry_point(dir), dir.join("node.exe"));
        assert_eq!(runtime.path_entries(dir), vec![dir.to_path_buf()]);
    }

    #[test]
    fn test_prerelease_and_dir_names() {
        let runtime = NodeRuntime::new("https://nodejs.org/dist", Platform::new(Os::Linux, Arch::X64));
        assert!(runtime.is_prerelease("v22.0.0-rc.1"));
        assert!(!runtime.is_prerelease("v20.11.1"));
        assert_eq!(runtime.version_dir_name("20.11.1"), "v20.11.1");
        assert_eq!(runtime.version_from_dir_name("v20.11.1").as_deref(), Some("v20.11.1"));
        assert_eq!(runtime.version_from_dir_name("current"), None);
        assert_eq!(runtime.version_from_dir_name("v20"), None);
    }

    #[test]
    fn test_malformed_index_is_parse_error() {
        let runtime = NodeRuntime::new("https://nodejs.org/dist", Platform::new(Os::Linux, Arch::X64));
        assert!(matches!(
            runtime.parse_index("index.json", "{not json"),
            Err(CatalogError::Parse { .. })
        ));
    }
}
