//! CPython.
//!
//! Windows builds come from python.org's package indices
//! (`index-windows-recent.json` and `index-windows-legacy.json`). python.org
//! publishes no relocatable builds for macOS or Linux, so those platforms use
//! the `install_only` archives of python-build-standalone, listed through the
//! GitHub releases API.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fluffbox_schema::{Os, Platform, Release, RuntimeKind, filename_from_url};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use super::{Runtime, is_plain_triple};
use crate::catalog::{CatalogError, parse_json};

const WINDOWS_INDICES: [&str; 2] = ["index-windows-recent.json", "index-windows-legacy.json"];

/// Release pages of python-build-standalone to scan.
const STANDALONE_PAGES: u32 = 2;
const STANDALONE_PER_PAGE: u32 = 5;

#[derive(Debug, Clone)]
pub struct PythonRuntime {
    index_base: String,
    standalone_api: String,
    platform: Platform,
}

#[derive(Deserialize)]
struct WindowsIndex {
    #[serde(default)]
    versions: Vec<WindowsEntry>,
}

#[derive(Deserialize)]
struct WindowsEntry {
    #[serde(default)]
    company: String,
    #[serde(default)]
    tag: String,
    #[serde(rename = "sort-version")]
    sort_version: String,
    url: String,
}

#[derive(Deserialize)]
struct GithubRelease {
    #[serde(default)]
    assets: Vec<GithubAsset>,
}

#[derive(Deserialize)]
struct GithubAsset {
    name: String,
    browser_download_url: String,
}

impl PythonRuntime {
    pub fn new(index_base: &str, standalone_api: &str, platform: Platform) -> Self {
        Self {
            index_base: index_base.trim_end_matches('/').to_string(),
            standalone_api: standalone_api.trim_end_matches('/').to_string(),
            platform,
        }
    }

    fn is_windows(&self) -> bool {
        self.platform.os == Os::Windows
    }

    fn parse_windows(&self, url: &str, body: &str) -> Result<Vec<Release>, CatalogError> {
        let index: WindowsIndex = parse_json(url, body)?;
        let arch = self.platform.for_kind(RuntimeKind::Python).arch_token;
        let zip = format!("{arch}.zip");
        let installer = format!("{arch}.exe");

        let mut entries: Vec<WindowsEntry> = index
            .versions
            .into_iter()
            .filter(|e| e.company == "PythonCore" || e.company == "PythonEmbed")
            .filter(|e| e.url.ends_with(&zip) || e.url.ends_with(&installer))
            .filter(|e| !is_free_threaded(&e.tag))
            .collect();

        // For the same version: full zip, then the native installer, then embeddable.
        entries.sort_by_key(|e| (e.company != "PythonCore", e.url.ends_with(&installer)));

        Ok(entries
            .into_iter()
            .map(|e| Release::new(e.sort_version, e.url))
            .collect())
    }

    fn parse_standalone(&self, url: &str, body: &str) -> Result<Vec<Release>, CatalogError> {
        let releases: Vec<GithubRelease> = parse_json(url, body)?;
        let pattern = format!(
            r"^cpython-(\d+\.\d+\.\d+)\+(\d+)-{}-install_only\.tar\.gz$",
            regex::escape(&self.platform.target_triple())
        );
        let re = Regex::new(&pattern).map_err(|e| CatalogError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(releases
            .into_iter()
            .flat_map(|r| r.assets)
            .filter_map(|asset| {
                let caps = re.captures(&asset.name)?;
                Some(Release::new(&caps[1], asset.browser_download_url).with_build(&caps[2]))
            })
            .collect())
    }
}

/// Free-threaded builds are tagged like `3.13t-64`.
fn is_free_threaded(tag: &str) -> bool {
    tag.split('-').next().is_some_and(|t| t.ends_with('t'))
}

#[async_trait]
impl Runtime for PythonRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Python
    }

    async fn sub_indices(&self, _client: &Client) -> Result<Vec<String>, CatalogError> {
        if self.is_windows() {
            Ok(WINDOWS_INDICES
                .iter()
                .map(|name| format!("{}/{name}", self.index_base))
                .collect())
        } else {
            Ok((1..=STANDALONE_PAGES)
                .map(|page| {
                    format!(
                        "{}?per_page={STANDALONE_PER_PAGE}&page={page}",
                        self.standalone_api
                    )
                })
                .collect())
        }
    }

    fn parse_index(&self, url: &str, body: &str) -> Result<Vec<Release>, CatalogError> {
        if self.is_windows() {
            self.parse_windows(url, body)
        } else {
            self.parse_standalone(url, body)
        }
    }

    /// Alpha, beta, release-candidate, dev and post releases.
    fn is_prerelease(&self, version: &str) -> bool {
        version.contains(['a', 'b'])
            || ["rc", "dev", "post"].iter().any(|m| version.contains(m))
    }

    fn version_dir_name(&self, version: &str) -> String {
        version.to_string()
    }

    fn version_from_dir_name(&self, name: &str) -> Option<String> {
        is_plain_triple(name).then(|| name.to_string())
    }

    fn wrapper_hint(&self, _release: &Release) -> Option<String> {
        // python.org zips are flat; standalone tarballs wrap everything in `python/`.
        (!self.is_windows()).then(|| "python".to_string())
    }

    fn uses_native_installer(&self, release: &Release) -> bool {
        self.is_windows()
            && filename_from_url(&release.download_url)
                .to_ascii_lowercase()
                .ends_with(".exe")
    }

    fn entry_point(&self, install_dir: &Path) -> PathBuf {
        if self.is_windows() {
            install_dir.join("python.exe")
        } else {
            install_dir.join("bin").join("python3")
        }
    }

    fn path_entries(&self, install_dir: &Path) -> Vec<PathBuf> {
        if self.is_windows() {
            vec![install_dir.to_path_buf(), install_dir.join("Scripts")]
        } else {
            vec![install_dir.join("bin")]
        }
    }

    fn executable_name(&self) -> &'static str {
        if self.is_windows() { "python" } else { "python3" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use fluffbox_schema::Arch;

    const RECENT: &str = r#"{"versions":[
        {"id":"pythoncore-3.13-64","company":"PythonCore","tag":"3.13-64","sort-version":"3.13.1","url":"https://www.python.org/ftp/python/3.13.1/python-3.13.1-amd64.zip"},
        {"id":"pythoncore-3.13t-64","company":"PythonCore","tag":"3.13t-64","sort-version":"3.13.1","url":"https://www.python.org/ftp/python/3.13.1/python-3.13.1t-amd64.zip"},
        {"id":"pythoncore-3.14-64","company":"PythonCore","tag":"3.14-64","sort-version":"3.14.0a3","url":"https://www.python.org/ftp/python/3.14.0/python-3.14.0a3-amd64.zip"},
        {"id":"pythonembed-3.13-64","company":"PythonEmbed","tag":"3.13-64","sort-version":"3.13.1","url":"https://www.python.org/ftp/python/3.13.1/python-3.13.1-embed-amd64.zip"},
        {"id":"pythoncore-3.13-arm64","company":"PythonCore","tag":"3.13-arm64","sort-version":"3.13.1","url":"https://www.python.org/ftp/python/3.13.1/python-3.13.1-arm64.zip"},
        {"id":"other","company":"Contoso","tag":"1.0-64","sort-version":"1.0.0","url":"https://example.com/contoso-amd64.zip"}
    ]}"#;

    const LEGACY: &str = r#"{"versions":[
        {"id":"pythoncore-3.9-64","company":"PythonCore","tag":"3.9-64","sort-version":"3.9.13","url":"https://www.python.org/ftp/python/3.9.13/python-3.9.13-amd64.zip"},
        {"id":"pythoncore-3.10-64","company":"PythonCore","tag":"3.10-64","sort-version":"3.10.11","url":"https://www.python.org/ftp/python/3.10.11/python-3.10.11-amd64.zip"}
    ]}"#;

    const STANDALONE: &str = r#"[
        {"tag_name":"20241016","assets":[
            {"name":"cpython-3.12.7+20241016-aarch64-apple-darwin-install_only.tar.gz","browser_download_url":"https://github.com/astral-sh/python-build-standalone/releases/download/20241016/cpython-3.12.7%2B20241016-aarch64-apple-darwin-install_only.tar.gz"},
            {"name":"cpython-3.12.7+20241016-aarch64-apple-darwin-install_only.tar.gz.sha256","browser_download_url":"https://example.com/sha"},
            {"name":"cpython-3.12.7+20241016-x86_64-unknown-linux-gnu-install_only.tar.gz","browser_download_url":"https://example.com/linux"},
            {"name":"cpython-3.14.0a1+20241016-aarch64-apple-darwin-install_only.tar.gz","browser_download_url":"https://example.com/alpha"}
        ]},
        {"tag_name":"20241008","assets":[
            {"name":"cpython-3.12.7+20241008-aarch64-apple-darwin-install_only.tar.gz","browser_download_url":"https://example.com/older"},
            {"name":"cpython-3.11.10+20241008-aarch64-apple-darwin-install_only.tar.gz","browser_download_url":"https://example.com/311"}
        ]}
    ]"#;

    fn windows() -> PythonRuntime {
        PythonRuntime::new(
            "https://www.python.org/ftp/python",
            "https://api.github.com/repos/x/y/releases",
            Platform::new(Os::Windows, Arch::X64),
        )
    }

    #[test]
    fn test_windows_index_filters_company_arch_and_free_threading() {
        let releases = windows().parse_index("recent", RECENT).unwrap();
        let urls: Vec<_> = releases.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "python-3.13.1-amd64.zip",
                "python-3.14.0a3-amd64.zip",
                "python-3.13.1-embed-amd64.zip",
            ]
        );
    }

    #[test]
    fn test_windows_installer_only_versions_are_offered() {
        let body = r#"{"versions":[
            {"company":"PythonCore","tag":"3.8-64","sort-version":"3.8.10","url":"https://www.python.org/ftp/python/3.8.10/python-3.8.10-amd64.exe"},
            {"company":"PythonCore","tag":"3.9-64","sort-version":"3.9.13","url":"https://www.python.org/ftp/python/3.9.13/python-3.9.13-amd64.exe"},
            {"company":"PythonCore","tag":"3.9-64","sort-version":"3.9.13","url":"https://www.python.org/ftp/python/3.9.13/python-3.9.13-amd64.zip"},
            {"company":"PythonCore","tag":"3.9-arm64","sort-version":"3.9.13","url":"https://www.python.org/ftp/python/3.9.13/python-3.9.13-arm64.exe"}
        ]}"#;
        let runtime = windows();
        let releases = catalog::dedup_and_sort(runtime.parse_index("legacy", body).unwrap());
        let files: Vec<_> = releases.iter().map(|r| r.file_name.as_str()).collect();

        assert_eq!(files, vec!["python-3.9.13-amd64.zip", "python-3.8.10-amd64.exe"]);
        assert!(!runtime.uses_native_installer(&releases[0]));
        assert!(runtime.uses_native_installer(&releases[1]));
        assert_eq!(runtime.wrapper_hint(&releases[1]), None);
    }

    #[test]
    fn test_prerelease_markers() {
        let runtime = windows();
        for v in ["3.14.0a3", "3.13.0b1", "3.13.0rc2", "3.12.0.dev1", "3.11.0.post1"] {
            assert!(runtime.is_prerelease(v), "{v}");
        }
        assert!(!runtime.is_prerelease("3.12.2"));
    }

    #[test]
    fn test_standalone_picks_triple_and_build() {
        let runtime = PythonRuntime::new(
            "https://www.python.org/ftp/python",
            "https://api.github.com/repos/x/y/releases",
            Platform::new(Os::MacOs, Arch::Arm64),
        );
        let releases = catalog::dedup_and_sort(runtime.parse_index("page", STANDALONE).unwrap());
        let releases: Vec<_> = releases
            .into_iter()
            .filter(|r| !runtime.is_prerelease(&r.version))
            .collect();

        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].version, "3.12.7");
        assert_eq!(releases[0].build.as_deref(), Some("20241016"));
        assert_eq!(
            releases[0].file_name,
            "cpython-3.12.7%2B20241016-aarch64-apple-darwin-install_only.tar.gz"
        );
        assert_eq!(releases[1].version, "3.11.10");
        assert_eq!(runtime.wrapper_hint(&releases[0]).as_deref(), Some("python"));
    }

    #[tokio::test]
    async fn test_resolve_merges_indices_and_orders_numerically() {
        let mut server = mockito::Server::new_async().await;
        let _recent = server
            .mock("GET", "/index-windows-recent.json")
            .with_status(200)
            .with_body(RECENT)
            .create_async()
            .await;
        let _legacy = server
            .mock("GET", "/index-windows-legacy.json")
            .with_status(200)
            .with_body(LEGACY)
            .create_async()
            .await;

        let runtime = PythonRuntime::new(&server.url(), "unused", Platform::new(Os::Windows, Arch::X64));
        let releases = catalog::resolve(&runtime, &Client::new()).await.unwrap();
        let versions: Vec<_> = releases.iter().map(|r| r.version.as_str()).collect();

        assert_eq!(versions, vec!["3.13.1", "3.10.11", "3.9.13"]);
        assert_eq!(releases[0].file_name, "python-3.13.1-amd64.zip");
    }

    #[tokio::test]
    async fn test_resolve_skips_failed_index() {
        let mut server = mockito::Server::new_async().await;
        let _recent = server
            .mock("GET", "/index-windows-recent.json")
            .with_status(500)
            .create_async()
            .await;
        let _legacy = server
            .mock("GET", "/index-windows-legacy.json")
            .with_status(200)
            .with_body(LEGACY)
            .create_async()
            .await;

        let runtime = PythonRuntime::new(&server.url(), "unused", Platform::new(Os::Windows, Arch::X64));
        let releases = catalog::resolve(&runtime, &Client::new()).await.unwrap();
        assert_eq!(releases.len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_fails_when_every_index_fails() {
        let mut server = mockito::Server::new_async().await;
        let _recent = server
            .mock("GET", "/index-windows-recent.json")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;
        let _legacy = server
            .mock("GET", "/index-windows-legacy.json")
            .with_status(503)
            .create_async()
            .await;

        let runtime = PythonRuntime::new(&server.url(), "unused", Platform::new(Os::Windows, Arch::X64));
        let err = catalog::resolve(&runtime, &Client::new()).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::AllFailed { kind: RuntimeKind::Python, attempts: 2, .. }
        ));
    }
}
