//! Eclipse Temurin JDKs from the Adoptium API.
//!
//! Adoptium has no single listing of every build: `info/available_releases`
//! names the feature release lines (8, 11, 17, 21, ...) and each line is then
//! queried separately. Only the newest GA build of each line is offered.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use fluffbox_schema::{KindPlatform, Os, Platform, Release, RuntimeKind};
use reqwest::Client;
use serde::Deserialize;

use super::Runtime;
use crate::catalog::{CatalogError, parse_json};
use crate::io::download::fetch_text;

#[derive(Debug, Clone)]
pub struct JavaRuntime {
    api: String,
    platform: KindPlatform,
}

#[derive(Deserialize)]
struct AvailableReleases {
    available_releases: Vec<u32>,
}

#[derive(Deserialize)]
struct FeatureRelease {
    release_name: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    binaries: Vec<Binary>,
}

#[derive(Deserialize)]
struct Binary {
    architecture: String,
    os: String,
    image_type: String,
    #[serde(default)]
    jvm_impl: String,
    package: Package,
}

#[derive(Deserialize)]
struct Package {
    link: String,
    name: String,
}

impl JavaRuntime {
    pub fn new(api: &str, platform: Platform) -> Self {
        Self {
            api: api.trim_end_matches('/').to_string(),
            platform: platform.for_kind(RuntimeKind::Java),
        }
    }

    fn feature_release_url(&self, line: u32) -> String {
        format!(
            "{}/assets/feature_releases/{line}/ga?architecture={}&heap_size=normal&image_type=jdk&jvm_impl={}&os={}&page=0&page_size=20&project=jdk&sort_order=DESC&vendor=eclipse",
            self.api, self.platform.arch_token, self.platform.impl_token, self.platform.platform_token
        )
    }

    fn matching_package<'a>(&self, release: &'a FeatureRelease) -> Option<&'a Package> {
        release
            .binaries
            .iter()
            .find(|b| {
                b.image_type == "jdk"
                    && b.os == self.platform.platform_token
                    && b.architecture == self.platform.arch_token
                    && (b.jvm_impl.is_empty() || b.jvm_impl == self.platform.impl_token)
                    && b.package.name.ends_with(self.platform.archive_ext)
            })
            .map(|b| &b.package)
    }
}

/// `jdk-21.0.2+13` becomes `21.0.2+13`, `jdk8u402-b06` becomes `8u402-b06`.
fn version_from_release_name(name: &str) -> String {
    name.strip_prefix("jdk-")
        .or_else(|| name.strip_prefix("jdk"))
        .unwrap_or(name)
        .to_string()
}

fn parse_timestamp(ts: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(ts).ok()
}

#[async_trait]
impl Runtime for JavaRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Java
    }

    async fn sub_indices(&self, client: &Client) -> Result<Vec<String>, CatalogError> {
        let url = format!("{}/info/available_releases", self.api);
        let body = fetch_text(client, &url)
            .await
            .map_err(|source| CatalogError::Network {
                url: url.clone(),
                source,
            })?;
        let available: AvailableReleases = parse_json(&url, &body)?;

        Ok(available
            .available_releases
            .into_iter()
            .map(|line| self.feature_release_url(line))
            .collect())
    }

    fn parse_index(&self, url: &str, body: &str) -> Result<Vec<Release>, CatalogError> {
        let releases: Vec<FeatureRelease> = parse_json(url, body)?;

        let latest = releases
            .iter()
            .filter(|r| self.matching_package(r).is_some())
            .max_by(|a, b| {
                match (parse_timestamp(&a.timestamp), parse_timestamp(&b.timestamp)) {
                    (Some(ta), Some(tb)) => ta.cmp(&tb),
                    _ => a.timestamp.cmp(&b.timestamp),
                }
            });

        Ok(latest
            .and_then(|r| {
                let package = self.matching_package(r)?;
                Some(Release::new(
                    version_from_release_name(&r.release_name),
                    package.link.clone(),
                ))
            })
            .into_iter()
            .collect())
    }

    fn is_prerelease(&self, version: &str) -> bool {
        version.contains("-ea") || version.contains("ea+")
    }

    fn version_dir_name(&self, version: &str) -> String {
        format!("jdk-{}", version_from_release_name(version))
    }

    fn version_from_dir_name(&self, name: &str) -> Option<String> {
        let version = name.strip_prefix("jdk-")?;
        version
            .starts_with(|c: char| c.is_ascii_digit())
            .then(|| version.to_string())
    }

    fn wrapper_hint(&self, release: &Release) -> Option<String> {
        // Old lines drop the dash: `jdk8u402-b06`.
        let version = &release.version;
        if version.split(['.', '+', '-']).next().is_some_and(|head| head.contains('u')) {
            Some(format!("jdk{version}"))
        } else {
            Some(format!("jdk-{version}"))
        }
    }

    fn runtime_home(&self, install_dir: &Path) -> PathBuf {
        match self.platform.os {
            Os::MacOs => install_dir.join("Contents").join("Home"),
            Os::Windows | Os::Linux => install_dir.to_path_buf(),
        }
    }

    fn entry_point(&self, install_dir: &Path) -> PathBuf {
        self.runtime_home(install_dir)
            .join("bin")
            .join(format!("java{}", self.platform.executable_ext))
    }

    fn path_entries(&self, install_dir: &Path) -> Vec<PathBuf> {
        vec![self.runtime_home(install_dir).join("bin")]
    }

    fn home_var(&self, install_dir: &Path) -> Option<(&'static str, PathBuf)> {
        Some(("JAVA_HOME", self.runtime_home(install_dir)))
    }

    fn path_markers(&self) -> &'static [&'static str] {
        &["java", "jdk", "jre"]
    }

    fn executable_name(&self) -> &'static str {
        "java"
    }

    /// `java -version` prints to stderr.
    fn version_args(&self) -> &'static [&'static str] {
        &["-version"]
    }
}
