//! Catalog resolution: upstream indices to an ordered list of releases.
//!
//! A runtime names one or more sub-indices. They are fetched concurrently;
//! a sub-index that fails is logged and skipped unless every one fails.
//! The merged releases are filtered for prereleases, deduplicated by version
//! (the greatest build wins) and sorted newest first.

use std::cmp::Ordering;
use std::collections::HashMap;

use fluffbox_schema::{Release, RuntimeKind, compare_versions};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::io::download::fetch_text;
use crate::runtimes::Runtime;

/// Sub-indices fetched at once.
const CONCURRENCY: usize = 4;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse {url}: {message}")]
    Parse { url: String, message: String },

    #[error("All {attempts} {kind} indices failed; last error: {last}")]
    AllFailed {
        kind: RuntimeKind,
        attempts: usize,
        last: Box<CatalogError>,
    },
}

impl CatalogError {
    /// Whether the underlying cause is a transport failure rather than bad data.
    pub fn is_network(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Parse { .. } => false,
            Self::AllFailed { last, .. } => last.is_network(),
        }
    }
}

/// Decode an index body, attributing failures to `url`.
pub fn parse_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| CatalogError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

async fn fetch_index(
    runtime: &dyn Runtime,
    client: &Client,
    url: &str,
) -> Result<Vec<Release>, CatalogError> {
    let body = fetch_text(client, url)
        .await
        .map_err(|source| CatalogError::Network {
            url: url.to_string(),
            source,
        })?;
    runtime.parse_index(url, &body)
}

/// Resolve the available releases of `runtime`, newest first.
pub async fn resolve(runtime: &dyn Runtime, client: &Client) -> Result<Vec<Release>, CatalogError> {
    let kind = runtime.kind();
    let urls = runtime.sub_indices(client).await?;
    let attempts = urls.len();

    let results: Vec<(String, Result<Vec<Release>, CatalogError>)> = stream::iter(urls)
        .map(|url| async move {
            let result = fetch_index(runtime, client, &url).await;
            (url, result)
        })
        .buffer_unordered(CONCURRENCY)
        .collect()
        .await;

    let mut releases = Vec::new();
    let mut succeeded = 0;
    let mut last_error = None;

    for (url, result) in results {
        match result {
            Ok(found) => {
                tracing::debug!(%kind, %url, count = found.len(), "Parsed index");
                succeeded += 1;
                releases.extend(found);
            }
            Err(e) => {
                tracing::warn!(%kind, %url, error = %e, "Skipping index");
                last_error = Some(e);
            }
        }
    }

    if succeeded == 0 {
        if let Some(last) = last_error {
            return Err(if attempts == 1 {
                last
            } else {
                CatalogError::AllFailed {
                    kind,
                    attempts,
                    last: Box::new(last),
                }
            });
        }
    }

    releases.retain(|r| !runtime.is_prerelease(&r.version));
    let releases = dedup_and_sort(releases);
    tracing::info!(%kind, count = releases.len(), "Resolved catalog");
    Ok(releases)
}

/// Keep one release per version (the greatest build) and order newest first.
pub fn dedup_and_sort(releases: Vec<Release>) -> Vec<Release> {
    let mut by_version: HashMap<String, Release> = HashMap::new();

    for release in releases {
        match by_version.get(&release.version) {
            Some(existing) if !is_newer_build(&release, existing) => {}
            _ => {
                by_version.insert(release.version.clone(), release);
            }
        }
    }

    let mut unique: Vec<Release> = by_version.into_values().collect();
    unique.sort_by(|a, b| compare_versions(&b.version, &a.version).then_with(|| b.version.cmp(&a.version)));
    unique
}

fn is_newer_build(candidate: &Release, existing: &Release) -> bool {
    match (&candidate.build, &existing.build) {
        (Some(c), Some(e)) => match compare_versions(c, e) {
            Ordering::Equal => c > e,
            ord => ord == Ordering::Greater,
        },
        (Some(_), None) => true,
        _ => false,
    }
}
