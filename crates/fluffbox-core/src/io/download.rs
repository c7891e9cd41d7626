//! Streaming HTTP downloads with progress reporting.
//!
//! Redirect chains are followed by the client (reqwest's default policy); a
//! non-2xx status on the final hop is an error.

use std::path::Path;

use fluffbox_schema::RuntimeKind;
use futures::StreamExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::Reporter;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request for a download operation
pub struct DownloadRequest<'a, R: Reporter> {
    pub client: &'a Client,
    pub kind: RuntimeKind,
    pub version: &'a str,
    pub url: &'a str,
    pub dest: &'a Path,
    pub reporter: &'a R,
}

impl<'a, R: Reporter> DownloadRequest<'a, R> {
    pub fn new(
        client: &'a Client,
        kind: RuntimeKind,
        version: &'a str,
        url: &'a str,
        dest: &'a Path,
        reporter: &'a R,
    ) -> Self {
        Self {
            client,
            kind,
            version,
            url,
            dest,
            reporter,
        }
    }

    /// Stream the response body to `dest`, returning the number of bytes written.
    ///
    /// A partially written file is left behind on failure; the caller owns
    /// the temp path and removes it in its cleanup step.
    pub async fn execute(self) -> Result<u64, DownloadError> {
        let response = self
            .client
            .get(self.url)
            .send()
            .await?
            .error_for_status()?;

        if response.url().as_str() != self.url {
            tracing::debug!(from = self.url, to = %response.url(), "Followed redirect");
        }

        let total_size = response.content_length();
        self.reporter
            .downloading(self.kind, self.version, 0, total_size);

        if let Some(parent) = self.dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = File::create(self.dest).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            self.reporter
                .downloading(self.kind, self.version, downloaded, total_size);
        }

        file.flush().await?;
        Ok(downloaded)
    }
}

/// Fetch `url` and decode the body as JSON.
pub async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, reqwest::Error> {
    client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json::<T>()
        .await
}

/// Fetch `url` as text, for callers that want to separate transport and parse failures.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, reqwest::Error> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullReporter;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_download_follows_redirect() {
        let mut server = mockito::Server::new_async().await;
        let final_url = format!("{}/final/archive.bin", server.url());

        let _redirect = server
            .mock("GET", "/start/archive.bin")
            .with_status(302)
            .with_header("location", &final_url)
            .create_async()
            .await;
        let _target = server
            .mock("GET", "/final/archive.bin")
            .with_status(200)
            .with_body("the real payload")
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("archive.bin");
        let client = Client::new();
        let url = format!("{}/start/archive.bin", server.url());

        let written = DownloadRequest::new(
            &client,
            RuntimeKind::Node,
            "v1.0.0",
            &url,
            &dest,
            &NullReporter,
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(written, 16);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "the real payload");
    }

    #[tokio::test]
    async fn test_download_non_success_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/gone.zip")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("gone.zip");
        let client = Client::new();
        let url = format!("{}/gone.zip", server.url());

        let result = DownloadRequest::new(
            &client,
            RuntimeKind::Java,
            "21",
            &url,
            &dest,
            &NullReporter,
        )
        .execute()
        .await;

        assert!(matches!(result, Err(DownloadError::Http(_))));
        assert!(!dest.exists());
    }
}
