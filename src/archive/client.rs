//! archive.org metadata client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::models::{ArchiveMetadata, ManifestEntry};

/// Manifest lookups and download URL construction for an archive
#[async_trait]
pub trait Archive: Send + Sync {
    /// All files of an item, in manifest order
    async fn get_manifest(&self, identifier: &str) -> Result<Vec<ManifestEntry>>;

    /// Download URL for a file of an item
    fn file_url(&self, identifier: &str, file_name: &str) -> String;
}

/// HTTP client for archive.org
#[derive(Clone)]
pub struct ArchiveClient {
    base_url: String,
    http_client: Client,
}

impl ArchiveClient {
    /// Create a new archive client
    pub fn new(base_url: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }
}

#[async_trait]
impl Archive for ArchiveClient {
    async fn get_manifest(&self, identifier: &str) -> Result<Vec<ManifestEntry>> {
        let url = format!("{}/metadata/{}", self.base_url, urlencoding::encode(identifier));
        debug!("Fetching manifest {}: {}", identifier, url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch archive metadata")?;

        if response.status() != StatusCode::OK {
            anyhow::bail!("archive.org API returned status {}", response.status().as_u16());
        }

        let metadata: ArchiveMetadata = response
            .json()
            .await
            .context("Failed to parse archive metadata")?;

        debug!("Manifest {} lists {} files", identifier, metadata.files.len());
        Ok(metadata.files)
    }

    fn file_url(&self, identifier: &str, file_name: &str) -> String {
        build_file_url(&self.base_url, identifier, file_name)
    }
}

/// `{base}/download/{identifier}/{name}` with every path segment encoded
pub fn build_file_url(base_url: &str, identifier: &str, file_name: &str) -> String {
    let path: Vec<String> = file_name
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();

    format!(
        "{}/download/{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(identifier),
        path.join("/")
    )
}
