//! Relisten catalog HTTP client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::models::*;

/// Catalog lookups the show loop depends on
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Shows for a band in a year, in catalog order
    async fn get_shows(&self, band: &str, year: &str) -> Result<Vec<Show>>;

    /// A single show with its sources
    async fn get_show(&self, band: &str, display_date: &str) -> Result<ShowDetail>;
}

/// HTTP client for the Relisten REST API
#[derive(Clone)]
pub struct CatalogClient {
    base_url: String,
    http_client: Client,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(base_url: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", what))?;

        if response.status() != StatusCode::OK {
            anyhow::bail!("API returned status {}", response.status().as_u16());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn get_shows(&self, band: &str, year: &str) -> Result<Vec<Show>> {
        let url = self.build_url(&format!(
            "artists/{}/years/{}",
            urlencoding::encode(band),
            urlencoding::encode(year)
        ));
        debug!("Fetching shows from: {}", url);

        let data: YearData = self.get_json(&url, "shows").await?;

        debug!("Found {} shows", data.shows.len());
        Ok(data.shows)
    }

    async fn get_show(&self, band: &str, display_date: &str) -> Result<ShowDetail> {
        let url = self.build_url(&format!(
            "artists/{}/shows/{}",
            urlencoding::encode(band),
            urlencoding::encode(display_date)
        ));
        debug!("Fetching show {}: {}", display_date, url);

        let detail: ShowDetail = self.get_json(&url, "show").await?;

        debug!("Show {} has {} sources", display_date, detail.sources.len());
        Ok(detail)
    }
}
