//! In-memory collaborators for sync tests

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use super::errors::TransferError;
use super::report::Reporter;
use crate::archive::{Archive, ManifestEntry, Transfer};
use crate::catalog::{Catalog, Link, Show, ShowDetail, SourceRecord, Venue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Keeps every message for later assertions
#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingReporter {
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.messages.lock().unwrap().push((level, message.to_string()));
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

/// Writes `body` for every URL except the ones scripted to fail
#[derive(Default)]
pub struct FakeTransfer {
    failures: HashMap<String, u16>,
    body: Vec<u8>,
    attempts: Mutex<Vec<String>>,
}

impl FakeTransfer {
    pub fn failing(statuses: &[(&str, u16)]) -> Self {
        Self {
            failures: statuses.iter().map(|(u, s)| (u.to_string(), *s)).collect(),
            body: b"audio".to_vec(),
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transfer for FakeTransfer {
    async fn transfer(&self, url: &str, dest: &Path, _display_name: &str) -> Result<u64, TransferError> {
        self.attempts.lock().unwrap().push(url.to_string());
        if let Some(status) = self.failures.get(url) {
            return Err(TransferError::Status { status: *status });
        }
        tokio::fs::write(dest, &self.body).await?;
        Ok(self.body.len() as u64)
    }
}

/// Catalog backed by fixed show data; dates without detail fail
#[derive(Default)]
pub struct FakeCatalog {
    pub shows: Vec<Show>,
    pub details: HashMap<String, Vec<SourceRecord>>,
}

impl FakeCatalog {
    pub fn with_show(mut self, date: &str, sources: Vec<SourceRecord>) -> Self {
        self.shows.push(show(date));
        self.details.insert(date.to_string(), sources);
        self
    }

    /// A show listed for the year whose detail lookup fails
    pub fn with_broken_show(mut self, date: &str) -> Self {
        self.shows.push(show(date));
        self
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn get_shows(&self, _band: &str, _year: &str) -> Result<Vec<Show>> {
        Ok(self.shows.clone())
    }

    async fn get_show(&self, _band: &str, display_date: &str) -> Result<ShowDetail> {
        match self.details.get(display_date) {
            Some(sources) => Ok(ShowDetail {
                display_date: display_date.to_string(),
                sources: sources.clone(),
            }),
            None => anyhow::bail!("API returned status 404"),
        }
    }
}

/// Archive backed by fixed manifests; unknown identifiers fail
#[derive(Default)]
pub struct FakeArchive {
    pub manifests: HashMap<String, Vec<ManifestEntry>>,
}

impl FakeArchive {
    pub fn with_item(mut self, identifier: &str, files: Vec<ManifestEntry>) -> Self {
        self.manifests.insert(identifier.to_string(), files);
        self
    }
}

#[async_trait]
impl Archive for FakeArchive {
    async fn get_manifest(&self, identifier: &str) -> Result<Vec<ManifestEntry>> {
        match self.manifests.get(identifier) {
            Some(files) => Ok(files.clone()),
            None => anyhow::bail!("archive.org API returned status 503"),
        }
    }

    fn file_url(&self, identifier: &str, file_name: &str) -> String {
        format!("https://archive.test/download/{}/{}", identifier, file_name)
    }
}

pub fn show(date: &str) -> Show {
    Show {
        display_date: date.to_string(),
        venue: Some(Venue {
            name: Some("Barton Hall".to_string()),
            location: Some("Ithaca, NY".to_string()),
        }),
    }
}

/// A source rated `rating` linking to archive item `identifier`
pub fn source(identifier: &str, rating: Option<f64>) -> SourceRecord {
    SourceRecord {
        id: None,
        uuid: Some(identifier.to_string()),
        avg_rating: rating,
        is_soundboard: false,
        taper: None,
        links: vec![Link {
            url: format!("https://archive.org/details/{}", identifier),
        }],
    }
}
