//! Download directory layout

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::utils::sanitize_filename;

/// Manages the `{root}/{band}/{year}/{show}` directory tree
#[derive(Debug, Clone)]
pub struct LibraryStorage {
    root: PathBuf,
}

impl LibraryStorage {
    /// Create a new storage manager rooted at the output directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the output root
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create output directory {}", self.root.display()))?;

        debug!("Initialized output directory at {}", self.root.display());
        Ok(())
    }

    /// Directory for one source of a show
    ///
    /// `source_index` is zero-based; the second and later sources get a
    /// `-source{N}` suffix with N counted from one.
    pub fn show_dir(&self, band: &str, year: &str, display_date: &str, source_index: usize) -> PathBuf {
        let mut show = sanitize_filename(display_date);
        if source_index > 0 {
            show = format!("{}-source{}", show, source_index + 1);
        }

        self.root
            .join(sanitize_filename(band))
            .join(sanitize_filename(year))
            .join(show)
    }

    /// Create the directory for one source of a show and return its path
    pub async fn create_show_dir(
        &self,
        band: &str,
        year: &str,
        display_date: &str,
        source_index: usize,
    ) -> std::io::Result<PathBuf> {
        let path = self.show_dir(band, year, display_date, source_index);
        fs::create_dir_all(&path).await?;

        debug!("Created show folder: {}", path.display());
        Ok(path)
    }
}
