//! Show-processing loop
//!
//! One show at a time, one source at a time. Every per-show and per-source
//! failure is reported and counted, then the loop moves on; only an
//! unwritable output root or an unavailable year listing stops the run.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use super::downloader::{DownloadOutcome, Downloader};
use super::errors::SyncError;
use super::format::FormatMode;
use super::planner::{DownloadTask, plan_downloads};
use super::report::Reporter;
use super::source::select_best_source;
use crate::archive::{Archive, Transfer};
use crate::catalog::{Catalog, Show, SourceRecord};
use crate::library::LibraryStorage;

/// What to fetch and how
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub band: String,
    pub year: String,
    pub format: FormatMode,
    /// Reduce multi-source shows to their best-rated source
    pub highest_rated: bool,
    /// Plan and report without transferring anything
    pub dry_run: bool,
}

/// Totals for a whole run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncResult {
    pub shows_seen: usize,
    pub shows_failed: usize,
    pub sources_completed: usize,
    pub sources_skipped: usize,
    pub sources_failed: usize,
    pub files_planned: usize,
    pub files_downloaded: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub bytes_downloaded: u64,
}

impl SyncResult {
    fn record_outcome(&mut self, outcome: &DownloadOutcome) {
        self.files_downloaded += outcome.downloaded;
        self.files_skipped += outcome.skipped;
        self.files_failed += outcome.failures.len();
        self.bytes_downloaded += outcome.bytes_downloaded;
    }
}

/// Result of handling one source
#[derive(Debug)]
enum SourceReport {
    Downloaded { dir: PathBuf, outcome: DownloadOutcome },
    Planned { dir: PathBuf, tasks: Vec<DownloadTask> },
}

/// Coordinates catalog lookups, planning and downloading
pub struct SyncEngine {
    catalog: Arc<dyn Catalog>,
    archive: Arc<dyn Archive>,
    storage: LibraryStorage,
    downloader: Downloader,
    reporter: Arc<dyn Reporter>,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(
        catalog: Arc<dyn Catalog>,
        archive: Arc<dyn Archive>,
        transfer: Arc<dyn Transfer>,
        storage: LibraryStorage,
        reporter: Arc<dyn Reporter>,
        delay: std::time::Duration,
    ) -> Self {
        let downloader = Downloader::new(transfer, reporter.clone(), delay);

        Self {
            catalog,
            archive,
            storage,
            downloader,
            reporter,
        }
    }

    /// Process every show of the requested year
    pub async fn sync(&self, options: &SyncOptions) -> Result<SyncResult> {
        let mut result = SyncResult::default();

        if !options.dry_run {
            self.storage.init().await?;
            debug!("Writing to {}", self.storage.root().display());
        }

        self.reporter.info(&format!(
            "Fetching shows for {} in {}...",
            options.band, options.year
        ));
        let shows = self
            .catalog
            .get_shows(&options.band, &options.year)
            .await
            .context("Failed to fetch shows")?;

        self.reporter.info(&format!(
            "Found {} shows for {} in {}",
            shows.len(),
            options.band,
            options.year
        ));

        for (i, show) in shows.iter().enumerate() {
            self.reporter.info(&format!(
                "[{}/{}] Processing show: {} at {}, {}",
                i + 1,
                shows.len(),
                show.display_date,
                show.venue_name(),
                show.venue_location()
            ));
            result.shows_seen += 1;
            self.sync_show(options, show, &mut result).await;
        }

        Ok(result)
    }

    async fn sync_show(&self, options: &SyncOptions, show: &Show, result: &mut SyncResult) {
        let detail = match self.catalog.get_show(&options.band, &show.display_date).await {
            Ok(detail) => detail,
            Err(e) => {
                let err = SyncError::CatalogUnavailable {
                    show: show.display_date.clone(),
                    reason: format!("{:#}", e),
                };
                self.reporter.error(&format!("  {}", err));
                result.shows_failed += 1;
                return;
            }
        };

        if detail.sources.is_empty() {
            self.reporter.info("  No sources found for this show");
            return;
        }

        let sources: Vec<&SourceRecord> = if options.highest_rated && detail.sources.len() > 1 {
            match select_best_source(&detail.sources) {
                Some(best) => {
                    self.reporter.info(&format!(
                        "  Selected highest rated source with avg rating {:.2}",
                        best.rating()
                    ));
                    vec![best]
                }
                None => {
                    self.reporter.info("  No valid sources found for this show");
                    return;
                }
            }
        } else {
            detail.sources.iter().collect()
        };

        for (j, source) in sources.iter().enumerate() {
            self.reporter.info(&format!(
                "  Source [{}/{}]: {}",
                j + 1,
                sources.len(),
                source.label()
            ));

            match self.sync_source(options, &show.display_date, j, source).await {
                Ok(SourceReport::Downloaded { dir, outcome }) => {
                    result.sources_completed += 1;
                    result.record_outcome(&outcome);
                    self.reporter
                        .info(&format!("    ✓ Downloaded to {}", dir.display()));
                }
                Ok(SourceReport::Planned { dir, tasks }) => {
                    result.sources_completed += 1;
                    result.files_planned += tasks.len();
                    self.reporter.info(&format!(
                        "    [DRY RUN] Would download {} file(s) to {}",
                        tasks.len(),
                        dir.display()
                    ));
                    for task in &tasks {
                        let size = task
                            .remote_size
                            .map(|s| format!("{} bytes", s))
                            .unwrap_or_else(|| "unknown size".to_string());
                        self.reporter
                            .info(&format!("    - {} ({})", task.display_name, size));
                    }
                }
                Err(e @ (SyncError::NoArchiveLink | SyncError::NoMatchingFiles)) => {
                    result.sources_skipped += 1;
                    self.reporter.warn(&format!("    {}", e));
                }
                Err(e) => {
                    if let SyncError::AllDownloadsFailed { failures } = &e {
                        result.files_failed += failures.len();
                    }
                    result.sources_failed += 1;
                    self.reporter
                        .error(&format!("    Failed to download files: {}", e));
                }
            }
        }
    }

    async fn sync_source(
        &self,
        options: &SyncOptions,
        display_date: &str,
        source_index: usize,
        source: &SourceRecord,
    ) -> Result<SourceReport, SyncError> {
        let identifier = source.archive_identifier().ok_or(SyncError::NoArchiveLink)?;
        self.reporter
            .info(&format!("    archive.org identifier: {}", identifier));

        let manifest = self
            .archive
            .get_manifest(&identifier)
            .await
            .map_err(|e| SyncError::ManifestUnavailable {
                identifier: identifier.clone(),
                reason: format!("{:#}", e),
            })?;

        let dir = self
            .storage
            .show_dir(&options.band, &options.year, display_date, source_index);
        let plan = plan_downloads(&manifest, options.format, &dir, |name| {
            self.archive.file_url(&identifier, name)
        })?;

        if plan.fell_back_to_mp3 {
            self.reporter
                .warn("    - No FLAC files found, falling back to MP3...");
        }

        if options.dry_run {
            return Ok(SourceReport::Planned {
                dir,
                tasks: plan.tasks,
            });
        }

        let dir = self
            .storage
            .create_show_dir(&options.band, &options.year, display_date, source_index)
            .await
            .map_err(|e| SyncError::Storage {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })?;

        let outcome = self.downloader.download_all(plan.tasks).await?;
        Ok(SourceReport::Downloaded { dir, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ManifestEntry;
    use crate::sync::testing::{FakeArchive, FakeCatalog, FakeTransfer, Level, RecordingReporter, source};
    use std::time::Duration;

    struct Harness {
        engine: SyncEngine,
        transfer: Arc<FakeTransfer>,
        reporter: Arc<RecordingReporter>,
        root: tempfile::TempDir,
    }

    fn harness(catalog: FakeCatalog, archive: FakeArchive, transfer: FakeTransfer) -> Harness {
        let root = tempfile::tempdir().unwrap();
        let transfer = Arc::new(transfer);
        let reporter = Arc::new(RecordingReporter::default());
        let engine = SyncEngine::new(
            Arc::new(catalog),
            Arc::new(archive),
            transfer.clone(),
            LibraryStorage::new(root.path().to_path_buf()),
            reporter.clone(),
            Duration::ZERO,
        );

        Harness {
            engine,
            transfer,
            reporter,
            root,
        }
    }

    fn options(format: FormatMode, highest_rated: bool) -> SyncOptions {
        SyncOptions {
            band: "grateful-dead".to_string(),
            year: "1977".to_string(),
            format,
            highest_rated,
            dry_run: false,
        }
    }

    fn flac_item() -> Vec<ManifestEntry> {
        vec![
            ManifestEntry::new("t01.flac", "Flac", "5").with_title("Scarlet Begonias"),
            ManifestEntry::new("t01.mp3", "VBR MP3", "5").with_title("Scarlet Begonias"),
            ManifestEntry::new("t02.flac", "Flac", "5").with_title("Fire on the Mountain"),
        ]
    }

    fn mp3_item() -> Vec<ManifestEntry> {
        vec![ManifestEntry::new("t01.mp3", "VBR MP3", "5").with_title("Morning Dew / Take 2")]
    }

    #[tokio::test]
    async fn test_multi_source_show_gets_suffixed_directories() {
        let catalog = FakeCatalog::default().with_show(
            "1977-05-08",
            vec![source("sbd", Some(9.0)), source("aud", Some(6.0))],
        );
        let archive = FakeArchive::default()
            .with_item("sbd", flac_item())
            .with_item("aud", mp3_item());
        let h = harness(catalog, archive, FakeTransfer::failing(&[]));

        let result = h.engine.sync(&options(FormatMode::Flac, false)).await.unwrap();

        let show_root = h.root.path().join("grateful-dead/1977");
        assert!(show_root.join("1977-05-08/Scarlet Begonias.flac").is_file());
        assert!(show_root.join("1977-05-08/Fire on the Mountain.flac").is_file());
        assert!(show_root.join("1977-05-08-source2/Morning Dew _ Take 2.mp3").is_file());
        assert_eq!(result.sources_completed, 2);
        assert_eq!(result.files_downloaded, 3);
        assert!(
            h.reporter
                .messages(Level::Warn)
                .iter()
                .any(|m| m.contains("falling back to MP3"))
        );
    }

    #[tokio::test]
    async fn test_highest_rated_keeps_single_unsuffixed_source() {
        let catalog = FakeCatalog::default().with_show(
            "1977-05-08",
            vec![source("aud", Some(0.0)), source("sbd", Some(7.72)), source("mtx", Some(6.5))],
        );
        let archive = FakeArchive::default()
            .with_item("aud", mp3_item())
            .with_item("sbd", flac_item())
            .with_item("mtx", mp3_item());
        let h = harness(catalog, archive, FakeTransfer::failing(&[]));

        let result = h.engine.sync(&options(FormatMode::Flac, true)).await.unwrap();

        assert_eq!(result.sources_completed, 1);
        assert_eq!(
            h.transfer.attempts(),
            [
                "https://archive.test/download/sbd/t01.flac",
                "https://archive.test/download/sbd/t02.flac"
            ]
        );
        assert!(!h.root.path().join("grateful-dead/1977/1977-05-08-source2").exists());
    }

    #[tokio::test]
    async fn test_highest_rated_with_no_positive_rating_skips_show() {
        let catalog = FakeCatalog::default().with_show(
            "1977-05-08",
            vec![source("a", Some(0.0)), source("b", None)],
        );
        let h = harness(catalog, FakeArchive::default(), FakeTransfer::failing(&[]));

        let result = h.engine.sync(&options(FormatMode::Mp3, true)).await.unwrap();

        assert_eq!(result.sources_completed + result.sources_failed, 0);
        assert!(h.transfer.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_skips_only_that_show() {
        let catalog = FakeCatalog::default()
            .with_broken_show("1977-05-07")
            .with_show("1977-05-08", vec![source("sbd", Some(9.0))]);
        let archive = FakeArchive::default().with_item("sbd", mp3_item());
        let h = harness(catalog, archive, FakeTransfer::failing(&[]));

        let result = h.engine.sync(&options(FormatMode::Mp3, false)).await.unwrap();

        assert_eq!(result.shows_seen, 2);
        assert_eq!(result.shows_failed, 1);
        assert_eq!(result.sources_completed, 1);
        assert!(
            h.reporter
                .messages(Level::Error)
                .iter()
                .any(|m| m.contains("catalog unavailable for 1977-05-07"))
        );
    }

    #[tokio::test]
    async fn test_source_failures_do_not_stop_siblings() {
        let mut no_link = source("nolink", Some(5.0));
        no_link.links.clear();
        let catalog = FakeCatalog::default().with_show(
            "1977-05-08",
            vec![
                no_link,
                source("missing", Some(5.0)),
                source("shn", Some(5.0)),
                source("locked", Some(5.0)),
                source("good", Some(5.0)),
            ],
        );
        let archive = FakeArchive::default()
            .with_item("shn", vec![ManifestEntry::new("t01.shn", "Shorten", "5")])
            .with_item("locked", mp3_item())
            .with_item("good", mp3_item());
        let transfer = FakeTransfer::failing(&[("https://archive.test/download/locked/t01.mp3", 401)]);
        let h = harness(catalog, archive, transfer);

        let result = h.engine.sync(&options(FormatMode::Mp3, false)).await.unwrap();

        assert_eq!(result.sources_skipped, 2);
        assert_eq!(result.sources_failed, 2);
        assert_eq!(result.sources_completed, 1);
        assert_eq!(result.files_failed, 1);
        assert_eq!(result.files_downloaded, 1);
        assert!(
            h.root
                .path()
                .join("grateful-dead/1977/1977-05-08-source5/Morning Dew _ Take 2.mp3")
                .is_file()
        );
    }

    #[tokio::test]
    async fn test_dry_run_transfers_nothing() {
        let catalog = FakeCatalog::default().with_show("1977-05-08", vec![source("sbd", Some(9.0))]);
        let archive = FakeArchive::default().with_item("sbd", flac_item());
        let h = harness(catalog, archive, FakeTransfer::failing(&[]));

        let mut opts = options(FormatMode::Both, false);
        opts.dry_run = true;
        let result = h.engine.sync(&opts).await.unwrap();

        assert_eq!(result.files_planned, 3);
        assert!(h.transfer.attempts().is_empty());
        assert!(!h.root.path().join("grateful-dead").exists());
    }

    #[tokio::test]
    async fn test_second_run_skips_existing_files() {
        let catalog = FakeCatalog::default().with_show("1977-05-08", vec![source("sbd", Some(9.0))]);
        let archive = FakeArchive::default().with_item("sbd", mp3_item());
        let h = harness(catalog, archive, FakeTransfer::failing(&[]));
        let opts = options(FormatMode::Mp3, false);

        let first = h.engine.sync(&opts).await.unwrap();
        let second = h.engine.sync(&opts).await.unwrap();

        assert_eq!(first.files_downloaded, 1);
        assert_eq!(second.files_downloaded, 0);
        assert_eq!(second.files_skipped, 1);
        assert_eq!(h.transfer.attempts().len(), 1);
    }
}
