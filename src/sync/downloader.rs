//! Sequential download reconciler
//!
//! Walks a plan one task at a time: files already on disk with the declared
//! size are skipped, everything else is transferred in full. A failing file
//! is classified and recorded, and the batch always runs to the end.

use std::sync::Arc;
use std::time::Duration;

use super::errors::{FailureKind, FileFailure, SyncError};
use super::planner::DownloadTask;
use super::report::Reporter;
use super::size::{SizeDecision, local_size, reconcile};
use crate::archive::Transfer;

/// Aggregate result of one batch
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DownloadOutcome {
    /// Files transferred in this batch
    pub downloaded: usize,
    /// Files already present with the right size
    pub skipped: usize,
    /// Bytes written by transfers
    pub bytes_downloaded: u64,
    /// Failures in task order
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Complete,
    Partial,
    TotalFailure,
}

impl DownloadOutcome {
    pub fn successes(&self) -> usize {
        self.downloaded + self.skipped
    }

    pub fn status(&self) -> OutcomeStatus {
        match (self.successes(), self.failures.len()) {
            (_, 0) => OutcomeStatus::Complete,
            (0, _) => OutcomeStatus::TotalFailure,
            _ => OutcomeStatus::Partial,
        }
    }
}

/// Runs download plans against a transfer backend
pub struct Downloader {
    transfer: Arc<dyn Transfer>,
    reporter: Arc<dyn Reporter>,
    delay: Duration,
}

impl Downloader {
    /// Create a new downloader
    pub fn new(transfer: Arc<dyn Transfer>, reporter: Arc<dyn Reporter>, delay: Duration) -> Self {
        Self {
            transfer,
            reporter,
            delay,
        }
    }

    /// Download every task in order
    ///
    /// Fails with [`SyncError::AllDownloadsFailed`] only when nothing succeeded
    /// and at least one file failed.
    pub async fn download_all(&self, tasks: Vec<DownloadTask>) -> Result<DownloadOutcome, SyncError> {
        let mut outcome = DownloadOutcome::default();
        let total = tasks.len();

        for (i, task) in tasks.into_iter().enumerate() {
            let local = match local_size(&task.path).await {
                Ok(size) => size,
                Err(e) => {
                    self.reporter.warn(&format!(
                        "    - Unable to inspect {} ({}), downloading anyway",
                        task.display_name, e
                    ));
                    None
                }
            };

            match reconcile(local, task.remote_size) {
                SizeDecision::Skip { size } => {
                    self.reporter.info(&format!(
                        "    - Skipping {} (already exists, size: {} bytes)",
                        task.display_name, size
                    ));
                    outcome.skipped += 1;
                    continue;
                }
                SizeDecision::Unverifiable { .. } => {
                    self.reporter.info(&format!(
                        "    - Re-downloading {} (unable to verify size)",
                        task.display_name
                    ));
                }
                SizeDecision::Mismatch { local, remote } => {
                    self.reporter.info(&format!(
                        "    - Re-downloading {} (size mismatch: local={}, remote={})",
                        task.display_name, local, remote
                    ));
                }
                SizeDecision::Download => {}
            }

            self.reporter
                .info(&format!("    - Downloading {}...", task.display_name));

            match self
                .transfer
                .transfer(&task.url, &task.path, &task.display_name)
                .await
            {
                Ok(bytes) => {
                    self.reporter
                        .info(&format!("    - ✓ Downloaded {}", task.display_name));
                    outcome.downloaded += 1;
                    outcome.bytes_downloaded += bytes;
                }
                Err(e) => {
                    let failure = FileFailure::from_transfer(&task.display_name, &e);
                    match failure.kind {
                        FailureKind::Restricted => self.reporter.warn(&format!(
                            "    - ⚠ Skipping {} (restricted/requires authentication)",
                            task.display_name
                        )),
                        FailureKind::Forbidden => self.reporter.warn(&format!(
                            "    - ⚠ Skipping {} (forbidden/restricted)",
                            task.display_name
                        )),
                        FailureKind::Transient => self.reporter.error(&format!(
                            "    - ✗ Failed to download {}: {}",
                            task.display_name, e
                        )),
                    }
                    outcome.failures.push(failure);
                }
            }

            // Pause between transfers, not after the last one
            if !self.delay.is_zero() && i + 1 < total {
                tokio::time::sleep(self.delay).await;
            }
        }

        match outcome.status() {
            OutcomeStatus::TotalFailure => Err(SyncError::AllDownloadsFailed {
                failures: outcome.failures,
            }),
            OutcomeStatus::Partial => {
                self.reporter.warn(&format!(
                    "    - ⚠ {} file(s) failed to download (see above)",
                    outcome.failures.len()
                ));
                Ok(outcome)
            }
            OutcomeStatus::Complete => Ok(outcome),
        }
    }
}
