//! Error taxonomy for planning and downloading
//!
//! Per-file failures are soft: they are classified into a [`FailureKind`] and
//! recorded, never propagated. Per-source and per-show failures are
//! [`SyncError`] values that the show loop reports before moving on.

use std::fmt;
use thiserror::Error;

/// Failure of a single byte transfer
#[derive(Error, Debug)]
pub enum TransferError {
    /// Server answered with a non-success status
    #[error("download returned status {status}")]
    Status { status: u16 },

    /// Request or body stream failed before completion
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Destination could not be written
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    /// HTTP status carried by the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            TransferError::Status { status } => Some(*status),
            TransferError::Network(e) => e.status().map(|s| s.as_u16()),
            TransferError::Io(_) => None,
        }
    }
}

/// Classification of a failed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 401, the file requires authentication
    Restricted,
    /// 403, the file is not publicly downloadable
    Forbidden,
    /// Everything else
    Transient,
}

impl FailureKind {
    pub fn classify(error: &TransferError) -> Self {
        match error.status() {
            Some(401) => FailureKind::Restricted,
            Some(403) => FailureKind::Forbidden,
            _ => FailureKind::Transient,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Restricted => write!(f, "restricted"),
            FailureKind::Forbidden => write!(f, "forbidden"),
            FailureKind::Transient => write!(f, "transient"),
        }
    }
}

/// A recorded per-file failure
#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    pub file_name: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl FileFailure {
    pub fn from_transfer(file_name: &str, error: &TransferError) -> Self {
        let kind = FailureKind::classify(error);
        let reason = match kind {
            FailureKind::Restricted | FailureKind::Forbidden => kind.to_string(),
            FailureKind::Transient => error.to_string(),
        };

        Self {
            file_name: file_name.to_string(),
            kind,
            reason,
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_name, self.reason)
    }
}

/// Per-show and per-source failures
#[derive(Error, Debug)]
pub enum SyncError {
    /// Show detail could not be fetched
    #[error("catalog unavailable for {show}: {reason}")]
    CatalogUnavailable { show: String, reason: String },

    /// Source has no archive.org link to resolve
    #[error("no archive.org link found")]
    NoArchiveLink,

    /// Source manifest could not be fetched
    #[error("manifest unavailable for {identifier}: {reason}")]
    ManifestUnavailable { identifier: String, reason: String },

    /// Nothing in the manifest matches the requested format
    #[error("no audio files found in requested format")]
    NoMatchingFiles,

    /// Show directory could not be prepared
    #[error("failed to prepare {path}: {reason}")]
    Storage { path: String, reason: String },

    /// Every planned file failed
    #[error("all downloads failed: {}", join_failures(.failures))]
    AllDownloadsFailed { failures: Vec<FileFailure> },
}

fn join_failures(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status_codes() {
        assert_eq!(
            FailureKind::classify(&TransferError::Status { status: 401 }),
            FailureKind::Restricted
        );
        assert_eq!(
            FailureKind::classify(&TransferError::Status { status: 403 }),
            FailureKind::Forbidden
        );
        assert_eq!(
            FailureKind::classify(&TransferError::Status { status: 404 }),
            FailureKind::Transient
        );
        assert_eq!(
            FailureKind::classify(&TransferError::Status { status: 503 }),
            FailureKind::Transient
        );
    }

    #[test]
    fn test_classify_without_status() {
        let io = TransferError::Io(std::io::Error::other("disk full"));
        assert_eq!(io.status(), None);
        assert_eq!(FailureKind::classify(&io), FailureKind::Transient);
    }

    #[test]
    fn test_file_failure_reasons() {
        let forbidden = FileFailure::from_transfer("t02.flac", &TransferError::Status { status: 403 });
        assert_eq!(forbidden.to_string(), "t02.flac: forbidden");

        let missing = FileFailure::from_transfer("t03.flac", &TransferError::Status { status: 404 });
        assert_eq!(missing.kind, FailureKind::Transient);
        assert_eq!(missing.to_string(), "t03.flac: download returned status 404");
    }

    #[test]
    fn test_all_downloads_failed_message() {
        let err = SyncError::AllDownloadsFailed {
            failures: vec![
                FileFailure::from_transfer("a.mp3", &TransferError::Status { status: 401 }),
                FileFailure::from_transfer("b.mp3", &TransferError::Status { status: 403 }),
            ],
        };
        assert_eq!(err.to_string(), "all downloads failed: a.mp3: restricted; b.mp3: forbidden");
    }
}
