//! Skip-vs-redownload decisions for files already on disk

use std::io;
use std::path::Path;

/// What to do with a planned file given what is already on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeDecision {
    /// Nothing on disk yet
    Download,
    /// Local copy matches the declared size
    Skip { size: u64 },
    /// Local copy exists but the remote size is unknown
    Unverifiable { local: u64 },
    /// Local copy exists with the wrong size
    Mismatch { local: u64, remote: u64 },
}

/// Parse a declared size; empty or malformed strings yield `None`
pub fn parse_declared_size(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// Decide from the local size (if the file exists) and the parsed remote size
pub fn reconcile(local: Option<u64>, remote: Option<u64>) -> SizeDecision {
    match (local, remote) {
        (None, _) => SizeDecision::Download,
        (Some(local), None) => SizeDecision::Unverifiable { local },
        (Some(local), Some(remote)) if local == remote => SizeDecision::Skip { size: local },
        (Some(local), Some(remote)) => SizeDecision::Mismatch { local, remote },
    }
}

/// Size of the file at `path`, or `None` if there is no regular file there
pub async fn local_size(path: &Path) -> io::Result<Option<u64>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
