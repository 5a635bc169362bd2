//! Turns an archive manifest into an ordered list of downloads

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::errors::SyncError;
use super::format::{FormatMode, classify, is_audio_file};
use super::size::parse_declared_size;
use crate::archive::ManifestEntry;
use crate::utils::{extension, local_file_name};

/// A resolved unit of work for the downloader
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadTask {
    /// Where the file lands locally
    pub path: PathBuf,
    /// Where the file is fetched from
    pub url: String,
    /// Local file name, used in messages and failure records
    pub display_name: String,
    /// Declared remote size, when it parsed
    pub remote_size: Option<u64>,
}

/// Manifest entries chosen for a requested format
#[derive(Debug)]
pub struct Selection<'a> {
    pub entries: Vec<&'a ManifestEntry>,
    /// FLAC was requested, none existed, and MP3 was substituted
    pub fell_back_to_mp3: bool,
}

/// Planned downloads for one source
#[derive(Debug)]
pub struct DownloadPlan {
    pub tasks: Vec<DownloadTask>,
    pub fell_back_to_mp3: bool,
}

fn filter(manifest: &[ManifestEntry], mode: FormatMode) -> Vec<&ManifestEntry> {
    manifest
        .iter()
        .filter(|entry| is_audio_file(&entry.name))
        .filter(|entry| mode.accepts(classify(&entry.name, &entry.format)))
        .collect()
}

/// Select the manifest entries to download, applying the FLAC→MP3 fallback
pub fn select_entries(
    manifest: &[ManifestEntry],
    mode: FormatMode,
) -> Result<Selection<'_>, SyncError> {
    let mut entries = filter(manifest, mode);
    let mut fell_back_to_mp3 = false;

    if entries.is_empty() && mode == FormatMode::Flac {
        entries = filter(manifest, FormatMode::Mp3);
        fell_back_to_mp3 = true;
    }

    if entries.is_empty() {
        return Err(SyncError::NoMatchingFiles);
    }

    Ok(Selection {
        entries,
        fell_back_to_mp3,
    })
}

/// Pick a local name no earlier task in the plan has claimed
///
/// Tries the title-based name, then the remote name, then numbered variants
/// of the remote name (`t01 (2).mp3`, `t01 (3).mp3`, ...).
fn unique_name(used: &mut HashSet<String>, entry: &ManifestEntry) -> String {
    let titled = local_file_name(&entry.name, entry.title.as_deref());
    if used.insert(titled.clone()) {
        return titled;
    }

    let plain = local_file_name(&entry.name, None);
    if used.insert(plain.clone()) {
        return plain;
    }

    let (stem, ext) = match extension(&plain) {
        Some(ext) => (&plain[..plain.len() - ext.len() - 1], Some(ext)),
        None => (plain.as_str(), None),
    };
    let mut n = 2;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Build download tasks for `manifest` into `dest_dir`
///
/// `url_for` maps a remote file name to its download URL. Task order follows
/// manifest order.
pub fn plan_downloads<F>(
    manifest: &[ManifestEntry],
    mode: FormatMode,
    dest_dir: &Path,
    url_for: F,
) -> Result<DownloadPlan, SyncError>
where
    F: Fn(&str) -> String,
{
    let selection = select_entries(manifest, mode)?;
    let mut used = HashSet::new();

    let tasks = selection
        .entries
        .into_iter()
        .map(|entry| {
            let name = unique_name(&mut used, entry);

            DownloadTask {
                path: dest_dir.join(&name),
                url: url_for(&entry.name),
                display_name: name,
                remote_size: parse_declared_size(&entry.size),
            }
        })
        .collect();

    Ok(DownloadPlan {
        tasks,
        fell_back_to_mp3: selection.fell_back_to_mp3,
    })
}
