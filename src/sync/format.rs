//! Audio format classification for archive files

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extensions we consider audio at all; everything else is never downloaded
const AUDIO_EXTENSIONS: &[&str] = &["flac", "mp3", "ogg", "shn", "wav", "m4a"];

/// Format tag assigned to a single manifest entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Flac,
    Mp3,
    Other,
}

/// Format requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatMode {
    Flac,
    #[default]
    Mp3,
    Both,
}

impl FormatMode {
    pub fn wants_flac(self) -> bool {
        matches!(self, FormatMode::Flac | FormatMode::Both)
    }

    pub fn wants_mp3(self) -> bool {
        matches!(self, FormatMode::Mp3 | FormatMode::Both)
    }

    /// Whether a file tagged `format` satisfies this mode
    pub fn accepts(self, format: AudioFormat) -> bool {
        match format {
            AudioFormat::Flac => self.wants_flac(),
            AudioFormat::Mp3 => self.wants_mp3(),
            AudioFormat::Other => false,
        }
    }
}

impl fmt::Display for FormatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatMode::Flac => write!(f, "flac"),
            FormatMode::Mp3 => write!(f, "mp3"),
            FormatMode::Both => write!(f, "both"),
        }
    }
}

/// Check whether a file name carries a recognized audio extension
pub fn is_audio_file(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Classify a manifest entry by its name and declared format
///
/// The suffix wins over the declared format, and a FLAC signal from either
/// source beats an MP3 signal.
pub fn classify(name: &str, declared_format: &str) -> AudioFormat {
    let name = name.to_lowercase();
    let declared = declared_format.to_lowercase();

    let is_flac = name.ends_with(".flac") || declared.contains("flac");
    let is_mp3 = name.ends_with(".mp3") || declared.contains("mp3") || declared == "vbr mp3";

    if is_flac {
        AudioFormat::Flac
    } else if is_mp3 {
        AudioFormat::Mp3
    } else {
        AudioFormat::Other
    }
}
