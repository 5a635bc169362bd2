//! archive.org metadata models

use serde::{Deserialize, Deserializer, Serialize};

/// Response of the archive.org metadata endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveMetadata {
    #[serde(default)]
    pub files: Vec<ManifestEntry>,
}

/// One remote file in an item's manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    #[serde(default)]
    pub format: String,
    /// Declared size in bytes, as sent (may be empty or malformed)
    #[serde(default, deserialize_with = "string_or_number")]
    pub size: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[cfg(test)]
impl ManifestEntry {
    pub fn new(name: &str, format: &str, size: &str) -> Self {
        Self {
            name: name.to_string(),
            format: format.to_string(),
            size: size.to_string(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
