//! Relisten API response models

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

// Year listing response (artists/{band}/years/{year})
#[derive(Debug, Clone, Deserialize)]
pub struct YearData {
    #[serde(default)]
    pub shows: Vec<Show>,
}

/// A dated performance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    pub display_date: String,
    #[serde(default)]
    pub venue: Option<Venue>,
}

impl Show {
    pub fn venue_name(&self) -> &str {
        self.venue
            .as_ref()
            .and_then(|v| v.name.as_deref())
            .unwrap_or("Unknown Venue")
    }

    pub fn venue_location(&self) -> &str {
        self.venue
            .as_ref()
            .and_then(|v| v.location.as_deref())
            .unwrap_or("Unknown Location")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub name: Option<String>,
    pub location: Option<String>,
}

// Show detail response (artists/{band}/shows/{date})
#[derive(Debug, Clone, Deserialize)]
pub struct ShowDetail {
    pub display_date: String,
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
}

/// One recording of a show
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub uuid: Option<String>,
    /// Average rating; upstream sometimes omits it or sends it as a string
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_rating: Option<f64>,
    #[serde(default)]
    pub is_soundboard: bool,
    #[serde(default)]
    pub taper: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl SourceRecord {
    /// Rating used for comparisons; an absent rating counts as zero
    pub fn rating(&self) -> f64 {
        self.avg_rating.unwrap_or(0.0)
    }

    /// Opaque identifier for display
    pub fn label(&self) -> String {
        self.uuid
            .clone()
            .or_else(|| self.id.map(|id| id.to_string()))
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Archive.org item identifier from the first archive.org link
    pub fn archive_identifier(&self) -> Option<String> {
        self.links.iter().find_map(|link| archive_identifier(&link.url))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

/// Extract the item identifier (last non-empty path segment) from an archive.org URL
pub fn archive_identifier(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?;
    if host != "archive.org" && !host.ends_with(".archive.org") {
        return None;
    }

    url.path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .map(|s| {
            urlencoding::decode(s)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
}

/// Accept a JSON number or a numeric string; anything else is absent
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
