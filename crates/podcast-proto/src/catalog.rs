//! Catalog model: environments, API versions and the typed station / podcast /
//! episode records decoded from API responses.
//!
//! Records are always read by field name. The raw attribute map is kept
//! alongside (in API order) so the details pane can list everything the
//! backend returned.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// ── Environment ───────────────────────────────────────────────────────────────

/// Deployment the client talks to; each has its own base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Staging,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Staging,
        Environment::Production,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Development => Self::Staging,
            Self::Staging => Self::Production,
            Self::Production => Self::Development,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" | "stg" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(UnknownVariant {
                kind: "environment",
                value: s.to_string(),
            }),
        }
    }
}

// ── API version ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
}

impl ApiVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::V1 => Self::V2,
            Self::V2 => Self::V1,
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            _ => Err(UnknownVariant {
                kind: "api version",
                value: s.to_string(),
            }),
        }
    }
}

// ── Ids ───────────────────────────────────────────────────────────────────────

/// Catalog identifier. The API sends ids as numbers in some payloads and as
/// strings in others; both normalise to the same textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CatalogId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for CatalogId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

// ── Field helpers ─────────────────────────────────────────────────────────────

/// Read a field as text. Numbers and booleans are rendered, null/missing is None.
pub fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn u64_field(map: &Map<String, Value>, key: &str) -> Option<u64> {
    match map.get(key)? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render any JSON value for a details row: strings unquoted, null empty,
/// everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// One entry of the station index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSummary {
    pub callsign: String,
    pub id: CatalogId,
}

impl StationSummary {
    pub fn from_record(record: &Map<String, Value>) -> Option<Self> {
        let callsign = text_field(record, "callsign").filter(|c| !c.trim().is_empty())?;
        let id = CatalogId::from_value(record.get("id")?)?;
        Some(Self { callsign, id })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: CatalogId,
    pub callsign: String,
    pub name: String,
    pub stream_url: Option<String>,
    pub logo_url: Option<String>,
    pub attributes: Map<String, Value>,
}

impl Station {
    pub fn from_attributes(attributes: Map<String, Value>) -> Option<Self> {
        let summary = StationSummary::from_record(&attributes)?;
        let stream_url = attributes
            .get("station_stream")
            .and_then(|s| s.as_array())
            .and_then(|streams| streams.first())
            .and_then(|first| first.get("url"))
            .and_then(|u| u.as_str())
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        Some(Self {
            id: summary.id,
            callsign: summary.callsign,
            name: text_field(&attributes, "name").unwrap_or_default(),
            stream_url,
            logo_url: text_field(&attributes, "square_logo_small").filter(|u| !u.is_empty()),
            attributes,
        })
    }

    /// "Name CALLSIGN", or just the callsign when the name is empty.
    pub fn title(&self) -> String {
        if self.name.is_empty() {
            self.callsign.clone()
        } else {
            format!("{} {}", self.name, self.callsign)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Podcast {
    pub id: CatalogId,
    pub title: String,
    pub image_url: Option<String>,
    pub attributes: Map<String, Value>,
}

impl Podcast {
    /// Decode a `{"id": .., "attributes": {..}}` list entry.
    pub fn from_record(record: &Value) -> Option<Self> {
        let id = CatalogId::from_value(record.get("id")?)?;
        let attributes = record
            .get("attributes")
            .and_then(|a| a.as_object())
            .cloned()
            .unwrap_or_default();
        Some(Self {
            id,
            title: text_field(&attributes, "title").unwrap_or_default(),
            image_url: text_field(&attributes, "image").filter(|u| !u.is_empty()),
            attributes,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub id: CatalogId,
    pub title: String,
    pub published_date: Option<String>,
    pub duration_seconds: Option<u64>,
    pub audio_url: Option<String>,
    pub attributes: Map<String, Value>,
}

impl Episode {
    pub fn from_record(record: &Value) -> Option<Self> {
        let id = CatalogId::from_value(record.get("id")?)?;
        let attributes = record
            .get("attributes")
            .and_then(|a| a.as_object())
            .cloned()
            .unwrap_or_default();
        Some(Self {
            id,
            title: text_field(&attributes, "title").unwrap_or_default(),
            published_date: text_field(&attributes, "published_date"),
            duration_seconds: u64_field(&attributes, "duration_seconds"),
            audio_url: text_field(&attributes, "audio_url").filter(|u| !u.is_empty()),
            attributes,
        })
    }

    /// `h:mm:ss` or `m:ss`; empty when the API gave no duration.
    pub fn duration_label(&self) -> String {
        match self.duration_seconds {
            Some(secs) => format_duration(secs),
            None => String::new(),
        }
    }
}

pub fn format_duration(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_environment_parse_and_cycle() {
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("stg".parse::<Environment>().unwrap(), Environment::Staging);
        assert!("qa".parse::<Environment>().is_err());
        assert_eq!(Environment::Production.next(), Environment::Development);
    }

    #[test]
    fn test_api_version_parse() {
        assert_eq!("V2".parse::<ApiVersion>().unwrap(), ApiVersion::V2);
        assert_eq!(ApiVersion::V1.toggle(), ApiVersion::V2);
        let err = "v3".parse::<ApiVersion>().unwrap_err();
        assert_eq!(err.to_string(), "unknown api version 'v3'");
    }

    #[test]
    fn test_catalog_id_accepts_numbers_and_strings() {
        assert_eq!(CatalogId::from_value(&json!(42)).unwrap().as_str(), "42");
        assert_eq!(CatalogId::from_value(&json!(" 42 ")).unwrap().as_str(), "42");
        assert!(CatalogId::from_value(&json!("")).is_none());
        assert!(CatalogId::from_value(&json!(null)).is_none());
    }

    #[test]
    fn test_station_reads_named_fields_regardless_of_order() {
        let attrs = json!({
            "square_logo_small": "https://img.example/wxyz.png",
            "station_stream": [{"url": "https://stream.example/wxyz"}, {"url": "https://backup"}],
            "name": "Hits 101",
            "callsign": "WXYZ",
            "id": 7
        });
        let station = Station::from_attributes(attrs.as_object().unwrap().clone()).unwrap();
        assert_eq!(station.id.as_str(), "7");
        assert_eq!(station.callsign, "WXYZ");
        assert_eq!(station.stream_url.as_deref(), Some("https://stream.example/wxyz"));
        assert_eq!(station.logo_url.as_deref(), Some("https://img.example/wxyz.png"));
        assert_eq!(station.title(), "Hits 101 WXYZ");
        // Attribute order is preserved for the details pane.
        let keys: Vec<&str> = station.attributes.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys[0], "square_logo_small");
    }

    #[test]
    fn test_station_without_callsign_is_rejected() {
        let attrs = json!({"id": 7, "name": "Nameless"});
        assert!(Station::from_attributes(attrs.as_object().unwrap().clone()).is_none());
    }

    #[test]
    fn test_episode_fields() {
        let record = json!({
            "id": "900",
            "attributes": {
                "title": "Pilot",
                "published_date": "2019-04-01",
                "duration_seconds": "3725",
                "audio_url": "https://cdn.example/900.mp3"
            }
        });
        let ep = Episode::from_record(&record).unwrap();
        assert_eq!(ep.id.as_str(), "900");
        assert_eq!(ep.duration_seconds, Some(3725));
        assert_eq!(ep.duration_label(), "1:02:05");
        assert_eq!(ep.audio_url.as_deref(), Some("https://cdn.example/900.mp3"));
    }

    #[test]
    fn test_podcast_missing_attributes_still_decodes() {
        let podcast = Podcast::from_record(&json!({"id": 3})).unwrap();
        assert_eq!(podcast.title, "");
        assert!(podcast.image_url.is_none());
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("x")), "x");
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
        assert_eq!(format_duration(59), "0:59");
    }
}
