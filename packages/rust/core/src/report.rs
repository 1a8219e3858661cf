//! Report records: the loose ingestion shape and the validated shape.
//!
//! Scrapers hand over a [`RawReport`] where every field may be missing.
//! After inference and validation it becomes a [`Report`] whose required
//! fields are guaranteed present (see `TryFrom<RawReport> for Report`).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use inspectors_shared::{InspectorError, Result};

/// Default value for the `type` field.
pub const DEFAULT_REPORT_TYPE: &str = "report";

// ---------------------------------------------------------------------------
// RawReport
// ---------------------------------------------------------------------------

/// A report record as produced by a scraper, before inference and validation.
///
/// Fields the pipeline doesn't know about are kept in [`RawReport::extra`]
/// and written back out unchanged in the metadata file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Scraper identifier, e.g. `dhs-oig`. Top-level storage namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
    /// Publication date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// Accepts `2020` or `"2020"`.
    #[serde(
        default,
        deserialize_with = "deserialize_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    /// Kept as a raw JSON value: only a literal `true` marks a report unreleased.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unreleased: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawReport {
    /// Deserialize one record from a batch.
    ///
    /// A record whose fields have the wrong JSON types fails as an invalid
    /// report, so a batch can skip it like any other invalid record.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|e| {
            let field = |name: &str| {
                value
                    .get(name)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            InspectorError::InvalidReport {
                report_type: field("type"),
                published_on: field("published_on"),
                report_id: field("report_id"),
                reason: format!("Malformed record: {e}"),
                record: serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
            }
        })
    }

    /// Whether the record carries the strict `unreleased: true` sentinel.
    ///
    /// Truthy non-boolean values (`1`, `"yes"`) do not count.
    pub fn is_unreleased(&self) -> bool {
        matches!(self.unreleased, Some(Value::Bool(true)))
    }

    /// Render the record as pretty JSON for diagnostics.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// `year` as an integer or a numeric string. Empty strings and `null` are absent.
fn deserialize_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid year: {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid year: {s:?}"))),
        Some(other) => Err(D::Error::custom(format!("invalid year: {other}"))),
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A validated report record. This is what gets written as `report.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: String,
    pub title: String,
    pub inspector: String,
    pub inspector_url: String,
    pub agency: String,
    pub agency_name: String,
    pub published_on: String,
    /// Absent only for unreleased reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Absent only for unreleased reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    pub year: i32,
    #[serde(rename = "type")]
    pub report_type: String,
    /// Written back exactly as received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unreleased: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Report {
    /// Whether the record carries the strict `unreleased: true` sentinel.
    pub fn is_unreleased(&self) -> bool {
        matches!(self.unreleased, Some(Value::Bool(true)))
    }
}

/// How a downloaded document's text gets extracted, keyed off `file_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Html,
    Other,
}

impl DocumentKind {
    /// Classify a file type, case-insensitively. Anything starting with `htm` is HTML.
    pub fn from_file_type(file_type: &str) -> Self {
        let lower = file_type.to_lowercase();
        if lower == "pdf" {
            Self::Pdf
        } else if lower.starts_with("htm") {
            Self::Html
        } else {
            Self::Other
        }
    }
}
