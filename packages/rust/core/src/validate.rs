//! Required-field and format checks for report records.
//!
//! Checks run in a fixed order and the first failure is reported. Validation
//! only reads the record; run [`crate::inference::infer`] first.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use inspectors_shared::{InspectorError, Result};

use crate::report::{RawReport, Report};

/// Fields that must be present and non-empty on every record.
const REQUIRED_FIELDS: [&str; 7] = [
    "published_on",
    "report_id",
    "title",
    "inspector",
    "inspector_url",
    "agency",
    "agency_name",
];

/// Shape accepted by the date parser: 4-digit year, 1–2 digit month and day.
static DATE_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("valid regex"));

/// A month or day written without its leading zero.
static UNPADDED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-\d-|-\d$)").expect("valid regex"));

/// Validate an inferred record, returning the reason for the first failed check.
pub fn validate(report: &RawReport) -> std::result::Result<(), String> {
    for field in REQUIRED_FIELDS {
        if is_blank(required_field(report, field)) {
            return Err(format!("Missing a required field: {field}"));
        }
    }

    let unreleased = report.is_unreleased();

    if !unreleased && is_blank(report.url.as_deref()) {
        return Err("Missing required field 'url' when field 'unreleased' != True".into());
    }

    let report_id = report.report_id.as_deref().unwrap_or_default();
    if report_id.contains('/') {
        return Err(format!(
            "Invalid / in report_id - find another way: {report_id:?}"
        ));
    }

    if report.year.is_none() {
        return Err("Couldn't get `year`, for some reason.".into());
    }

    if report.report_type.is_none() {
        return Err("Er, this shouldn't happen: empty `type` field.".into());
    }

    if !unreleased && report.file_type.is_none() {
        return Err(
            "Couldn't figure out `file_type` from URL, please set it explicitly.".into(),
        );
    }

    let published_on = report.published_on.as_deref().unwrap_or_default();
    if !is_calendar_date(published_on) {
        return Err("Invalid format for `published_on`, must be YYYY-MM-DD.".into());
    }

    if UNPADDED_RE.is_match(published_on) {
        return Err("Invalid format for `published_on`, dates must use zero prefixing.".into());
    }

    Ok(())
}

impl TryFrom<RawReport> for Report {
    type Error = InspectorError;

    /// Validate `raw` and promote it to a [`Report`].
    ///
    /// Does not run inference; callers that want defaults filled in call
    /// [`crate::inference::infer`] first.
    fn try_from(raw: RawReport) -> Result<Self> {
        if let Err(reason) = validate(&raw) {
            return Err(invalid_report(&raw, reason));
        }

        promote(&raw).ok_or_else(|| invalid_report(&raw, "incomplete record after validation"))
    }
}

/// Build the fatal error for a record that failed validation.
pub fn invalid_report(raw: &RawReport, reason: impl Into<String>) -> InspectorError {
    InspectorError::InvalidReport {
        report_type: raw.report_type.clone().unwrap_or_default(),
        published_on: raw.published_on.clone().unwrap_or_default(),
        report_id: raw.report_id.clone().unwrap_or_default(),
        reason: reason.into(),
        record: raw.to_pretty_json(),
    }
}

fn promote(raw: &RawReport) -> Option<Report> {
    Some(Report {
        report_id: raw.report_id.clone()?,
        title: raw.title.clone()?,
        inspector: raw.inspector.clone()?,
        inspector_url: raw.inspector_url.clone()?,
        agency: raw.agency.clone()?,
        agency_name: raw.agency_name.clone()?,
        published_on: raw.published_on.clone()?,
        url: raw.url.clone(),
        file_type: raw.file_type.clone(),
        year: raw.year?,
        report_type: raw.report_type.clone()?,
        unreleased: raw.unreleased.clone(),
        extra: raw.extra.clone(),
    })
}

fn required_field<'a>(report: &'a RawReport, field: &str) -> Option<&'a str> {
    match field {
        "published_on" => report.published_on.as_deref(),
        "report_id" => report.report_id.as_deref(),
        "title" => report.title.as_deref(),
        "inspector" => report.inspector.as_deref(),
        "inspector_url" => report.inspector_url.as_deref(),
        "agency" => report.agency.as_deref(),
        "agency_name" => report.agency_name.as_deref(),
        _ => None,
    }
}

/// Empty strings count as missing.
fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

fn is_calendar_date(value: &str) -> bool {
    DATE_SHAPE_RE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
