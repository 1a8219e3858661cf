//! Fill in fields a scraper left out, before validation runs.
//!
//! Inference never overwrites a present field and never fails: anything it
//! can't derive stays unset and validation reports it.

use tracing::debug;
use url::Url;

use crate::report::{DEFAULT_REPORT_TYPE, RawReport};

/// Base for resolving relative and scheme-less URLs, so only the path is read.
const RELATIVE_BASE: &str = "http://localhost/";

/// Derive `type`, `year`, and `file_type` where they are missing.
pub fn infer(report: &mut RawReport) {
    if report.report_type.is_none() {
        report.report_type = Some(DEFAULT_REPORT_TYPE.to_string());
    }

    if report.year.is_none() {
        if let Some(published_on) = report.published_on.as_deref().filter(|s| !s.is_empty()) {
            report.year = year_from(published_on);
        }
    }

    if report.file_type.is_none() {
        if let Some(url) = report.url.as_deref().filter(|s| !s.is_empty()) {
            report.file_type = file_type_from_url(url);
            debug!(url, file_type = ?report.file_type, "inferred file_type");
        }
    }
}

/// Year component of a `YYYY-MM-DD` date: everything before the first `-`.
pub fn year_from(published_on: &str) -> Option<i32> {
    published_on.split('-').next()?.trim().parse().ok()
}

/// Trailing extension of the URL's path, case preserved.
///
/// `/reports/x.pdf` and `www.oig.gov/reports/x.pdf` resolve against a dummy
/// base; query and fragment never count toward the extension.
fn file_type_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url)
        .or_else(|_| Url::parse(RELATIVE_BASE).and_then(|base| base.join(url)))
        .ok()?;
    let segments: Vec<&str> = parsed.path().split('.').collect();
    if segments.len() > 1 {
        segments.last().map(|ext| (*ext).to_string())
    } else {
        None
    }
}
