//! Deterministic storage paths for report artifacts.
//!
//! Layout under the data root:
//! ```text
//! <inspector>/<year>/<report_id>/
//! ├── report.<file_type>   downloaded document
//! ├── report.txt           extracted text
//! └── report.json          metadata
//! ```

use std::path::{Path, PathBuf};

/// Relative path of a report artifact with the given extension.
///
/// No validation happens here; `report_id` is checked for `/` during validation.
pub fn path_for(inspector: &str, year: i32, report_id: &str, extension: &str) -> String {
    format!("{inspector}/{year}/{report_id}/report.{extension}")
}

/// Absolute location of a scraper cache file for `inspector`.
pub fn cache_path(cache_root: &Path, inspector: &str, relative: &str) -> PathBuf {
    cache_root.join(inspector).join(relative)
}
