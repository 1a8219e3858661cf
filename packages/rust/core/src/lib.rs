//! Core pipeline and domain logic for Inspectors.
//!
//! This crate turns a scraper's report record into files on disk:
//! inference and validation of the record, deterministic storage paths,
//! and the `save_report` pipeline that drives the fetch/extract collaborators.

pub mod inference;
pub mod paths;
pub mod pipeline;
pub mod report;
pub mod validate;
pub mod years;

pub use inference::infer;
pub use paths::{cache_path, path_for};
pub use pipeline::{SaveOutcome, SavedReport, save_report};
pub use report::{DocumentKind, RawReport, Report};
pub use validate::validate;
pub use years::{YearOptions, year_range, year_range_at};
