//! Shared error model, configuration, and collaborator traits for Inspectors.
//!
//! This crate is the foundation depended on by all other Inspectors crates.
//! It provides:
//! - [`InspectorError`] — the unified error type
//! - Configuration ([`AppConfig`], [`PipelineOptions`], config loading)
//! - The [`Fetcher`] and [`Extractor`] seams the pipeline drives

pub mod config;
pub mod error;
pub mod traits;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ExtractConfig, FetchConfig, PipelineOptions, StorageConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{InspectorError, Result};
pub use traits::{Extractor, Fetcher};
