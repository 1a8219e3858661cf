//! Collaborator traits the acquisition pipeline drives.
//!
//! The pipeline only decides *what* to fetch and *where* it goes; moving bytes
//! over the network and turning documents into text happen behind these traits
//! so they can be swapped for in-memory fakes in tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

/// Downloads a single URL to a destination on disk.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` into `destination`, creating parent directories as needed.
    ///
    /// With `binary` set the body is written byte-for-byte; otherwise it is
    /// decoded as text and written as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error on any network failure, non-success HTTP status, or
    /// filesystem failure. Callers treat every error as "not acquired".
    async fn download(&self, url: &str, destination: &Path, binary: bool) -> Result<()>;
}

/// Extracts plain text from a downloaded document.
///
/// Implementations write the text next to the source file and return the
/// path of the written text file.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract text from a PDF document.
    async fn extract_pdf(&self, path: &Path) -> Result<PathBuf>;

    /// Extract text from an HTML document.
    async fn extract_html(&self, path: &Path) -> Result<PathBuf>;
}
