//! PDF → plain text via the external `pdftotext` binary (poppler-utils).

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use inspectors_shared::{InspectorError, Result};

/// Runs `pdftotext -layout` on a PDF.
#[derive(Debug, Clone)]
pub struct PdfToText {
    binary_path: PathBuf,
}

impl PdfToText {
    /// Create a handler with an explicit binary path.
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Locate `program` (a name on `PATH` or a path) with the `which` crate.
    pub fn locate(program: &str) -> Option<Self> {
        which::which(program).ok().map(Self::new)
    }

    /// Convert `source` into `destination`.
    pub async fn convert(&self, source: &Path, destination: &Path) -> Result<()> {
        debug!(
            binary = %self.binary_path.display(),
            source = %source.display(),
            "running pdftotext"
        );

        let output = Command::new(&self.binary_path)
            .arg("-layout")
            .arg(source)
            .arg(destination)
            .output()
            .await
            .map_err(|e| InspectorError::Extraction(format!("failed to execute pdftotext: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InspectorError::Extraction(format!(
                "pdftotext failed on {} ({}): {}",
                source.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
