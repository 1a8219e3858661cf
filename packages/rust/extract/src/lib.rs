//! Plain-text extraction from downloaded report documents.
//!
//! [`TextExtractor`] is the production [`Extractor`]: PDFs go through
//! `pdftotext`, HTML is parsed with `scraper`. The text is written next to
//! the source document as `report.txt`.

mod html;
mod pdf;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{instrument, warn};

use inspectors_shared::{ExtractConfig, Extractor, InspectorError, Result};

pub use html::html_to_text;
pub use pdf::PdfToText;

/// Extension of the text file written beside each document.
const TEXT_EXTENSION: &str = "txt";

/// Extracts text from PDF and HTML documents.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    pdftotext: Option<PdfToText>,
}

impl TextExtractor {
    /// Build an extractor from the `[extract]` config section.
    ///
    /// A missing `pdftotext` is not an error here; PDF extraction then fails
    /// per document, which the pipeline treats as non-fatal.
    pub fn new(config: &ExtractConfig) -> Self {
        let pdftotext = PdfToText::locate(&config.pdftotext);
        if pdftotext.is_none() {
            warn!(
                program = %config.pdftotext,
                "pdftotext not found, PDF text extraction disabled"
            );
        }
        Self { pdftotext }
    }

    /// Build an extractor with an explicit PDF handler.
    pub fn with_pdftotext(pdftotext: Option<PdfToText>) -> Self {
        Self { pdftotext }
    }
}

#[async_trait]
impl Extractor for TextExtractor {
    #[instrument(skip(self, path), fields(path = %path.display()))]
    async fn extract_pdf(&self, path: &Path) -> Result<PathBuf> {
        let Some(pdftotext) = &self.pdftotext else {
            return Err(InspectorError::Extraction(
                "pdftotext is not installed".into(),
            ));
        };

        let text_path = text_path_for(path);
        pdftotext.convert(path, &text_path).await?;
        Ok(text_path)
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    async fn extract_html(&self, path: &Path) -> Result<PathBuf> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| InspectorError::io(path, e))?;
        let text = html_to_text(&String::from_utf8_lossy(&bytes));

        let text_path = text_path_for(path);
        tokio::fs::write(&text_path, text)
            .await
            .map_err(|e| InspectorError::io(&text_path, e))?;
        Ok(text_path)
    }
}

/// `.../report.pdf` → `.../report.txt`
fn text_path_for(path: &Path) -> PathBuf {
    path.with_extension(TEXT_EXTENSION)
}
