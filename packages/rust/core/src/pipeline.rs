//! Save a single report: infer → validate → download → extract → write metadata.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use inspectors_shared::{Extractor, Fetcher, InspectorError, PipelineOptions, Result};

use crate::inference::infer;
use crate::paths::path_for;
use crate::report::{DocumentKind, RawReport, Report};

/// What happened to a record that passed validation.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    /// Metadata was written (and the document fetched, unless skipped).
    Saved(SavedReport),
    /// The download failed; nothing was written for this record.
    DownloadFailed,
}

impl SaveOutcome {
    /// Whether the record counts as saved.
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// Paths written for a saved report, relative to the data root unless noted.
#[derive(Debug, Clone)]
pub struct SavedReport {
    /// The validated record as written to `report.json`.
    pub report: Report,
    /// Downloaded document, if a download happened.
    pub report_path: Option<String>,
    /// Extracted text (absolute), if extraction succeeded.
    pub text_path: Option<PathBuf>,
    /// Metadata file.
    pub data_path: String,
}

/// Run one record through the pipeline.
///
/// Returns `Err` for records that fail validation (fatal for the record, the
/// caller decides whether to keep going) and for failures writing metadata.
/// A failed download is not an error: it yields [`SaveOutcome::DownloadFailed`]
/// and leaves no metadata behind, so the record can simply be reprocessed.
#[instrument(
    skip_all,
    fields(
        inspector = raw.inspector.as_deref().unwrap_or_default(),
        report_id = raw.report_id.as_deref().unwrap_or_default(),
        dry_run = options.dry_run,
    )
)]
pub async fn save_report(
    mut raw: RawReport,
    options: &PipelineOptions,
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
) -> Result<SaveOutcome> {
    infer(&mut raw);
    let report = Report::try_from(raw)?;

    warn!(
        "[{}][{}][{}]",
        report.report_type, report.published_on, report.report_id
    );

    let mut report_path = None;
    let mut text_path = None;

    if options.dry_run {
        warn!("skipping download and extraction, dry_run == true");
    } else if report.is_unreleased() {
        warn!("no download/extraction of unreleased report");
    } else {
        match download_report(&report, options, fetcher).await {
            Ok(path) => {
                info!(report = %path, "downloaded report");
                report_path = Some(path);
            }
            Err(e) => {
                warn!(error = %e, "error downloading report, skipping");
                return Ok(SaveOutcome::DownloadFailed);
            }
        }

        text_path = extract_report(&report, options, extractor).await;
        if let Some(path) = &text_path {
            info!(text = %path.display(), "extracted text");
        }
    }

    let data_path = write_report(&report, options)?;
    info!(data = %data_path, "wrote metadata");

    Ok(SaveOutcome::Saved(SavedReport {
        report,
        report_path,
        text_path,
        data_path,
    }))
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Fetch the report document into the data tree. Returns its relative path.
async fn download_report(
    report: &Report,
    options: &PipelineOptions,
    fetcher: &dyn Fetcher,
) -> Result<String> {
    let (Some(url), Some(file_type)) = (report.url.as_deref(), report.file_type.as_deref()) else {
        return Err(InspectorError::validation(
            "released report without url or file_type",
        ));
    };

    let report_path = document_path(report, file_type);
    let binary = DocumentKind::from_file_type(file_type) == DocumentKind::Pdf;
    let destination = options.data_dir.join(&report_path);

    debug!(url, destination = %destination.display(), binary, "downloading report");
    fetcher.download(url, &destination, binary).await?;

    Ok(report_path)
}

/// Extract text next to the downloaded document. Failures are logged, not returned.
async fn extract_report(
    report: &Report,
    options: &PipelineOptions,
    extractor: &dyn Extractor,
) -> Option<PathBuf> {
    let file_type = report.file_type.as_deref()?;
    let source = options.data_dir.join(document_path(report, file_type));

    let result = match DocumentKind::from_file_type(file_type) {
        DocumentKind::Pdf => extractor.extract_pdf(&source).await,
        DocumentKind::Html => extractor.extract_html(&source).await,
        DocumentKind::Other => {
            warn!(file_type, "unknown file type, don't know how to extract text");
            return None;
        }
    };

    match result {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(error = %e, source = %source.display(), "text extraction failed");
            None
        }
    }
}

/// Write `report.json` under the data root. Returns its relative path.
fn write_report(report: &Report, options: &PipelineOptions) -> Result<String> {
    let data_path = path_for(
        &report.inspector,
        report.year,
        &report.report_id,
        "json",
    );
    write_json(&options.data_dir.join(&data_path), report)?;
    Ok(data_path)
}

fn document_path(report: &Report, file_type: &str) -> String {
    path_for(&report.inspector, report.year, &report.report_id, file_type)
}

/// Write pretty JSON via a temp file and rename, creating parent directories.
fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| InspectorError::parse(format!("JSON serialization failed: {e}")))?;

    let parent = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| InspectorError::io(parent, e))?;

    let temp = path.with_extension("json.tmp");
    std::fs::write(&temp, json).map_err(|e| InspectorError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| InspectorError::io(path, e))?;

    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::Value;

    #[derive(Default)]
    struct FakeFetcher {
        fail: bool,
        calls: Mutex<Vec<(String, PathBuf, bool)>>,
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn download(&self, url: &str, destination: &Path, binary: bool) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), destination.to_path_buf(), binary));
            if self.fail {
                return Err(InspectorError::Network(format!("{url}: HTTP 503")));
            }
            std::fs::create_dir_all(destination.parent().unwrap()).unwrap();
            std::fs::write(destination, b"document").unwrap();
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeExtractor {
        fail: bool,
        calls: Mutex<Vec<(&'static str, PathBuf)>>,
    }

    impl FakeExtractor {
        fn record(&self, kind: &'static str, path: &Path) -> Result<PathBuf> {
            self.calls.lock().unwrap().push((kind, path.to_path_buf()));
            if self.fail {
                return Err(InspectorError::Extraction("corrupt document".into()));
            }
            let text = path.with_extension("txt");
            std::fs::write(&text, "text").unwrap();
            Ok(text)
        }
    }

    #[async_trait]
    impl Extractor for FakeExtractor {
        async fn extract_pdf(&self, path: &Path) -> Result<PathBuf> {
            self.record("pdf", path)
        }

        async fn extract_html(&self, path: &Path) -> Result<PathBuf> {
            self.record("html", path)
        }
    }

    fn temp_options(dry_run: bool) -> PipelineOptions {
        let root = std::env::temp_dir().join(format!("ig-pipeline-test-{}", uuid::Uuid::now_v7()));
        PipelineOptions {
            dry_run,
            data_dir: root.join("data"),
            cache_dir: root.join("cache"),
        }
    }

    fn record(url: Option<&str>) -> RawReport {
        RawReport {
            report_id: Some("OIG-20-01".into()),
            title: Some("Review of Border Facilities".into()),
            inspector: Some("dhs-oig".into()),
            inspector_url: Some("https://www.oig.dhs.gov".into()),
            agency: Some("dhs".into()),
            agency_name: Some("Department of Homeland Security".into()),
            published_on: Some("2020-03-05".into()),
            url: url.map(String::from),
            ..RawReport::default()
        }
    }

    fn read_json(path: &Path) -> Value {
        let content = std::fs::read_to_string(path).expect("read metadata");
        serde_json::from_str(&content).expect("parse metadata")
    }

    fn cleanup(options: &PipelineOptions) {
        if let Some(root) = options.data_dir.parent() {
            let _ = std::fs::remove_dir_all(root);
        }
    }

    #[tokio::test]
    async fn saves_pdf_report() {
        let options = temp_options(false);
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();

        let outcome = save_report(
            record(Some("https://www.oig.dhs.gov/assets/OIG-20-01.pdf")),
            &options,
            &fetcher,
            &extractor,
        )
        .await
        .unwrap();

        let SaveOutcome::Saved(saved) = outcome else {
            panic!("expected saved outcome");
        };
        assert_eq!(saved.report_path.as_deref(), Some("dhs-oig/2020/OIG-20-01/report.pdf"));
        assert_eq!(saved.data_path, "dhs-oig/2020/OIG-20-01/report.json");

        let calls = fetcher.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://www.oig.dhs.gov/assets/OIG-20-01.pdf");
        assert_eq!(calls[0].1, options.data_dir.join("dhs-oig/2020/OIG-20-01/report.pdf"));
        assert!(calls[0].2, "pdf downloads are binary");

        let extractions = extractor.calls.lock().unwrap();
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].0, "pdf");
        assert_eq!(
            saved.text_path,
            Some(options.data_dir.join("dhs-oig/2020/OIG-20-01/report.txt"))
        );

        let meta = read_json(&options.data_dir.join(&saved.data_path));
        assert_eq!(meta["year"], 2020);
        assert_eq!(meta["type"], "report");
        assert_eq!(meta["file_type"], "pdf");
        assert!(!options.data_dir.join("dhs-oig/2020/OIG-20-01/report.json.tmp").exists());

        cleanup(&options);
    }

    #[tokio::test]
    async fn uppercase_pdf_is_binary_and_extracted_as_pdf() {
        let options = temp_options(false);
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();

        let outcome = save_report(
            record(Some("https://example.gov/reports/x.PDF")),
            &options,
            &fetcher,
            &extractor,
        )
        .await
        .unwrap();

        assert!(outcome.is_saved());
        assert!(fetcher.calls.lock().unwrap()[0].2);
        let extractions = extractor.calls.lock().unwrap();
        assert_eq!(extractions[0].0, "pdf");
        assert!(extractions[0].1.ends_with("report.PDF"));

        cleanup(&options);
    }

    #[tokio::test]
    async fn html_report_is_text_download() {
        let options = temp_options(false);
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();

        save_report(
            record(Some("https://example.gov/reports/summary.htm")),
            &options,
            &fetcher,
            &extractor,
        )
        .await
        .unwrap();

        assert!(!fetcher.calls.lock().unwrap()[0].2);
        assert_eq!(extractor.calls.lock().unwrap()[0].0, "html");

        cleanup(&options);
    }

    #[tokio::test]
    async fn unknown_file_type_skips_extraction_only() {
        let options = temp_options(false);
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();

        let outcome = save_report(
            record(Some("https://example.gov/reports/workpapers.docx")),
            &options,
            &fetcher,
            &extractor,
        )
        .await
        .unwrap();

        let SaveOutcome::Saved(saved) = outcome else {
            panic!("expected saved outcome");
        };
        assert_eq!(fetcher.calls.lock().unwrap().len(), 1);
        assert!(extractor.calls.lock().unwrap().is_empty());
        assert!(saved.text_path.is_none());
        assert!(options.data_dir.join(&saved.data_path).exists());

        cleanup(&options);
    }

    #[tokio::test]
    async fn extraction_failure_still_writes_metadata() {
        let options = temp_options(false);
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor {
            fail: true,
            ..FakeExtractor::default()
        };

        let outcome = save_report(
            record(Some("https://example.gov/x.pdf")),
            &options,
            &fetcher,
            &extractor,
        )
        .await
        .unwrap();

        let SaveOutcome::Saved(saved) = outcome else {
            panic!("expected saved outcome");
        };
        assert!(saved.text_path.is_none());
        assert!(options.data_dir.join(&saved.data_path).exists());

        cleanup(&options);
    }

    #[tokio::test]
    async fn download_failure_writes_nothing() {
        let options = temp_options(false);
        let fetcher = FakeFetcher {
            fail: true,
            ..FakeFetcher::default()
        };
        let extractor = FakeExtractor::default();

        let outcome = save_report(
            record(Some("https://example.gov/x.pdf")),
            &options,
            &fetcher,
            &extractor,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, SaveOutcome::DownloadFailed));
        assert!(extractor.calls.lock().unwrap().is_empty());
        assert!(!options.data_dir.join("dhs-oig/2020/OIG-20-01/report.json").exists());

        cleanup(&options);
    }

    #[tokio::test]
    async fn unreleased_report_never_touches_collaborators() {
        let options = temp_options(false);
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();

        let mut raw = record(None);
        raw.unreleased = Some(Value::Bool(true));

        let outcome = save_report(raw, &options, &fetcher, &extractor).await.unwrap();

        let SaveOutcome::Saved(saved) = outcome else {
            panic!("expected saved outcome");
        };
        assert!(fetcher.calls.lock().unwrap().is_empty());
        assert!(extractor.calls.lock().unwrap().is_empty());
        assert!(saved.report_path.is_none());

        let meta = read_json(&options.data_dir.join(&saved.data_path));
        assert_eq!(meta["unreleased"], true);
        assert!(meta.get("url").is_none());

        cleanup(&options);
    }

    #[tokio::test]
    async fn truthy_unreleased_value_is_written_back_as_received() {
        let options = temp_options(false);
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();

        let mut raw = record(Some("https://example.gov/x.pdf"));
        raw.unreleased = Some(Value::from(1));

        let outcome = save_report(raw, &options, &fetcher, &extractor).await.unwrap();

        let SaveOutcome::Saved(saved) = outcome else {
            panic!("expected saved outcome");
        };
        assert_eq!(fetcher.calls.lock().unwrap().len(), 1);
        assert!(saved.report_path.is_some());

        let meta = read_json(&options.data_dir.join(&saved.data_path));
        assert_eq!(meta["unreleased"], 1);

        cleanup(&options);
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn progress_lines_log_at_warn() {
        let options = temp_options(true);
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();

        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let raw = record(Some("https://example.gov/x.pdf"));
        save_report(raw, &options, &fetcher, &extractor).await.unwrap();

        let logs = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("[report][2020-03-05][OIG-20-01]"));
        assert!(logs.contains("dry_run == true"));
        assert!(!logs.contains("wrote metadata"));

        cleanup(&options);
    }

    #[tokio::test]
    async fn dry_run_is_idempotent() {
        let options = temp_options(true);
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();
        let raw = record(Some("https://example.gov/x.pdf"));

        let first = save_report(raw.clone(), &options, &fetcher, &extractor).await.unwrap();
        let second = save_report(raw, &options, &fetcher, &extractor).await.unwrap();

        let (SaveOutcome::Saved(first), SaveOutcome::Saved(second)) = (first, second) else {
            panic!("expected saved outcomes");
        };
        assert_eq!(first.data_path, second.data_path);
        assert!(fetcher.calls.lock().unwrap().is_empty());
        assert!(extractor.calls.lock().unwrap().is_empty());
        assert!(options.data_dir.join(&first.data_path).exists());
        assert!(!options.data_dir.join("dhs-oig/2020/OIG-20-01/report.pdf").exists());

        cleanup(&options);
    }

    #[tokio::test]
    async fn invalid_record_is_fatal_and_writes_nothing() {
        let options = temp_options(false);
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();

        let mut raw = record(Some("https://example.gov/x.pdf"));
        raw.published_on = Some("2020-3-05".into());

        let err = save_report(raw, &options, &fetcher, &extractor)
            .await
            .unwrap_err();

        assert!(err.is_invalid_report());
        assert!(err.to_string().contains("zero prefixing"));
        assert!(fetcher.calls.lock().unwrap().is_empty());
        assert!(!options.data_dir.exists());
    }

    #[tokio::test]
    async fn metadata_keeps_inferred_and_extra_fields() {
        let options = temp_options(true);
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();

        let mut raw = record(Some("https://example.gov/x.htm"));
        raw.report_type = Some("audit".into());
        raw.extra
            .insert("landing_url".into(), Value::from("https://example.gov/landing"));

        let outcome = save_report(raw, &options, &fetcher, &extractor).await.unwrap();
        let SaveOutcome::Saved(saved) = outcome else {
            panic!("expected saved outcome");
        };

        let meta = read_json(&options.data_dir.join(&saved.data_path));
        assert_eq!(meta["type"], "audit");
        assert_eq!(meta["file_type"], "htm");
        assert_eq!(meta["year"], 2020);
        assert_eq!(meta["landing_url"], "https://example.gov/landing");

        cleanup(&options);
    }
}
