//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use inspectors_core::{
    RawReport, Report, SaveOutcome, YearOptions, cache_path, infer, path_for, save_report,
    year_range,
};
use inspectors_extract::TextExtractor;
use inspectors_fetch::HttpFetcher;
use inspectors_shared::{AppConfig, PipelineOptions, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Inspectors — save inspector general reports with their text and metadata.
#[derive(Parser)]
#[command(
    name = "inspectors",
    version,
    about = "Validate, download, and archive inspector general reports.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.inspectors/inspectors.toml).
    #[arg(long, global = true, env = "INSPECTORS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Overrides for the `[storage]` config section.
#[derive(clap::Args, Clone, Debug, Default)]
pub(crate) struct StorageArgs {
    /// Root of the report data tree.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Root of the scraper cache.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Save report records: validate, download, extract text, write metadata.
    Save {
        /// JSON file holding one record or an array of records (`-` for stdin).
        file: String,

        /// Validate and write metadata only; skip download and extraction.
        #[arg(long)]
        dry_run: bool,

        /// Continue past invalid records instead of aborting the run.
        #[arg(long)]
        keep_going: bool,

        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Print the years a scraper run should cover.
    Years {
        /// First year of the range (through the current year).
        #[arg(long)]
        since: Option<String>,

        /// A single year.
        #[arg(long)]
        year: Option<String>,
    },

    /// Print where each record's files are stored, without fetching anything.
    Paths {
        /// JSON file holding one record or an array of records (`-` for stdin).
        file: String,

        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Print the cache location of a scraper file.
    Cache {
        /// Inspector (scraper) identifier.
        inspector: String,

        /// Path of the file within the inspector's cache.
        path: String,

        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "inspectors=info",
        1 => "inspectors=debug",
        _ => "inspectors=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Save {
            file,
            dry_run,
            keep_going,
            storage,
        } => cmd_save(config_path, &file, dry_run, keep_going, &storage).await,
        Command::Years { since, year } => cmd_years(since, year),
        Command::Paths { file, storage } => cmd_paths(config_path, &file, &storage),
        Command::Cache {
            inspector,
            path,
            storage,
        } => cmd_cache(config_path, &inspector, &path, &storage),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_save(
    config_path: Option<&Path>,
    file: &str,
    dry_run: bool,
    keep_going: bool,
    storage: &StorageArgs,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let mut options = pipeline_options(&config, storage);
    options.dry_run = dry_run;

    let records = load_records(&read_input(file)?)?;
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let extractor = TextExtractor::new(&config.extract);

    info!(
        records = records.len(),
        dry_run,
        data_dir = %options.data_dir.display(),
        "saving reports"
    );

    let progress = ProgressBar::new(records.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")
            .map_err(|e| eyre!("invalid progress template: {e}"))?,
    );

    let mut summary = SaveSummary::default();

    for value in records {
        progress.set_message(
            value
                .get("report_id")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
        );

        let result = match RawReport::from_value(value) {
            Ok(raw) => save_report(raw, &options, &fetcher, &extractor).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(SaveOutcome::Saved(_)) => summary.saved += 1,
            Ok(SaveOutcome::DownloadFailed) => summary.failed += 1,
            Err(e) if e.is_invalid_report() && keep_going => {
                error!("{e}");
                summary.invalid += 1;
            }
            Err(e) => {
                progress.abandon();
                return Err(e.into());
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();

    println!();
    println!("  Saved:   {}", summary.saved);
    println!("  Failed:  {}", summary.failed);
    println!("  Invalid: {}", summary.invalid);
    println!();

    if summary.invalid > 0 {
        return Err(eyre!("{} invalid report(s)", summary.invalid));
    }

    Ok(())
}

/// Per-run counts printed after `save`.
#[derive(Debug, Default)]
struct SaveSummary {
    saved: usize,
    failed: usize,
    invalid: usize,
}

fn cmd_years(since: Option<String>, year: Option<String>) -> Result<()> {
    let years = year_range(&YearOptions { since, year })?;
    for year in years {
        println!("{year}");
    }
    Ok(())
}

fn cmd_paths(config_path: Option<&Path>, file: &str, storage: &StorageArgs) -> Result<()> {
    let config = resolve_config(config_path)?;
    let options = pipeline_options(&config, storage);

    for value in load_records(&read_input(file)?)? {
        let mut raw = RawReport::from_value(value)?;
        infer(&mut raw);
        let report = Report::try_from(raw)?;

        if let Some(file_type) = &report.file_type {
            let document = path_for(&report.inspector, report.year, &report.report_id, file_type);
            println!("{}", options.data_dir.join(document).display());
        }
        let data = path_for(&report.inspector, report.year, &report.report_id, "json");
        println!("{}", options.data_dir.join(data).display());
    }

    Ok(())
}

fn cmd_cache(
    config_path: Option<&Path>,
    inspector: &str,
    path: &str,
    storage: &StorageArgs,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let options = pipeline_options(&config, storage);
    println!("{}", cache_path(&options.cache_dir, inspector, path).display());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Merge config file values with CLI overrides.
fn pipeline_options(config: &AppConfig, storage: &StorageArgs) -> PipelineOptions {
    let mut options = PipelineOptions::from(config);
    if let Some(dir) = &storage.data_dir {
        options.data_dir = dir.clone();
    }
    if let Some(dir) = &storage.cache_dir {
        options.cache_dir = dir.clone();
    }
    options
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .wrap_err("failed to read records from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file).wrap_err_with(|| format!("failed to read '{file}'"))
    }
}

/// Split input into one JSON value per record: a single object or an array.
///
/// Records are deserialized one at a time later, so a malformed record only
/// fails itself.
fn load_records(content: &str) -> Result<Vec<serde_json::Value>> {
    let value: serde_json::Value =
        serde_json::from_str(content).wrap_err("records are not valid JSON")?;

    match value {
        serde_json::Value::Array(items) => Ok(items),
        object @ serde_json::Value::Object(_) => Ok(vec![object]),
        other => Err(eyre!(
            "expected a JSON object or array of objects, got: {other}"
        )),
    }
}
