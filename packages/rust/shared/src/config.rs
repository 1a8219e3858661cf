//! Application configuration for Inspectors.
//!
//! User config lives at `~/.inspectors/inspectors.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InspectorError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "inspectors.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".inspectors";

// ---------------------------------------------------------------------------
// Config structs (matching inspectors.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where reports and scraper caches are written.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP download settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Text extraction settings.
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the report data tree.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Root of the per-inspector scraper cache.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_dir: default_cache_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_cache_dir() -> String {
    "cache".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum redirects followed per download.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Override for the User-Agent header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
            user_agent: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_redirects() -> usize {
    5
}

/// `[extract]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Name or path of the `pdftotext` binary.
    #[serde(default = "default_pdftotext")]
    pub pdftotext: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            pdftotext: default_pdftotext(),
        }
    }
}

fn default_pdftotext() -> String {
    "pdftotext".into()
}

// ---------------------------------------------------------------------------
// Pipeline options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime options for saving reports — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Validate and write metadata, but skip download and extraction.
    pub dry_run: bool,
    /// Root of the report data tree.
    pub data_dir: PathBuf,
    /// Root of the per-inspector scraper cache.
    pub cache_dir: PathBuf,
}

impl From<&AppConfig> for PipelineOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            dry_run: false,
            data_dir: PathBuf::from(&config.storage.data_dir),
            cache_dir: PathBuf::from(&config.storage.cache_dir),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.inspectors/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| InspectorError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.inspectors/inspectors.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| InspectorError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        InspectorError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| InspectorError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| InspectorError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| InspectorError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
