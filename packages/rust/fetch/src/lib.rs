//! HTTP download of report documents.
//!
//! [`HttpFetcher`] is the production [`Fetcher`]: one GET per report, written
//! to a temp file beside the destination and renamed into place.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use inspectors_shared::{FetchConfig, Fetcher, InspectorError, Result};

/// User-Agent string for download requests.
const USER_AGENT: &str = concat!("Inspectors/", env!("CARGO_PKG_VERSION"));

/// Downloads report documents over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher from the `[fetch]` config section.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or(USER_AGENT);

        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InspectorError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn fetch_body(&self, url: &str, binary: bool) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InspectorError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InspectorError::Network(format!("{url}: HTTP {status}")));
        }

        let body = if binary {
            response
                .bytes()
                .await
                .map_err(|e| InspectorError::Network(format!("{url}: body read failed: {e}")))?
                .to_vec()
        } else {
            // Decodes using the response charset, falling back to UTF-8.
            response
                .text()
                .await
                .map_err(|e| InspectorError::Network(format!("{url}: body read failed: {e}")))?
                .into_bytes()
        };

        Ok(body)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self, destination), fields(destination = %destination.display()))]
    async fn download(&self, url: &str, destination: &Path, binary: bool) -> Result<()> {
        let body = self.fetch_body(url, binary).await?;
        write_atomic(destination, &body).await?;
        debug!(bytes = body.len(), "download complete");
        Ok(())
    }
}

/// Write `data` to `path` via a temp file and rename, creating parent directories.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| InspectorError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    tokio::fs::write(&temp, data)
        .await
        .map_err(|e| InspectorError::io(&temp, e))?;
    tokio::fs::rename(&temp, path)
        .await
        .map_err(|e| InspectorError::io(path, e))?;

    Ok(())
}
