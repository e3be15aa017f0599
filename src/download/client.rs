//! HTTP client wrapper shared by the listing fetch and the archive downloads.
//!
//! One [`HttpClient`] is created per run. Cloning it is cheap and every clone
//! uses the same connection pool, whose idle capacity per host is sized to
//! the runner's connection limit.

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS, REQUEST_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent;

/// Tunables for the underlying connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout, body included.
    pub request_timeout: Duration,
    /// Idle connections kept per host.
    pub max_connections: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// HTTP client for the listing page and the archives.
///
/// # Example
///
/// ```no_run
/// use pgn_downloader_core::download::HttpClient;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let bytes = client
///     .download_to_path(
///         "https://www.pgnmentor.com//openings/OwenDefense.zip",
///         Path::new("database/-openings-OwenDefense.zip"),
///     )
///     .await?;
/// println!("wrote {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_settings(&ClientSettings::default())
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a new HTTP client with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend or system
    /// configuration cannot be initialised.
    #[instrument(level = "debug")]
    pub fn with_settings(settings: &ClientSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .pool_max_idle_per_host(settings.max_connections)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Sends a GET request and returns the response whatever its status.
    ///
    /// # Errors
    ///
    /// Returns the transport error if no response was received.
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        debug!(status = response.status().as_u16(), "response received");
        Ok(response)
    }

    /// Downloads `url` and writes the whole body to `path`.
    ///
    /// The body is read fully into memory and written in one operation with
    /// create/truncate semantics. If the write fails, the partial file is
    /// removed so a later run does not mistake it for a finished download.
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The request fails (network error, timeout)
    /// - The server returns any status other than 200
    /// - Writing to disk fails
    #[must_use = "download result contains the number of bytes written"]
    #[instrument(skip(self), fields(url = %url, path = %path.display()))]
    pub async fn download_to_path(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        let response = self
            .get(url)
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        if let Err(e) = tokio::fs::write(path, &body).await {
            debug!("cleaning up partial file after error");
            let _ = tokio::fs::remove_file(path).await;
            return Err(DownloadError::io(path, e));
        }

        Ok(body.len() as u64)
    }
}
