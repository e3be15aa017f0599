//! Listing page fetch and archive link collection.
//!
//! The collector issues exactly one GET for the listing page. Anything other
//! than `200 OK` is an error and nothing is downloaded. On success the page is
//! parsed and every anchor whose destination contains the archive marker is
//! turned into an absolute URL.
//!
//! # Example
//!
//! ```no_run
//! use pgn_downloader_core::{HttpClient, collect_links};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let links = collect_links(&client, "https://www.pgnmentor.com/", "files.html").await?;
//! println!("{}", links.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod links;

pub use error::CollectError;
pub use links::{LinkJoin, LinkSet, extract_links};

use reqwest::StatusCode;
use tracing::{debug, info, instrument};
use url::Url;

use crate::download::HttpClient;

/// Site mirrored when no host is configured.
pub const DEFAULT_HOST: &str = "https://www.pgnmentor.com/";

/// Listing page path, relative to the host.
pub const DEFAULT_LISTING_PATH: &str = "files.html";

/// Substring an anchor destination must contain to count as an archive.
pub const ARCHIVE_MARKER: &str = ".zip";

/// Fetches a listing page and extracts its archive links.
#[derive(Debug, Clone)]
pub struct LinkCollector {
    host: String,
    listing_path: String,
    marker: String,
    join: LinkJoin,
}

impl LinkCollector {
    /// Creates a collector for `host + listing_path` with the default marker
    /// and verbatim joining.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::InvalidHost`] unless `host` is an absolute
    /// http or https URL ending in `/`.
    pub fn new(
        host: impl Into<String>,
        listing_path: impl Into<String>,
    ) -> Result<Self, CollectError> {
        let host = host.into();
        validate_host(&host)?;
        Ok(Self {
            host,
            listing_path: listing_path.into(),
            marker: ARCHIVE_MARKER.to_string(),
            join: LinkJoin::default(),
        })
    }

    /// Replaces the archive marker.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Replaces the link joining rule.
    #[must_use]
    pub fn with_join(mut self, join: LinkJoin) -> Self {
        self.join = join;
        self
    }

    /// The configured host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Full URL of the listing page.
    #[must_use]
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.host, self.listing_path)
    }

    /// Fetches the listing page and returns the archive links on it.
    ///
    /// # Errors
    ///
    /// - [`CollectError::ListingStatus`] if the page does not answer `200 OK`
    /// - [`CollectError::Network`] / [`CollectError::Timeout`] on transport
    ///   failures
    #[instrument(skip(self, client), fields(url = %self.listing_url()))]
    pub async fn collect(&self, client: &HttpClient) -> Result<LinkSet, CollectError> {
        let url = self.listing_url();

        let response = client
            .get(&url)
            .await
            .map_err(|e| CollectError::network(&url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CollectError::listing_status(&url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CollectError::network(&url, e))?;
        debug!(bytes = body.len(), "listing page fetched");

        let links = extract_links(&body, &self.host, &self.marker, self.join);
        info!(links = links.len(), marker = %self.marker, "collected archive links");
        Ok(links)
    }
}

/// Collects archive links from `host + listing_path` with default settings.
///
/// # Errors
///
/// See [`LinkCollector::new`] and [`LinkCollector::collect`].
pub async fn collect_links(
    client: &HttpClient,
    host: &str,
    listing_path: &str,
) -> Result<LinkSet, CollectError> {
    LinkCollector::new(host, listing_path)?.collect(client).await
}

fn validate_host(host: &str) -> Result<(), CollectError> {
    let parsed = Url::parse(host).map_err(|e| CollectError::invalid_host(host, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(CollectError::invalid_host(
                host,
                format!("scheme '{scheme}' is not supported"),
            ));
        }
    }
    // The listing path and archive links are appended to the host as-is.
    if !host.ends_with('/') {
        return Err(CollectError::invalid_host(host, "must end with '/'"));
    }
    Ok(())
}
