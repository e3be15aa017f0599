//! Error types for the listing fetch.

use thiserror::Error;

/// Errors that can occur while collecting archive links.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The configured host is not an absolute http(s) URL.
    #[error("invalid host '{host}': {reason}\n  Suggestion: use an absolute URL such as https://www.pgnmentor.com/")]
    InvalidHost {
        /// The host value as configured.
        host: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Network-level error fetching the listing page.
    #[error("network error fetching listing {url}: {source}")]
    Network {
        /// Listing page URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The listing request timed out.
    #[error("timeout fetching listing {url}")]
    Timeout {
        /// Listing page URL.
        url: String,
    },

    /// The listing page answered with anything other than `200 OK`.
    #[error("HTTP {status} fetching listing {url}")]
    ListingStatus {
        /// Listing page URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

impl CollectError {
    /// Creates an invalid host error.
    #[must_use]
    pub fn invalid_host(host: &str, reason: impl Into<String>) -> Self {
        Self::InvalidHost {
            host: host.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a listing status error.
    pub fn listing_status(url: impl Into<String>, status: u16) -> Self {
        Self::ListingStatus {
            url: url.into(),
            status,
        }
    }

    /// Returns the HTTP status when the listing page was reachable but
    /// answered with an unexpected status.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ListingStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
