//! Error types for the download module.
//!
//! [`DownloadError`] describes why a single archive could not be mirrored;
//! [`RunnerError`] describes why a whole run stopped.

use std::path::PathBuf;

use thiserror::Error;

use super::constants::{MAX_CONNECTIONS, MIN_CONNECTIONS};

/// Errors that can occur while mirroring one archive.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The server answered with anything other than `200 OK`.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The local target exists but could not be inspected, or is not a
    /// regular file. The runner leaves such paths untouched.
    #[error("cannot inspect existing file {path}: {source}")]
    Inspect {
        /// The local path that was inspected.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// File system error while writing the archive.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::timeout(url);
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an inspection error for an existing local path.
    pub fn inspect(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Inspect {
            path: path.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that stop a download run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Invalid connection limit provided.
    #[error(
        "invalid connection limit {value}: must be between {MIN_CONNECTIONS} and {MAX_CONNECTIONS}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// The output directory does not exist (it is never created implicitly).
    #[error("output directory {path} does not exist or is not a directory")]
    OutputDirMissing {
        /// The configured output directory.
        path: PathBuf,
    },

    /// The output directory could not be inspected.
    #[error("cannot inspect output directory {path}: {source}")]
    OutputDirUnreadable {
        /// The configured output directory.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An archive failed under the fail-fast policy.
    #[error("archive {url} failed: {source}")]
    ArchiveFailed {
        /// The archive URL that failed.
        url: String,
        /// Why it failed.
        #[source]
        source: DownloadError,
    },

    /// A download task panicked under the fail-fast policy.
    #[error("download task panicked: {message}")]
    TaskPanicked {
        /// Join error description.
        message: String,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

// Like the reqwest and IO sources, these variants need a URL or path that the
// source errors don't carry, so there are no `From` impls; use the
// constructors above.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_http_status_display() {
        let error = DownloadError::http_status("https://example.test//a.zip", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://example.test//a.zip"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_download_error_timeout_display() {
        let error = DownloadError::timeout("https://example.test//a.zip");
        assert!(error.to_string().contains("timeout"));
    }

    #[test]
    fn test_download_error_inspect_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::inspect(PathBuf::from("database/-a.zip"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("cannot inspect"), "Expected prefix in: {msg}");
        assert!(msg.contains("database/-a.zip"), "Expected path in: {msg}");
    }

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::other("disk full");
        let error = DownloadError::io(PathBuf::from("/tmp/x.zip"), io_error);
        assert!(error.to_string().contains("/tmp/x.zip"));
    }

    #[test]
    fn test_runner_error_invalid_concurrency_display() {
        let msg = RunnerError::InvalidConcurrency { value: 0 }.to_string();
        assert!(msg.contains("invalid connection limit 0"));
        assert!(msg.contains("32"));
    }

    #[test]
    fn test_runner_error_archive_failed_keeps_source() {
        use std::error::Error as _;

        let error = RunnerError::ArchiveFailed {
            url: "https://example.test//b.zip".to_string(),
            source: DownloadError::http_status("https://example.test//b.zip", 500),
        };
        assert!(error.to_string().contains("https://example.test//b.zip"));
        let source = error.source().unwrap();
        assert!(source.to_string().contains("HTTP 500"));
    }
}
