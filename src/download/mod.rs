//! Download runner for mirroring archive files to disk.
//!
//! # Features
//!
//! - Skips archives already on disk with a non-zero size
//! - Re-downloads zero-length leftovers
//! - Bounded parallel downloads over one shared connection pool
//! - Fail-fast or continue-on-error failure policy
//! - Structured error types with full context
//!
//! Local filenames are derived from the URL alone (see [`derive_filename`]),
//! so repeated runs against the same directory are idempotent.

mod client;
mod constants;
mod error;
mod filename;
mod runner;

pub use client::{ClientSettings, HttpClient};
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS, DEFAULT_OUTPUT_DIR, MAX_CONNECTIONS,
    MIN_CONNECTIONS, REQUEST_TIMEOUT_SECS,
};
pub use error::{DownloadError, RunnerError};
pub use filename::{LocalFileState, derive_filename, inspect_local_file, local_path};
pub use runner::{
    DownloadRunner, FailedLink, FailurePolicy, ItemOutcome, NoopObserver, RunObserver,
    RunSummary, RunnerConfig,
};
