//! PGN Downloader Core Library
//!
//! This library mirrors the archive files published on a chess-database
//! download page into a local directory. A run has two phases:
//!
//! 1. the [`collector`] fetches the listing page once and extracts the set of
//!    archive URLs from its anchors;
//! 2. the [`download`] runner fetches every archive that is not already on
//!    disk, with a bounded number of requests in flight.
//!
//! Files that already exist with a non-zero size are skipped, so a re-run
//! after a failure picks up where the previous one stopped.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod collector;
pub mod download;
mod user_agent;

// Re-export commonly used types
pub use collector::{
    ARCHIVE_MARKER, CollectError, DEFAULT_HOST, DEFAULT_LISTING_PATH, LinkCollector, LinkJoin,
    LinkSet, collect_links, extract_links,
};
pub use download::{
    ClientSettings, DEFAULT_MAX_CONNECTIONS, DEFAULT_OUTPUT_DIR, DownloadError, DownloadRunner,
    FailedLink, FailurePolicy, HttpClient, ItemOutcome, LocalFileState, NoopObserver,
    RunObserver, RunSummary, RunnerConfig, RunnerError, derive_filename, inspect_local_file,
    local_path,
};
