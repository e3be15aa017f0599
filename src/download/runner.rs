//! Download runner that mirrors a link set into a local directory.
//!
//! Every local target file is handled by its own Tokio task; links that
//! derive the same file share a task and run in order. A semaphore bounds how
//! many tasks are in flight, and all tasks share one [`HttpClient`]
//! connection pool.
//!
//! # Example
//!
//! ```no_run
//! use pgn_downloader_core::{DownloadRunner, HttpClient, LinkSet, RunnerConfig};
//! use std::path::Path;
//!
//! # async fn example(links: LinkSet) -> Result<(), Box<dyn std::error::Error>> {
//! let runner = DownloadRunner::new(RunnerConfig::new("https://www.pgnmentor.com/"))?;
//! let client = HttpClient::new();
//! let summary = runner.run(&links, &client, Path::new("database")).await?;
//! println!("wrote {}, skipped {}", summary.written(), summary.skipped());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, info, instrument, warn};

use super::HttpClient;
use super::constants::{DEFAULT_MAX_CONNECTIONS, MAX_CONNECTIONS, MIN_CONNECTIONS};
use super::error::{DownloadError, RunnerError};
use super::filename::{LocalFileState, inspect_local_file, local_path};
use crate::collector::LinkSet;

/// What the runner does after an archive fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop scheduling new downloads after the first failure. Downloads
    /// already in flight finish, then the run returns the failure.
    #[default]
    FailFast,
    /// Attempt every link and report failures in the summary.
    ContinueOnError,
}

/// Runner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Maximum downloads in flight at once.
    pub max_connections: usize,
    /// Behaviour after a failed archive.
    pub failure_policy: FailurePolicy,
    /// Host string removed from URLs when deriving local filenames.
    pub host: String,
}

impl RunnerConfig {
    /// Creates a configuration with default limits for the given host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            failure_policy: FailurePolicy::default(),
            host: host.into(),
        }
    }
}

/// Result of handling one link, reported to the [`RunObserver`].
#[derive(Debug)]
pub enum ItemOutcome {
    /// A non-empty file was already on disk.
    Skipped {
        /// Archive URL.
        url: String,
        /// Local target path.
        path: PathBuf,
        /// Size of the existing file.
        size: u64,
    },
    /// The archive was fetched and written.
    Written {
        /// Archive URL.
        url: String,
        /// Local target path.
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
    },
    /// The archive could not be mirrored.
    Failed {
        /// Archive URL.
        url: String,
        /// Local target path.
        path: PathBuf,
        /// Why it failed.
        error: DownloadError,
    },
}

impl ItemOutcome {
    /// Archive URL this outcome belongs to.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Skipped { url, .. } | Self::Written { url, .. } | Self::Failed { url, .. } => url,
        }
    }

    /// Local target path this outcome belongs to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Skipped { path, .. } | Self::Written { path, .. } | Self::Failed { path, .. } => {
                path
            }
        }
    }
}

/// Receives each outcome as soon as the runner collects it.
pub trait RunObserver: Send + Sync {
    /// Called once per link, in completion order.
    fn on_outcome(&self, outcome: &ItemOutcome);
}

/// Observer that ignores every outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_outcome(&self, _outcome: &ItemOutcome) {}
}

/// A link that failed, with the rendered error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedLink {
    /// Archive URL.
    pub url: String,
    /// Error message.
    pub error: String,
}

/// Counts from one run.
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    written: usize,
    skipped: usize,
    bytes_written: u64,
    failures: Vec<FailedLink>,
}

impl RunSummary {
    /// Number of archives fetched and written.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Number of archives already on disk.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of archives that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Total links handled.
    #[must_use]
    pub fn total(&self) -> usize {
        self.written + self.skipped + self.failed()
    }

    /// Bytes written across all archives.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Failed links in completion order.
    #[must_use]
    pub fn failures(&self) -> &[FailedLink] {
        &self.failures
    }

    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Skipped { .. } => self.skipped += 1,
            ItemOutcome::Written { bytes, .. } => {
                self.written += 1;
                self.bytes_written += bytes;
            }
            ItemOutcome::Failed { url, error, .. } => self.record_failure(url, error.to_string()),
        }
    }

    fn record_failure(&mut self, url: &str, error: String) {
        self.failures.push(FailedLink {
            url: url.to_string(),
            error,
        });
    }
}

enum ItemStatus {
    Skipped { size: u64 },
    Written { bytes: u64 },
}

type ArchiveResult = (String, PathBuf, Result<ItemStatus, DownloadError>);

/// Links that derive the same local path, in scheduling order.
#[derive(Debug, PartialEq, Eq)]
struct TargetGroup {
    path: PathBuf,
    urls: Vec<String>,
}

/// Groups links by local target so no two tasks ever write the same file.
///
/// Groups keep the order of their first link in `links.sorted()`, and each
/// group lists its links in that same order.
fn group_by_target(links: &LinkSet, output_dir: &Path, host: &str) -> Vec<TargetGroup> {
    let mut groups: Vec<TargetGroup> = Vec::new();
    let mut index: HashMap<PathBuf, usize> = HashMap::new();

    for url in links.sorted() {
        let path = local_path(output_dir, url, host);
        if let Some(&slot) = index.get(&path) {
            debug!(url, path = %path.display(), "link shares a local file with an earlier link");
            groups[slot].urls.push(url.to_string());
        } else {
            index.insert(path.clone(), groups.len());
            groups.push(TargetGroup {
                path,
                urls: vec![url.to_string()],
            });
        }
    }
    groups
}

/// Mirrors a [`LinkSet`] into a directory with bounded parallelism.
#[derive(Debug)]
pub struct DownloadRunner {
    config: RunnerConfig,
    semaphore: Arc<Semaphore>,
}

impl DownloadRunner {
    /// Creates a runner.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::InvalidConcurrency`] if `max_connections` is
    /// outside 1..=32.
    #[instrument(level = "debug")]
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let value = config.max_connections;
        if !(MIN_CONNECTIONS..=MAX_CONNECTIONS).contains(&value) {
            return Err(RunnerError::InvalidConcurrency { value });
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(value)),
            config,
        })
    }

    /// Returns the runner configuration.
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Mirrors every link without reporting individual outcomes.
    ///
    /// # Errors
    ///
    /// See [`run_with_observer`](Self::run_with_observer).
    pub async fn run(
        &self,
        links: &LinkSet,
        client: &HttpClient,
        output_dir: &Path,
    ) -> Result<RunSummary, RunnerError> {
        self.run_with_observer(links, client, output_dir, &NoopObserver)
            .await
    }

    /// Mirrors every link, reporting each outcome to `observer`.
    ///
    /// # Errors
    ///
    /// - [`RunnerError::OutputDirMissing`] before any request if `output_dir`
    ///   is not an existing directory
    /// - [`RunnerError::OutputDirUnreadable`] if `output_dir` cannot be
    ///   inspected for any other reason
    /// - [`RunnerError::ArchiveFailed`] / [`RunnerError::TaskPanicked`] for the
    ///   first failure under [`FailurePolicy::FailFast`]
    ///
    /// Under [`FailurePolicy::ContinueOnError`] archive failures are only
    /// reported through the returned summary.
    #[instrument(skip(self, links, client, observer), fields(links = links.len(), output_dir = %output_dir.display()))]
    pub async fn run_with_observer(
        &self,
        links: &LinkSet,
        client: &HttpClient,
        output_dir: &Path,
        observer: &dyn RunObserver,
    ) -> Result<RunSummary, RunnerError> {
        ensure_output_dir(output_dir).await?;

        let fail_fast = self.config.failure_policy == FailurePolicy::FailFast;
        let stop = Arc::new(AtomicBool::new(false));
        let mut summary = RunSummary::default();
        let mut halt: Option<RunnerError> = None;
        let mut tasks: JoinSet<Vec<ArchiveResult>> = JoinSet::new();
        let mut task_urls: HashMap<task::Id, Vec<String>> = HashMap::new();

        info!(
            max_connections = self.config.max_connections,
            policy = ?self.config.failure_policy,
            "starting downloads"
        );

        for group in group_by_target(links, output_dir, &self.config.host) {
            // Blocks while max_connections downloads are in flight.
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| RunnerError::SemaphoreClosed)?;

            while let Some(joined) = tasks.try_join_next_with_id() {
                self.settle(joined, &mut task_urls, &mut summary, observer, &mut halt);
            }

            if stop.load(Ordering::SeqCst) || halt.is_some() {
                debug!(in_flight = tasks.len(), "failure recorded, no new downloads");
                break;
            }

            let TargetGroup { path, urls } = group;
            let client = client.clone();
            let stop = Arc::clone(&stop);
            let group_urls = urls.clone();

            // Links sharing a target run one after another, so a later one
            // finds the file its predecessor wrote and skips it.
            let handle = tasks.spawn(async move {
                let mut results = Vec::with_capacity(urls.len());
                for url in urls {
                    if fail_fast && stop.load(Ordering::SeqCst) {
                        break;
                    }
                    let result = mirror_archive(&client, &url, &path).await;
                    let failed = result.is_err();
                    results.push((url, path.clone(), result));
                    if fail_fast && failed {
                        stop.store(true, Ordering::SeqCst);
                        break;
                    }
                }
                // Release only after the stop flag is visible to the scheduler.
                drop(permit);
                results
            });
            task_urls.insert(handle.id(), group_urls);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            self.settle(joined, &mut task_urls, &mut summary, observer, &mut halt);
        }

        info!(
            written = summary.written(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            bytes = summary.bytes_written(),
            "downloads finished"
        );

        match halt {
            Some(error) => Err(error),
            None => Ok(summary),
        }
    }

    fn settle(
        &self,
        joined: Result<(task::Id, Vec<ArchiveResult>), JoinError>,
        task_urls: &mut HashMap<task::Id, Vec<String>>,
        summary: &mut RunSummary,
        observer: &dyn RunObserver,
        halt: &mut Option<RunnerError>,
    ) {
        let fail_fast = self.config.failure_policy == FailurePolicy::FailFast;

        let results = match joined {
            Ok((id, results)) => {
                task_urls.remove(&id);
                results
            }
            Err(e) => {
                let urls = task_urls.remove(&e.id()).unwrap_or_default();
                for url in &urls {
                    warn!(url = %url, error = %e, "download task panicked");
                    summary.record_failure(url, e.to_string());
                }
                if fail_fast && halt.is_none() {
                    *halt = Some(RunnerError::TaskPanicked {
                        message: e.to_string(),
                    });
                }
                return;
            }
        };

        for (url, path, result) in results {
            let outcome = match result {
                Ok(ItemStatus::Skipped { size }) => ItemOutcome::Skipped { url, path, size },
                Ok(ItemStatus::Written { bytes }) => ItemOutcome::Written { url, path, bytes },
                Err(error) => {
                    warn!(url = %url, error = %error, "archive failed");
                    ItemOutcome::Failed { url, path, error }
                }
            };

            observer.on_outcome(&outcome);
            summary.record(&outcome);

            if let ItemOutcome::Failed { url, error, .. } = outcome
                && fail_fast
                && halt.is_none()
            {
                *halt = Some(RunnerError::ArchiveFailed { url, source: error });
            }
        }
    }
}

async fn ensure_output_dir(output_dir: &Path) -> Result<(), RunnerError> {
    match tokio::fs::metadata(output_dir).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(RunnerError::OutputDirMissing {
            path: output_dir.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RunnerError::OutputDirMissing {
            path: output_dir.to_path_buf(),
        }),
        Err(e) => Err(RunnerError::OutputDirUnreadable {
            path: output_dir.to_path_buf(),
            source: e,
        }),
    }
}

/// Skips the archive if a non-empty file is on disk, otherwise fetches it.
#[instrument(skip(client, path), fields(path = %path.display()))]
async fn mirror_archive(
    client: &HttpClient,
    url: &str,
    path: &Path,
) -> Result<ItemStatus, DownloadError> {
    let state = inspect_local_file(path)
        .await
        .map_err(|e| DownloadError::inspect(path, e))?;

    match state {
        LocalFileState::Present { size } => {
            debug!(size, "already downloaded");
            return Ok(ItemStatus::Skipped { size });
        }
        LocalFileState::Empty => debug!("zero-length file on disk, downloading again"),
        LocalFileState::Missing => {}
    }

    let bytes = client.download_to_path(url, path).await?;
    Ok(ItemStatus::Written { bytes })
}
