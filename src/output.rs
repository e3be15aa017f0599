//! Console output: progress lines, the progress bar and exit outcomes.
//!
//! Progress lines go to stdout, diagnostics to stderr through `tracing`.

use std::process::ExitCode;

use indicatif::{ProgressBar, ProgressStyle};
use pgn_downloader_core::{ItemOutcome, LinkSet, RunObserver, RunSummary, local_path};

use crate::app_config::Settings;

/// How the process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Everything mirrored (or already present).
    Success,
    /// Listing unreachable, bad configuration, or a fail-fast stop.
    Failure,
    /// Continue-on-error run finished with some failed archives.
    Partial,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::from(1),
            ProcessExit::Partial => ExitCode::from(2),
        }
    }
}

/// Determines the process exit outcome from a finished run.
pub(crate) fn determine_exit_outcome(summary: &RunSummary) -> ProcessExit {
    if summary.failed() == 0 {
        ProcessExit::Success
    } else {
        ProcessExit::Partial
    }
}

/// Renders one progress line for an outcome.
pub(crate) fn outcome_line(outcome: &ItemOutcome) -> String {
    match outcome {
        ItemOutcome::Skipped { path, .. } => format!("Already downloaded {}", path.display()),
        ItemOutcome::Written { path, .. } => format!("Wrote {}", path.display()),
        ItemOutcome::Failed { url, error, .. } => format!("Failed {url}: {error}"),
    }
}

/// Lines printed by `--dry-run`: each link and the file it would be saved as.
pub(crate) fn dry_run_lines(links: &LinkSet, settings: &Settings) -> Vec<String> {
    links
        .sorted()
        .into_iter()
        .map(|url| {
            let path = local_path(&settings.output_dir, url, &settings.host);
            format!("{url} -> {}", path.display())
        })
        .collect()
}

/// Lines listing failed archives after a continue-on-error run.
pub(crate) fn failure_summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "{} of {} archives failed:",
        summary.failed(),
        summary.total()
    )];
    lines.extend(
        summary
            .failures()
            .iter()
            .map(|failure| format!("  {} ({})", failure.url, failure.error)),
    );
    lines
}

/// Prints per-archive progress lines and drives an optional progress bar.
pub(crate) struct ConsoleObserver {
    progress: Option<ProgressBar>,
    quiet: bool,
}

impl ConsoleObserver {
    pub(crate) fn new(total: usize, show_progress: bool, quiet: bool) -> Self {
        let progress = show_progress.then(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:30} {pos}/{len} archives")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        });
        Self { progress, quiet }
    }

    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }
    }

    fn emit(&self, line: &str, is_error: bool) {
        if self.quiet && !is_error {
            return;
        }
        let print = || {
            if is_error {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        };
        match &self.progress {
            Some(bar) => bar.suspend(print),
            None => print(),
        }
    }
}

impl RunObserver for ConsoleObserver {
    fn on_outcome(&self, outcome: &ItemOutcome) {
        let is_error = matches!(outcome, ItemOutcome::Failed { .. });
        self.emit(&outcome_line(outcome), is_error);
        if let Some(bar) = &self.progress {
            bar.inc(1);
        }
    }
}
