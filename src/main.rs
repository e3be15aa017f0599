//! CLI entry point for the PGN archive mirror.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use pgn_downloader_core::{DownloadRunner, HttpClient, LinkCollector};
use tracing::{debug, error, info};

mod app_config;
mod cli;
mod output;
mod terminal;

use app_config::Settings;
use cli::Args;
use output::{ConsoleObserver, ProcessExit};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    terminal::init_tracing(&terminal::default_filter(args.quiet, args.verbose));
    debug!(?args, "CLI arguments parsed");

    match run(&args).await {
        Ok(exit) => exit.into(),
        Err(e) => {
            error!(error = %format!("{e:#}"), "run aborted");
            eprintln!("Error: {e:#}");
            ProcessExit::Failure.into()
        }
    }
}

async fn run(args: &Args) -> Result<ProcessExit> {
    let file_config = app_config::load_config(args.config.as_deref())?;
    let settings = Settings::resolve(args, file_config.as_ref())?;
    debug!(?settings, "settings resolved");

    let client =
        HttpClient::with_settings(&settings.client).context("Failed to build HTTP client")?;

    let collector = LinkCollector::new(&settings.host, &settings.listing_path)?
        .with_marker(&settings.marker)
        .with_join(settings.link_join);

    let links = match collector.collect(&client).await {
        Ok(links) => links,
        Err(e) => {
            if let Some(status) = e.status() {
                println!("{status}");
            }
            error!(error = %e, "listing fetch failed, nothing downloaded");
            return Ok(ProcessExit::Failure);
        }
    };

    if !args.quiet {
        println!("{}", links.len());
    }

    if args.dry_run {
        for line in output::dry_run_lines(&links, &settings) {
            println!("{line}");
        }
        return Ok(ProcessExit::Success);
    }

    let runner = DownloadRunner::new(settings.runner_config())?;
    let show_progress = terminal::should_show_progress(
        io::stderr().is_terminal(),
        args.quiet,
        args.no_progress,
        terminal::is_dumb_terminal(),
    );
    let observer = ConsoleObserver::new(links.len(), show_progress, args.quiet);

    let result = runner
        .run_with_observer(&links, &client, &settings.output_dir, &observer)
        .await;
    observer.finish();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "download run stopped");
            eprintln!("Error: {e}");
            return Ok(ProcessExit::Failure);
        }
    };

    info!(
        written = summary.written(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        bytes = summary.bytes_written(),
        "run complete"
    );

    let exit = output::determine_exit_outcome(&summary);
    if exit == ProcessExit::Success {
        if !args.quiet {
            println!("Complete.");
        }
    } else {
        for line in output::failure_summary_lines(&summary) {
            eprintln!("{line}");
        }
    }
    Ok(exit)
}
