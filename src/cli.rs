//! CLI argument definitions using clap derive macros.
//!
//! Options left unset fall back to the config file, then to built-in defaults
//! (see `app_config`), so most fields are `Option`s here.

use std::path::PathBuf;

use clap::Parser;

/// Mirror the archive files listed on a chess-database download page.
///
/// Fetches the listing page, collects every archive link on it and downloads
/// each archive that is not already present in the output directory.
#[derive(Parser, Debug)]
#[command(name = "pgn-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Site root ending in '/', joined with the listing path and with every
    /// archive link [default: https://www.pgnmentor.com/]
    #[arg(long, value_name = "URL")]
    pub host: Option<String>,

    /// Listing page path relative to the host [default: files.html]
    #[arg(long, value_name = "PATH")]
    pub listing_path: Option<String>,

    /// Substring a link must contain to be downloaded [default: .zip]
    #[arg(long, value_name = "SUBSTR")]
    pub marker: Option<String>,

    /// Existing directory archives are written to [default: database]
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum concurrent downloads (1-32) [default: 3]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub max_connections: Option<u8>,

    /// Keep downloading after an archive fails and report failures at the end
    #[arg(long, overrides_with = "fail_fast")]
    pub continue_on_error: bool,

    /// Stop scheduling downloads after the first failed archive (overrides
    /// `continue_on_error` in the config file)
    #[arg(long, overrides_with = "continue_on_error")]
    pub fail_fast: bool,

    /// Join links with a single '/' instead of reproducing the doubled
    /// separator (changes local filenames)
    #[arg(long, overrides_with = "verbatim_links")]
    pub normalize_links: bool,

    /// Join links exactly as `host + '/' + href` (overrides
    /// `normalize_links` in the config file)
    #[arg(long, overrides_with = "normalize_links")]
    pub verbatim_links: bool,

    /// HTTP connect timeout in seconds (1-3600) [default: 30]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// Whole-request timeout in seconds (1-3600) [default: 300]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Config file (TOML) [default: $XDG_CONFIG_HOME/pgn-downloader/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Collect links and print their target files without downloading
    #[arg(long)]
    pub dry_run: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["pgn-downloader"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(args.host.is_none());
        assert!(args.max_connections.is_none());
        assert!(!args.continue_on_error);
        assert!(!args.normalize_links);
        assert!(!args.fail_fast);
        assert!(!args.verbatim_links);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_cli_policy_flags_last_one_wins() {
        let args =
            Args::try_parse_from(["pgn-downloader", "--continue-on-error", "--fail-fast"]).unwrap();
        assert!(args.fail_fast);
        assert!(!args.continue_on_error);

        let args =
            Args::try_parse_from(["pgn-downloader", "--verbatim-links", "--normalize-links"])
                .unwrap();
        assert!(args.normalize_links);
        assert!(!args.verbatim_links);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["pgn-downloader", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["pgn-downloader", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["pgn-downloader", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_max_connections_short_and_long() {
        let args = Args::try_parse_from(["pgn-downloader", "-c", "5"]).unwrap();
        assert_eq!(args.max_connections, Some(5));

        let args = Args::try_parse_from(["pgn-downloader", "--max-connections", "32"]).unwrap();
        assert_eq!(args.max_connections, Some(32));
    }

    #[test]
    fn test_cli_max_connections_out_of_range_rejected() {
        for value in ["0", "33"] {
            let err = Args::try_parse_from(["pgn-downloader", "-c", value]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_cli_timeout_zero_rejected() {
        let err = Args::try_parse_from(["pgn-downloader", "--timeout", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_site_options() {
        let args = Args::try_parse_from([
            "pgn-downloader",
            "--host",
            "https://example.test/",
            "--listing-path",
            "index.html",
            "--marker",
            ".pgn",
            "-o",
            "mirror",
            "--continue-on-error",
            "--normalize-links",
        ])
        .unwrap();
        assert_eq!(args.host.as_deref(), Some("https://example.test/"));
        assert_eq!(args.listing_path.as_deref(), Some("index.html"));
        assert_eq!(args.marker.as_deref(), Some(".pgn"));
        assert_eq!(args.output_dir, Some(PathBuf::from("mirror")));
        assert!(args.continue_on_error);
        assert!(args.normalize_links);
    }
}
