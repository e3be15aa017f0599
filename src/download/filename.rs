//! Local filename derivation and existence checks for mirrored archives.
//!
//! The naming rule must stay stable: earlier runs left files on disk under
//! these names, and they are what lets a re-run skip finished archives.

use std::io;
use std::path::{Path, PathBuf};

/// What is currently on disk at an archive's target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalFileState {
    /// Nothing at the path.
    Missing,
    /// A zero-length file, e.g. left behind by an interrupted write.
    Empty,
    /// A non-empty regular file; treated as already downloaded.
    Present {
        /// File size in bytes.
        size: u64,
    },
}

impl LocalFileState {
    /// Returns true when the archive needs to be fetched.
    #[must_use]
    pub fn needs_download(self) -> bool {
        !matches!(self, Self::Present { .. })
    }
}

/// Derives the flat local filename for an archive URL.
///
/// Every occurrence of `host` is removed and every remaining `/` becomes `-`.
///
/// ```
/// use pgn_downloader_core::derive_filename;
///
/// assert_eq!(
///     derive_filename("https://example.test//openings/OwenDefense.zip", "https://example.test/"),
///     "-openings-OwenDefense.zip"
/// );
/// ```
#[must_use]
pub fn derive_filename(url: &str, host: &str) -> String {
    let stripped = if host.is_empty() {
        url.to_string()
    } else {
        url.replace(host, "")
    };
    stripped.replace('/', "-")
}

/// Joins the derived filename for `url` onto `output_dir`.
#[must_use]
pub fn local_path(output_dir: &Path, url: &str, host: &str) -> PathBuf {
    output_dir.join(derive_filename(url, host))
}

/// Inspects the target path of an archive.
///
/// Only "not found" maps to [`LocalFileState::Missing`]. Any other stat
/// failure, or a path that exists but is not a regular file, is returned as
/// an error so the caller can report it instead of overwriting.
///
/// # Errors
///
/// Returns the IO error for permission problems and similar, or an error of
/// kind [`io::ErrorKind::Other`] when the path is not a regular file.
pub async fn inspect_local_file(path: &Path) -> io::Result<LocalFileState> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LocalFileState::Missing),
        Err(e) => return Err(e),
    };

    if !metadata.is_file() {
        return Err(io::Error::other("existing path is not a regular file"));
    }

    match metadata.len() {
        0 => Ok(LocalFileState::Empty),
        size => Ok(LocalFileState::Present { size }),
    }
}
