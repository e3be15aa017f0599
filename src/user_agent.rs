//! User-Agent string shared by the listing fetch and the archive downloads.

/// Tag identifying what the traffic is for.
const PURPOSE_TAG: &str = "chess-database-mirror";

/// Default User-Agent for all requests (identifies the tool and its version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("pgn-downloader/{version} ({PURPOSE_TAG})")
}
