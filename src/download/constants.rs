//! Constants for the download module (timeouts, connection limits).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default whole-request timeout (5 minutes for the larger archives).
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Default number of downloads in flight at once.
pub const DEFAULT_MAX_CONNECTIONS: usize = 3;

/// Minimum allowed connection limit.
pub const MIN_CONNECTIONS: usize = 1;

/// Maximum allowed connection limit.
pub const MAX_CONNECTIONS: usize = 32;

/// Directory archives are written to unless configured otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "database";
