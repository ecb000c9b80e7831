use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Host the daemon binds when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port the daemon binds when none is configured.
pub const DEFAULT_PORT: u16 = 19876;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Receive timeout applied to accepted connections, in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1_000;

/// Pause between empty accept polls, in milliseconds.
pub const DEFAULT_ACCEPT_POLL_MS: u64 = 25;

/// Owned default host used where allocation is required (e.g. serde).
#[must_use]
pub fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

/// Default daemon port.
#[must_use]
pub const fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default receive timeout in milliseconds.
#[must_use]
pub const fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

/// Default accept poll interval in milliseconds.
#[must_use]
pub const fn default_accept_poll_ms() -> u64 {
    DEFAULT_ACCEPT_POLL_MS
}

/// No capture is opened at start-up unless configured.
#[must_use]
pub const fn default_capture_path() -> Option<Utf8PathBuf> {
    None
}
