//! Shared configuration for the capture bridge daemon and its CLI.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! configuration file (`--config-path`), then `RENDERDOC_MCP_*` environment
//! variables, then command-line flags.

mod defaults;
mod logging;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_ACCEPT_POLL_MS, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT,
    DEFAULT_READ_TIMEOUT_MS, default_accept_poll_ms, default_capture_path, default_host,
    default_log_filter, default_log_filter_string, default_log_format, default_port,
    default_read_timeout_ms,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by the daemon and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "RENDERDOC_MCP")]
pub struct Config {
    /// Interface the daemon listens on and the CLI connects to.
    #[serde(default = "default_host")]
    #[ortho_config(default = default_host())]
    pub host: String,
    /// TCP port of the daemon.
    #[serde(default = "default_port")]
    #[ortho_config(default = default_port())]
    pub port: u16,
    /// `tracing` filter directive for the binaries.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of log records.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Receive timeout on accepted connections, in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    #[ortho_config(default = default_read_timeout_ms())]
    pub read_timeout_ms: u64,
    /// Pause between empty accept polls, in milliseconds.
    #[serde(default = "default_accept_poll_ms")]
    #[ortho_config(default = default_accept_poll_ms())]
    pub accept_poll_ms: u64,
    /// Capture opened when the daemon starts.
    #[serde(default)]
    pub capture_path: Option<Utf8PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            read_timeout_ms: default_read_timeout_ms(),
            accept_poll_ms: default_accept_poll_ms(),
            capture_path: default_capture_path(),
        }
    }
}

impl Config {
    /// Interface the daemon listens on.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port the daemon listens on.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` form suitable for socket address resolution.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Filter directive used to initialise telemetry.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format of log records.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Receive timeout applied to accepted connections.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Pause between empty accept polls.
    #[must_use]
    pub const fn accept_poll(&self) -> Duration {
        Duration::from_millis(self.accept_poll_ms)
    }

    /// Capture to open at start-up, when configured.
    #[must_use]
    pub fn capture_path(&self) -> Option<&Utf8Path> {
        self.capture_path.as_deref()
    }
}
