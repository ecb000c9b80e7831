//! Precedence of configuration layers: defaults, file, environment, flags.

use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use capbridge_config::{Config, LogFormat, default_host, default_port};
use ortho_config::OrthoConfig;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const ENV_KEYS: &[&str] = &[
    "RENDERDOC_MCP_HOST",
    "RENDERDOC_MCP_PORT",
    "RENDERDOC_MCP_LOG_FORMAT",
    "RENDERDOC_MCP_CONFIG_PATH",
];

/// Collects configuration layers for one load and restores the environment
/// afterwards.
struct Harness {
    temp_dir: TempDir,
    cli_args: Vec<OsString>,
    env_overrides: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut harness = Self {
            temp_dir: TempDir::new().expect("failed to create temporary directory"),
            cli_args: vec![OsString::from("capbridged")],
            env_overrides: Vec::new(),
            _guard: guard,
        };
        for key in ENV_KEYS {
            harness.clear_env(key);
        }
        harness
    }

    fn write_config(&mut self, contents: &str) {
        let path = self.temp_dir.path().join("capbridge.toml");
        fs::write(&path, contents).expect("failed to write configuration");
        self.cli_args.push(OsString::from("--config-path"));
        self.cli_args.push(path.into_os_string());
    }

    fn remember(&mut self, key: &str) {
        let previous = std::env::var_os(key);
        self.env_overrides.push((key.to_owned(), previous));
    }

    fn set_env(&mut self, key: &str, value: &str) {
        self.remember(key);
        unsafe { std::env::set_var(key, value) };
    }

    fn clear_env(&mut self, key: &str) {
        self.remember(key);
        unsafe { std::env::remove_var(key) };
    }

    fn push_cli_args(&mut self, args: &[&str]) {
        self.cli_args.extend(args.iter().map(OsString::from));
    }

    fn load(&self) -> Config {
        Config::load_from_iter(self.cli_args.clone()).expect("configuration should load")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        while let Some((key, value)) = self.env_overrides.pop() {
            match value {
                Some(os_value) => unsafe { std::env::set_var(&key, os_value) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[rstest]
fn defaults_apply_without_overrides(harness: Harness) {
    let config = harness.load();
    assert_eq!(config.host(), default_host());
    assert_eq!(config.port(), default_port());
    assert_eq!(config.log_format(), LogFormat::Compact);
}

#[rstest]
fn file_overrides_defaults(mut harness: Harness) {
    harness.write_config("host = \"0.0.0.0\"\nport = 20000\nlog_format = \"json\"\n");
    let config = harness.load();
    assert_eq!(config.host(), "0.0.0.0");
    assert_eq!(config.port(), 20000);
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[rstest]
fn environment_overrides_file(mut harness: Harness) {
    harness.write_config("port = 20000\n");
    harness.set_env("RENDERDOC_MCP_PORT", "20001");
    harness.set_env("RENDERDOC_MCP_HOST", "10.0.0.5");
    let config = harness.load();
    assert_eq!(config.port(), 20001);
    assert_eq!(config.host(), "10.0.0.5");
}

#[rstest]
fn cli_overrides_environment(mut harness: Harness) {
    harness.set_env("RENDERDOC_MCP_PORT", "20001");
    harness.push_cli_args(&["--port", "20002", "--log-filter", "debug"]);
    let config = harness.load();
    assert_eq!(config.port(), 20002);
    assert_eq!(config.log_filter(), "debug");
}

#[rstest]
fn capture_path_is_optional(mut harness: Harness) {
    assert!(harness.load().capture_path().is_none());
    harness.push_cli_args(&["--capture-path", "/captures/frame.json"]);
    let config = harness.load();
    assert_eq!(
        config.capture_path().map(camino::Utf8Path::as_str),
        Some("/captures/frame.json")
    );
}
