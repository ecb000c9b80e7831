//! Client library and command-line runtime for the capture bridge.
//!
//! [`BridgeClient`] speaks the framed request protocol to a running
//! `capbridged`. [`run`] wraps it for the `capbridge` binary: leading
//! connection flags go to the configuration loader, the method name and its
//! parameters go to clap, and the result is printed as pretty JSON.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

mod cli;
mod client;
mod config;
mod errors;
mod params;
#[cfg(test)]
mod test_support;

use cli::Cli;
pub use client::{BridgeClient, CONNECTION_TIMEOUT, DEFAULT_CALL_TIMEOUT};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use errors::AppError;
pub use errors::ClientError;
use params::build_params;

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    stdout: &'a mut W,
    stderr: &'a mut E,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(stdout: &'a mut W, stderr: &'a mut E, loader: &'a L) -> Self {
        Self {
            stdout,
            stderr,
            loader,
        }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let arguments: Vec<OsString> = args.into_iter().collect();
        match self.execute(&arguments) {
            Ok(()) => ExitCode::SUCCESS,
            Err(AppError::CliUsage(error)) if !error.use_stderr() => {
                let _ = write!(self.stdout, "{error}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                let _ = writeln!(self.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }

    fn execute(&mut self, arguments: &[OsString]) -> Result<(), AppError> {
        let split = split_config_arguments(arguments);
        let cli = Cli::try_parse_from(&split.command_arguments).map_err(AppError::CliUsage)?;
        let config = self.loader.load(&split.config_arguments)?;
        let params = build_params(cli.params.as_deref(), &cli.arguments)?;

        let mut client = BridgeClient::new(config.host(), config.port());
        let result = client.call(&cli.method, params)?;

        let rendered = serde_json::to_string_pretty(&result).map_err(AppError::SerialiseResult)?;
        writeln!(self.stdout, "{rendered}").map_err(AppError::WriteResult)?;
        Ok(())
    }
}

/// Runs the CLI with the provided arguments and output streams.
///
/// Results are written to `stdout` as pretty-printed JSON. Errors, including
/// error responses from the daemon, are written to `stderr` as one line and
/// yield a failing exit code.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    CliRunner::new(stdout, stderr, &OrthoConfigLoader).run(args)
}
