//! Entry point of the `capbridge` command-line client.
//!
//! Delegates to [`capbridge_cli::run`], which loads the connection settings,
//! sends one request to the daemon and prints the result.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    capbridge_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
