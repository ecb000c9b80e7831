//! Daemon entrypoint for the capture bridge.

use std::io::{self, Write};
use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    match capbridged::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error!(target: "capbridged::process", error = %failure, "daemon failed");
            let _ = writeln!(io::stderr(), "capbridged: {failure}");
            ExitCode::FAILURE
        }
    }
}
