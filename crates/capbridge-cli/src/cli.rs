//! CLI argument definitions for the capture bridge client.

use clap::Parser;

/// Sends one request to the capture bridge daemon and prints the result.
///
/// Connection flags (`--host`, `--port`, `--config-path`) must precede the
/// method name; they are handled by the configuration loader.
#[derive(Parser, Debug)]
#[command(name = "capbridge", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Parameters as a JSON object; `key=value` pairs override its entries.
    #[arg(long, value_name = "JSON")]
    pub(crate) params: Option<String>,
    /// Method to call (for example `get_draw_calls`).
    #[arg(value_name = "METHOD")]
    pub(crate) method: String,
    /// Parameters as `key=value` pairs. Values are parsed as JSON when
    /// possible and passed as strings otherwise.
    #[arg(value_name = "KEY=VALUE", num_args = 0..)]
    pub(crate) arguments: Vec<String>,
}
