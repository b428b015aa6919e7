/// Command module for the `cnid` CLI.
///
/// Each submodule implements one subcommand. The `run` function in each
/// module takes the parsed arguments and returns `Ok(())` on success or
/// a [`crate::error::CliError`] on failure.
pub mod validate;
pub mod versions;

use crate::OutputFormat;
use crate::format::FormatMode;

/// Maps the `--format` flag to the formatter's mode.
pub fn format_mode(format: OutputFormat) -> FormatMode {
    match format {
        OutputFormat::Human => FormatMode::Human,
        OutputFormat::Json => FormatMode::Json,
    }
}
