//! Implementation of `cnid versions`.
//!
//! Lists every dataset version the validator can probe: the bundled
//! revisions and, when `--data-dir` points at a readable override, the
//! override revisions. Warnings about an unusable override index go to
//! stderr in human mode and are embedded in the JSON object in JSON mode.
use std::io::Write;
use std::path::PathBuf;

use cnid_core::{Validator, ValidatorConfig, VersionListing};

use crate::OutputFormat;
use crate::cmd::format_mode;
use crate::error::CliError;
use crate::format::{FormatMode, FormatterConfig, write_versions, write_warnings};

/// Runs the `versions` command.
///
/// # Errors
///
/// - [`CliError::Dataset`] when the built-in dataset cannot be loaded.
/// - [`CliError::IoError`] when stdout or stderr cannot be written.
pub fn run(
    override_root: Option<PathBuf>,
    format: OutputFormat,
    quiet: bool,
    no_color: bool,
) -> Result<(), CliError> {
    let validator = Validator::with_config(ValidatorConfig {
        override_root,
        ..ValidatorConfig::default()
    })?;
    let listing = validator.versions();
    let fmt_config = FormatterConfig::from_flags(no_color, quiet, false);

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    emit(
        &listing,
        &mut stdout.lock(),
        &mut stderr.lock(),
        format_mode(format),
        &fmt_config,
    )
}

fn emit<O: Write, E: Write>(
    listing: &VersionListing,
    out: &mut O,
    err_out: &mut E,
    mode: FormatMode,
    config: &FormatterConfig,
) -> Result<(), CliError> {
    if mode == FormatMode::Human {
        write_warnings(err_out, &listing.warnings, mode, config)
            .map_err(|e| CliError::write_failed("stderr", &e))?;
    }
    write_versions(out, listing, mode).map_err(|e| CliError::write_failed("stdout", &e))
}
