//! Implementation of `cnid validate [ID]... [--input <FILE|->]`.
//!
//! Validates each identity number against the bundled dataset and the
//! optional `--data-dir` override. Results go to stdout, one line each;
//! override warnings and the summary go to stderr.
//!
//! Exit codes:
//! - 0 = every identity number is valid
//! - 1 = at least one identity number failed validation
//! - 2 = input could not be read, or the built-in dataset is unusable
use std::io::Write;
use std::time::Instant;

use cnid_core::{DatasetWarning, Validator, ValidatorConfig};

use crate::OutputFormat;
use crate::cmd::format_mode;
use crate::error::CliError;
use crate::format::{
    FormatMode, FormatterConfig, Tally, write_result, write_summary, write_timing, write_warnings,
};

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Runs the `validate` command over `ids`.
///
/// # Errors
///
/// - [`CliError::NoInput`] when `ids` is empty.
/// - [`CliError::Dataset`] when the built-in dataset cannot be loaded.
/// - [`CliError::ValidationFailed`] when any ID is invalid.
pub fn run(
    ids: &[String],
    config: ValidatorConfig,
    format: OutputFormat,
    quiet: bool,
    verbose: bool,
    no_color: bool,
) -> Result<(), CliError> {
    if ids.is_empty() {
        return Err(CliError::NoInput);
    }

    let started = Instant::now();
    let validator = Validator::with_config(config)?;
    let fmt_config = FormatterConfig::from_flags(no_color, quiet, verbose);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let stderr = std::io::stderr();
    let mut err_out = stderr.lock();

    let tally = validate_all(
        &validator,
        ids,
        &mut out,
        &mut err_out,
        format_mode(format),
        &fmt_config,
    )?;
    write_timing(&mut err_out, "validated", started.elapsed(), &fmt_config)
        .map_err(|e| CliError::write_failed("stderr", &e))?;

    if tally.invalid > 0 {
        Err(CliError::ValidationFailed {
            failed: tally.invalid,
            total: tally.total(),
        })
    } else {
        Ok(())
    }
}

/// Validates every ID, writing results to `out` and warnings plus the summary
/// to `err_out`.
///
/// A warning is written once per run, the first time it is seen.
///
/// # Errors
///
/// Returns [`CliError::IoError`] if either stream cannot be written.
pub fn validate_all<O: Write, E: Write>(
    validator: &Validator,
    ids: &[String],
    out: &mut O,
    err_out: &mut E,
    mode: FormatMode,
    config: &FormatterConfig,
) -> Result<Tally, CliError> {
    let mut tally = Tally::default();
    let mut seen: Vec<DatasetWarning> = Vec::new();

    for id in ids {
        let result = validator.validate(id);
        tally.record(&result);

        let fresh: Vec<DatasetWarning> = result
            .warnings()
            .iter()
            .filter(|w| !seen.contains(w))
            .cloned()
            .collect();
        write_warnings(err_out, &fresh, mode, config)
            .map_err(|e| CliError::write_failed("stderr", &e))?;
        seen.extend(fresh);

        write_result(out, &result, mode, config)
            .map_err(|e| CliError::write_failed("stdout", &e))?;
    }

    tracing::info!(valid = tally.valid, invalid = tally.invalid, "batch validated");
    write_summary(err_out, tally, mode, config)
        .map_err(|e| CliError::write_failed("stderr", &e))?;
    Ok(tally)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
