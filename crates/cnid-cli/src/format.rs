/// Result formatting: human-readable and JSON (NDJSON) modes.
///
/// - **Human mode** (default): one line per identity number, `[OK]` in green
///   or `[FAIL]` in red. Colors are disabled when `--no-color` is set, the
///   `NO_COLOR` environment variable is present (per <https://no-color.org>),
///   or the output stream is not a TTY.
/// - **JSON mode**: each result is a single-line JSON object (NDJSON).
///
/// Per-ID results go to stdout. Dataset warnings, the summary line and
/// timing go to stderr. `quiet` suppresses passing results, warnings and the
/// summary; `verbose` adds timing.
use std::io::{IsTerminal as _, Write};
use std::time::Duration;

use cnid_core::{DatasetWarning, ValidationResult, VersionListing};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted to stdout.
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

const ANSI_RED: &str = "\x1b[31m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Output format selection, mirroring the CLI `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Human-readable, optionally colored output.
    Human,
    /// Structured NDJSON output.
    Json,
}

/// Configuration for the result formatter, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether ANSI colors are enabled.
    pub colors: bool,
    /// Suppress passing results, warnings and the summary.
    pub quiet: bool,
    /// Emit timing to stderr.
    pub verbose: bool,
}

impl FormatterConfig {
    /// Constructs a [`FormatterConfig`] from the raw CLI flags.
    pub fn from_flags(no_color_flag: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            colors: colors_enabled(no_color_flag),
            quiet,
            verbose,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-ID results
// ---------------------------------------------------------------------------

/// Writes one [`ValidationResult`] in the requested format.
///
/// Passing results are skipped in quiet mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_result<W: Write>(
    writer: &mut W,
    result: &ValidationResult,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet && result.success() {
        return Ok(());
    }
    match mode {
        FormatMode::Human => write_result_human(writer, result, config),
        FormatMode::Json => write_json_line(writer, result),
    }
}

/// Human format:
///
/// ```text
/// [OK]   140428199705020037  山西省 长治市 长子县  1997-05-02 男  (199612 built-in)
/// [FAIL] 140123  length: identity number must be 18 characters, got 6
/// ```
fn write_result_human<W: Write>(
    writer: &mut W,
    result: &ValidationResult,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    let (tag, color) = if result.success() {
        ("[OK]  ", ANSI_GREEN)
    } else {
        ("[FAIL]", ANSI_RED)
    };
    let tag = paint(tag, color, config.colors);

    match (result.region(), result.birth(), result.sex_label()) {
        (Some(region), Some(birth), Some(sex)) => writeln!(
            writer,
            "{tag} {id}  {province} {city} {county}  {birth} {sex}  ({version} {origin})",
            id = result.id(),
            province = region.province,
            city = region.city,
            county = region.county,
            version = region.region_version,
            origin = region.origin,
        ),
        _ => writeln!(
            writer,
            "{tag} {id}  {kind}: {message}",
            id = result.id(),
            kind = result.error_kind(),
            message = result.error_message(),
        ),
    }
}

/// Writes override warnings to `writer`; suppressed in quiet mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_warnings<W: Write>(
    writer: &mut W,
    warnings: &[DatasetWarning],
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    for warning in warnings {
        match mode {
            FormatMode::Human => writeln!(
                writer,
                "{} {warning}",
                paint("[W]", ANSI_YELLOW, config.colors)
            )?,
            FormatMode::Json => write_json_line(writer, &WarningLine { warning })?,
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Summary and timing
// ---------------------------------------------------------------------------

/// Counts of passing and failing IDs in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub valid: usize,
    pub invalid: usize,
}

impl Tally {
    /// Adds one result to the tally.
    pub fn record(&mut self, result: &ValidationResult) {
        if result.success() {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid
    }
}

/// Writes the summary line: `2 valid, 1 invalid` or
/// `{"summary":{"valid":2,"invalid":1}}`. Suppressed in quiet mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary<W: Write>(
    writer: &mut W,
    tally: Tally,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    match mode {
        FormatMode::Human => writeln!(writer, "{} valid, {} invalid", tally.valid, tally.invalid),
        FormatMode::Json => write_json_line(writer, &SummaryLine { summary: tally }),
    }
}

/// Writes timing information in verbose mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_timing<W: Write>(
    writer: &mut W,
    label: &str,
    duration: Duration,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if !config.verbose {
        return Ok(());
    }
    writeln!(writer, "{label} in {}ms", duration.as_millis())
}

// ---------------------------------------------------------------------------
// Version listing
// ---------------------------------------------------------------------------

/// Writes the dataset version listing.
///
/// Human mode prints one `<version> <effective month> <origin>` line per
/// version; JSON mode prints the whole listing as one object.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_versions<W: Write>(
    writer: &mut W,
    listing: &VersionListing,
    mode: FormatMode,
) -> std::io::Result<()> {
    match mode {
        FormatMode::Human => {
            for listed in &listing.versions {
                writeln!(
                    writer,
                    "{:<8} {:<8} {}",
                    listed.version.to_string(),
                    listed.effective_month,
                    listed.origin
                )?;
            }
            Ok(())
        }
        FormatMode::Json => write_json_line(writer, listing),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SummaryLine {
    summary: Tally,
}

#[derive(Serialize)]
struct WarningLine<'a> {
    warning: &'a DatasetWarning,
}

fn paint(text: &str, color: &str, colors: bool) -> String {
    if colors {
        format!("{color}{text}{ANSI_RESET}")
    } else {
        text.to_owned()
    }
}

fn write_json_line<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> std::io::Result<()> {
    serde_json::to_writer(&mut *writer, value).map_err(std::io::Error::other)?;
    writeln!(writer)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use cnid_core::{DatasetVersion, Validator};

    use super::*;

    fn plain() -> FormatterConfig {
        FormatterConfig {
            colors: false,
            quiet: false,
            verbose: false,
        }
    }

    fn quiet() -> FormatterConfig {
        FormatterConfig {
            quiet: true,
            ..plain()
        }
    }

    fn render(result: &ValidationResult, mode: FormatMode, config: &FormatterConfig) -> String {
        let mut buf = Vec::new();
        write_result(&mut buf, result, mode, config).expect("write");
        String::from_utf8(buf).expect("utf-8")
    }

    fn validate(id: &str) -> ValidationResult {
        Validator::new().expect("bundled dataset").validate(id)
    }

    // ── human ────────────────────────────────────────────────────────────────

    #[test]
    fn human_success_line_has_names_and_version() {
        let out = render(&validate("140428199705020037"), FormatMode::Human, &plain());
        assert!(out.starts_with("[OK]"), "{out}");
        assert!(out.contains("山西省 长治市 长子县"), "{out}");
        assert!(out.contains("1997-05-02 男"), "{out}");
        assert!(out.contains("199612 built-in"), "{out}");
        assert!(!out.contains('\x1b'), "{out}");
    }

    #[test]
    fn human_failure_line_has_kind_and_message() {
        let out = render(&validate("140123"), FormatMode::Human, &plain());
        assert!(out.starts_with("[FAIL] 140123  length:"), "{out}");
    }

    #[test]
    fn human_colors_wrap_tag() {
        let config = FormatterConfig {
            colors: true,
            ..plain()
        };
        let out = render(&validate("140123"), FormatMode::Human, &config);
        assert!(out.starts_with(ANSI_RED), "{out:?}");
    }

    #[test]
    fn quiet_hides_passing_results_only() {
        assert!(render(&validate("140428199705020037"), FormatMode::Human, &quiet()).is_empty());
        assert!(!render(&validate("140123"), FormatMode::Human, &quiet()).is_empty());
    }

    // ── json ─────────────────────────────────────────────────────────────────

    #[test]
    fn json_result_is_one_line_object() {
        let out = render(&validate("140428199705020037"), FormatMode::Json, &plain());
        assert_eq!(out.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&out).expect("valid json");
        assert_eq!(value["id"], "140428199705020037");
        assert_eq!(value["success"], true);
        assert_eq!(value["county"], "长子县");
        assert_eq!(value["region_version"], 199_612);
    }

    #[test]
    fn json_failure_carries_error_kind() {
        let out = render(&validate("000000000000000001"), FormatMode::Json, &plain());
        let value: serde_json::Value = serde_json::from_str(&out).expect("valid json");
        assert_eq!(value["error_kind"], "region_not_found");
        assert_eq!(value["success"], false);
    }

    // ── summary ──────────────────────────────────────────────────────────────

    #[test]
    fn summary_human_and_json() {
        let tally = Tally {
            valid: 2,
            invalid: 1,
        };
        let mut human = Vec::new();
        write_summary(&mut human, tally, FormatMode::Human, &plain()).expect("write");
        assert_eq!(String::from_utf8(human).expect("utf-8"), "2 valid, 1 invalid\n");

        let mut json = Vec::new();
        write_summary(&mut json, tally, FormatMode::Json, &plain()).expect("write");
        assert_eq!(
            String::from_utf8(json).expect("utf-8"),
            "{\"summary\":{\"valid\":2,\"invalid\":1}}\n"
        );
    }

    #[test]
    fn summary_suppressed_when_quiet() {
        let mut buf = Vec::new();
        write_summary(&mut buf, Tally::default(), FormatMode::Human, &quiet()).expect("write");
        assert!(buf.is_empty());
    }

    #[test]
    fn tally_counts_results() {
        let mut tally = Tally::default();
        tally.record(&validate("140428199705020037"));
        tally.record(&validate("140123"));
        tally.record(&validate("140000000000000000"));
        assert_eq!(tally.valid, 1);
        assert_eq!(tally.invalid, 2);
        assert_eq!(tally.total(), 3);
    }

    // ── warnings and timing ──────────────────────────────────────────────────

    #[test]
    fn warnings_render_in_both_modes() {
        let warnings = vec![DatasetWarning::OverrideTableUnusable {
            version: DatasetVersion::new(2020),
            detail: "expected value at line 1 column 1".to_owned(),
        }];
        let mut human = Vec::new();
        write_warnings(&mut human, &warnings, FormatMode::Human, &plain()).expect("write");
        let human = String::from_utf8(human).expect("utf-8");
        assert!(human.starts_with("[W] override table 2020 ignored"), "{human}");

        let mut json = Vec::new();
        write_warnings(&mut json, &warnings, FormatMode::Json, &plain()).expect("write");
        let value: serde_json::Value = serde_json::from_slice(&json).expect("valid json");
        assert_eq!(value["warning"]["kind"], "override_table_unusable");
    }

    #[test]
    fn timing_only_in_verbose() {
        let mut buf = Vec::new();
        write_timing(&mut buf, "validated", Duration::from_millis(12), &plain()).expect("write");
        assert!(buf.is_empty());

        let verbose = FormatterConfig {
            verbose: true,
            ..plain()
        };
        write_timing(&mut buf, "validated", Duration::from_millis(12), &verbose).expect("write");
        assert_eq!(String::from_utf8(buf).expect("utf-8"), "validated in 12ms\n");
    }
}
