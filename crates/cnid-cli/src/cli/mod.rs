//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cnid_core::DEFAULT_EXCURSION;

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`].
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` prints one aligned line per result. `Json` prints one JSON object
/// per result (NDJSON).
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, optionally colored output (default).
    Human,
    /// Structured NDJSON output.
    Json,
}

/// All top-level subcommands exposed by the `cnid` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Validate identity numbers and resolve their region codes.
    Validate {
        /// Identity numbers to validate.
        #[arg(value_name = "ID", required_unless_present = "input")]
        ids: Vec<String>,
        /// Read identity numbers one per line from FILE, or `-` for stdin.
        #[arg(long, short = 'i', value_name = "FILE")]
        input: Option<PathOrStdin>,
        /// Dataset versions probed at or before the birth month.
        #[arg(long, default_value_t = DEFAULT_EXCURSION)]
        forward_excursion: usize,
        /// Dataset versions probed after the birth month.
        #[arg(long, default_value_t = DEFAULT_EXCURSION)]
        backward_excursion: usize,
    },

    /// List the dataset versions of the built-in and override stores.
    Versions,

    /// Print the cnid-core library version.
    Version,
}

/// Root CLI struct for the `cnid` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "cnid",
    version,
    about = "Chinese resident identity number validator",
    long_about = "Validates 18-character Chinese resident identity numbers and resolves\n\
                  their region codes against the administrative-code revision in force\n\
                  when the holder was born."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Override dataset root containing `administrative-code-data/`.
    ///
    /// A path that does not exist is ignored.
    #[arg(long, global = true, env = "CNID_DATA_DIR", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Only print failing results and errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print timing and debug logs to stderr (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum `--input` size in bytes.
    ///
    /// Can also be set via the `CNID_MAX_FILE_SIZE` environment variable.
    /// Default: 16777216 (16 MB).
    #[arg(
        long,
        global = true,
        env = "CNID_MAX_FILE_SIZE",
        default_value = "16777216"
    )]
    pub max_file_size: u64,

    /// Disable ANSI color codes in human output.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org>.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}
