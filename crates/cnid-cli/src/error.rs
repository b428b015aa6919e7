/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `cnid` binary. Every
/// variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
///
/// - Exit code **2**: the tool could not read its input or its dataset. These
///   errors terminate before any identity number is checked.
/// - Exit code **1**: every input was checked and at least one identity
///   number failed validation.
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `cnid` CLI can produce.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    #[error("error: file not found: {}", .path.display())]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    #[error("error: permission denied: {}", .path.display())]
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    #[error("error: file too large: {}", too_large_detail(.label, .limit, .actual))]
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        label: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes; `None` for stdin.
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    #[error("error: invalid UTF-8 in {label}: first invalid byte at offset {byte_offset}")]
    InvalidUtf8 {
        /// `"-"` for stdin, or the filesystem path.
        label: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    #[error("error: failed to read stdin: {detail}")]
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// A generic I/O error not covered by the more specific variants above.
    #[error("error: I/O error on {label}: {detail}")]
    IoError {
        /// The file or stream involved.
        label: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// Neither positional IDs nor any non-blank input line was supplied.
    #[error("error: no identity numbers to validate")]
    NoInput,

    /// The built-in dataset could not be loaded.
    #[error("error: built-in dataset unusable: {0}")]
    Dataset(#[from] cnid_core::DatasetError),

    // --- Exit code 1: logical failures ---
    /// At least one identity number failed validation.
    ///
    /// The per-ID results have already been printed.
    #[error("error: {failed} of {total} identity numbers failed validation")]
    ValidationFailed {
        /// Number of failing IDs.
        failed: usize,
        /// Number of IDs checked.
        total: usize,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// - `2`: input or dataset failure.
    /// - `1`: one or more identity numbers are invalid.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::NoInput
            | Self::Dataset(_) => 2,

            Self::ValidationFailed { .. } => 1,
        }
    }

    /// Returns the message printed to stderr before exiting.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Wraps a write failure on one of the standard streams.
    pub fn write_failed(stream: &str, e: &std::io::Error) -> Self {
        Self::IoError {
            label: stream.to_owned(),
            detail: e.to_string(),
        }
    }
}

fn too_large_detail(label: &str, limit: &u64, actual: &Option<u64>) -> String {
    match actual {
        Some(actual) => format!("{label} is {actual} bytes, limit is {limit} bytes"),
        None => format!("{label} exceeded limit of {limit} bytes"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
