//! Versioned administrative-code tables and the stores that serve them.
//!
//! A [`RegionTable`] is one immutable revision of the code-to-name mapping.
//! A [`DatasetStore`] exposes a [`VersionIndex`] plus per-version tables. Two
//! implementations exist:
//!
//! - [`BundledStore`]: the tables compiled into the library, parsed once per
//!   process and shared read-only.
//! - [`DirectoryStore`]: a directory tree in the on-disk layout
//!   `<root>/administrative-code-data/{index.json,<version>.json}`, read
//!   fresh on every call.
//!
//! Missing files are an expected, recoverable condition
//! ([`DatasetError::Missing`]); files that exist but do not parse as the
//! expected shape are [`DatasetError::Corrupt`].
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::newtypes::RegionCode;
use crate::version_index::{DatasetVersion, VersionIndex};

pub mod bundled;
pub mod directory;

pub use bundled::BundledStore;
pub use directory::{DATA_DIR_NAME, DirectoryStore, INDEX_FILE_NAME};

// ---------------------------------------------------------------------------
// StoreOrigin
// ---------------------------------------------------------------------------

/// Which logical store a version or table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOrigin {
    /// The dataset shipped with the library (or injected in its place).
    Builtin,
    /// The caller-supplied override directory.
    Override,
}

impl fmt::Display for StoreOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str("built-in"),
            Self::Override => f.write_str("override"),
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetError
// ---------------------------------------------------------------------------

/// Failure to load an index or table from a [`DatasetStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    /// The requested file does not exist.
    #[error("{origin} dataset file not found: {location}")]
    Missing {
        /// Store the lookup was made against.
        origin: StoreOrigin,
        /// Path or bundled resource name.
        location: String,
    },

    /// The file exists but is not the expected JSON shape.
    #[error("{origin} dataset file {location} is corrupt: {detail}")]
    Corrupt {
        /// Store the file belongs to.
        origin: StoreOrigin,
        /// Path or bundled resource name.
        location: String,
        /// Parser message.
        detail: String,
    },

    /// The file exists but could not be read.
    #[error("cannot read {origin} dataset file {location}: {detail}")]
    Io {
        /// Store the file belongs to.
        origin: StoreOrigin,
        /// Path of the file.
        location: String,
        /// Underlying I/O error message.
        detail: String,
    },
}

impl DatasetError {
    /// Returns `true` for [`DatasetError::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

// ---------------------------------------------------------------------------
// RegionTable
// ---------------------------------------------------------------------------

/// One revision of the administrative-code table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTable {
    version: DatasetVersion,
    entries: BTreeMap<RegionCode, String>,
}

impl RegionTable {
    /// Builds a table from already-validated entries.
    pub fn new(version: DatasetVersion, entries: BTreeMap<RegionCode, String>) -> Self {
        Self { version, entries }
    }

    /// Parses a flat JSON object mapping six-digit codes to names.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Corrupt`] if `json` is not an object, if any
    /// value is not a string, or if any key is not a six-digit code.
    pub fn from_json(
        version: DatasetVersion,
        json: &str,
        origin: StoreOrigin,
        location: &str,
    ) -> Result<Self, DatasetError> {
        let entries: BTreeMap<RegionCode, String> =
            serde_json::from_str(json).map_err(|e| DatasetError::Corrupt {
                origin,
                location: location.to_owned(),
                detail: e.to_string(),
            })?;
        Ok(Self { version, entries })
    }

    /// The version this table was loaded for.
    pub fn version(&self) -> DatasetVersion {
        self.version
    }

    /// Looks up the name of `code`.
    pub fn get(&self, code: &RegionCode) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    /// Returns `true` if `code` has a row in this table.
    pub fn contains(&self, code: &RegionCode) -> bool {
        self.entries.contains_key(code)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates rows in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (&RegionCode, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Returns a new table with `overlay`'s rows written over this table's.
    ///
    /// Codes present only in `self` are retained. The result carries the
    /// overlay's version.
    pub fn overlaid_with(&self, overlay: &RegionTable) -> RegionTable {
        let mut entries = self.entries.clone();
        entries.extend(
            overlay
                .entries
                .iter()
                .map(|(code, name)| (code.clone(), name.clone())),
        );
        RegionTable {
            version: overlay.version,
            entries,
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetStore
// ---------------------------------------------------------------------------

/// Read-only access to a versioned set of region tables.
///
/// Implementations must be safe to share across threads; the resolver holds
/// the built-in store as `Arc<dyn DatasetStore>`.
pub trait DatasetStore: Send + Sync {
    /// Which logical store this is.
    fn origin(&self) -> StoreOrigin;

    /// Loads the list of available versions.
    ///
    /// # Errors
    ///
    /// [`DatasetError::Missing`] when there is no index,
    /// [`DatasetError::Corrupt`] when it is not a JSON array of integers.
    fn load_index(&self) -> Result<VersionIndex, DatasetError>;

    /// Loads the table for `version`.
    ///
    /// # Errors
    ///
    /// [`DatasetError::Missing`] when the store has no file for `version`,
    /// [`DatasetError::Corrupt`] when the file is not a flat code-to-name map.
    fn load_table(&self, version: DatasetVersion) -> Result<Arc<RegionTable>, DatasetError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
