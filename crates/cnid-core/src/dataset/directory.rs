//! Filesystem-backed dataset store.
//!
//! Layout under the configured root:
//!
//! ```text
//! <root>/administrative-code-data/index.json      [199612, 2020, ...]
//! <root>/administrative-code-data/<version>.json  {"140428": "长子县", ...}
//! ```
//!
//! Nothing is cached: every call re-reads the file it needs, so edits made by
//! an external ingester are visible on the next lookup.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{DatasetError, DatasetStore, RegionTable, StoreOrigin};
use crate::version_index::{DatasetVersion, VersionIndex};

/// Name of the dataset directory below a store root.
pub const DATA_DIR_NAME: &str = "administrative-code-data";

/// Name of the version index file inside [`DATA_DIR_NAME`].
pub const INDEX_FILE_NAME: &str = "index.json";

/// A dataset laid out on disk below a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryStore {
    root: PathBuf,
    origin: StoreOrigin,
}

impl DirectoryStore {
    /// Creates a store rooted at `root` without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>, origin: StoreOrigin) -> Self {
        Self {
            root: root.into(),
            origin,
        }
    }

    /// Creates a store rooted at `root` if that path exists.
    ///
    /// Returns `None` when `root` does not exist, which callers treat as "no
    /// store configured" rather than as an error.
    pub fn open(root: &Path, origin: StoreOrigin) -> Option<Self> {
        if root.exists() {
            Some(Self::new(root, origin))
        } else {
            tracing::debug!(root = %root.display(), "dataset root does not exist");
            None
        }
    }

    /// The root directory this store was created with.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `administrative-code-data` directory below the root.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR_NAME)
    }

    fn read(&self, path: &Path) -> Result<String, DatasetError> {
        std::fs::read_to_string(path).map_err(|e| {
            let location = path.display().to_string();
            let kind = e.kind();
            if kind == std::io::ErrorKind::NotFound {
                DatasetError::Missing {
                    origin: self.origin,
                    location,
                }
            } else if kind == std::io::ErrorKind::InvalidData {
                // read_to_string reports non-UTF-8 content as InvalidData.
                DatasetError::Corrupt {
                    origin: self.origin,
                    location,
                    detail: e.to_string(),
                }
            } else {
                DatasetError::Io {
                    origin: self.origin,
                    location,
                    detail: e.to_string(),
                }
            }
        })
    }
}

impl DatasetStore for DirectoryStore {
    fn origin(&self) -> StoreOrigin {
        self.origin
    }

    fn load_index(&self) -> Result<VersionIndex, DatasetError> {
        let path = self.data_dir().join(INDEX_FILE_NAME);
        let json = self.read(&path)?;
        let index = VersionIndex::from_json(&json, self.origin, &path.display().to_string())?;
        tracing::debug!(
            origin = %self.origin,
            path = %path.display(),
            versions = index.len(),
            "read dataset index"
        );
        Ok(index)
    }

    fn load_table(&self, version: DatasetVersion) -> Result<Arc<RegionTable>, DatasetError> {
        let path = self.data_dir().join(version.file_name());
        let json = self.read(&path)?;
        let table =
            RegionTable::from_json(version, &json, self.origin, &path.display().to_string())?;
        tracing::debug!(
            origin = %self.origin,
            %version,
            rows = table.len(),
            "read dataset table"
        );
        Ok(Arc::new(table))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
