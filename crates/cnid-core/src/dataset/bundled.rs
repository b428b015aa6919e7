//! The administrative-code tables compiled into the library.
//!
//! The JSON files under `data/administrative-code-data/` are embedded with
//! `include_str!`. They are parsed the first time any [`BundledStore`] is
//! requested and the parsed tables are shared, read-only, for the rest of the
//! process. Initialisation runs at most once even when several threads race
//! on first use.
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use super::{DatasetError, DatasetStore, RegionTable, StoreOrigin};
use crate::version_index::{DatasetVersion, VersionIndex};

const INDEX_LOCATION: &str = "bundled:administrative-code-data/index.json";

const BUNDLED_INDEX: &str = include_str!("../../data/administrative-code-data/index.json");

const BUNDLED_TABLES: &[(u32, &str)] = &[
    (
        198_012,
        include_str!("../../data/administrative-code-data/198012.json"),
    ),
    (
        199_112,
        include_str!("../../data/administrative-code-data/199112.json"),
    ),
    (
        199_612,
        include_str!("../../data/administrative-code-data/199612.json"),
    ),
    (
        200_212,
        include_str!("../../data/administrative-code-data/200212.json"),
    ),
    (
        200_812,
        include_str!("../../data/administrative-code-data/200812.json"),
    ),
    (
        201_412,
        include_str!("../../data/administrative-code-data/201412.json"),
    ),
    (
        201_912,
        include_str!("../../data/administrative-code-data/201912.json"),
    ),
];

/// Parsed bundled dataset, shared process-wide.
static BUNDLED: LazyLock<Result<BundledDataset, DatasetError>> = LazyLock::new(|| {
    let parsed = BundledDataset::parse();
    match &parsed {
        Ok(dataset) => tracing::info!(
            versions = dataset.index.len(),
            tables = dataset.tables.len(),
            "loaded bundled administrative-code dataset"
        ),
        Err(e) => tracing::error!(error = %e, "bundled administrative-code dataset is unusable"),
    }
    parsed
});

#[derive(Debug)]
struct BundledDataset {
    index: VersionIndex,
    tables: BTreeMap<DatasetVersion, Arc<RegionTable>>,
}

impl BundledDataset {
    /// Parses the embedded index and every embedded table it lists.
    ///
    /// Index entries without an embedded table are kept; looking them up
    /// later yields [`DatasetError::Missing`].
    fn parse() -> Result<Self, DatasetError> {
        let index = VersionIndex::from_json(BUNDLED_INDEX, StoreOrigin::Builtin, INDEX_LOCATION)?;
        let mut tables = BTreeMap::new();
        for version in index.iter() {
            let Some((_, json)) = BUNDLED_TABLES.iter().find(|(raw, _)| *raw == version.raw())
            else {
                continue;
            };
            let table =
                RegionTable::from_json(version, json, StoreOrigin::Builtin, &location(version))?;
            tables.insert(version, Arc::new(table));
        }
        Ok(Self { index, tables })
    }
}

fn location(version: DatasetVersion) -> String {
    format!("bundled:administrative-code-data/{}", version.file_name())
}

// ---------------------------------------------------------------------------
// BundledStore
// ---------------------------------------------------------------------------

/// Handle to the process-wide bundled dataset.
///
/// Obtaining a handle forces the one-time parse; once [`BundledStore::load`]
/// has succeeded every later call is a cheap reference to the cached tables.
#[derive(Debug, Clone, Copy)]
pub struct BundledStore {
    dataset: &'static BundledDataset,
}

impl BundledStore {
    /// Returns a handle to the bundled dataset, parsing it on first use.
    ///
    /// # Errors
    ///
    /// Returns the [`DatasetError`] from the first parse if the embedded
    /// index or any embedded table is malformed. The error is cached, so
    /// every call reports the same failure.
    pub fn load() -> Result<Self, DatasetError> {
        match &*BUNDLED {
            Ok(dataset) => Ok(Self { dataset }),
            Err(e) => Err(e.clone()),
        }
    }
}

impl DatasetStore for BundledStore {
    fn origin(&self) -> StoreOrigin {
        StoreOrigin::Builtin
    }

    fn load_index(&self) -> Result<VersionIndex, DatasetError> {
        Ok(self.dataset.index.clone())
    }

    fn load_table(&self, version: DatasetVersion) -> Result<Arc<RegionTable>, DatasetError> {
        self.dataset
            .tables
            .get(&version)
            .cloned()
            .ok_or_else(|| DatasetError::Missing {
                origin: StoreOrigin::Builtin,
                location: location(version),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
