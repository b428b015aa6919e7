//! Region resolution: maps a region code and birth month to province, city
//! and county names using the historically closest dataset version.
//!
//! The search has four steps:
//!
//! 1. Build a [`DistanceMap`] from the built-in index and, if an override
//!    directory is configured and readable, the override index.
//! 2. Probe versions at or before the birth month, closest first, up to
//!    [`ResolverConfig::forward_excursion`] versions.
//! 3. Only if step 2 found nothing, probe versions after the birth month,
//!    closest first, up to [`ResolverConfig::backward_excursion`] versions.
//! 4. Fail with [`ResolveError::RegionNotFound`].
//!
//! A version is a hit when its table has a row for the queried code. Versions
//! listed by the override index are read as the built-in table of the same
//! effective month (if any) with the override rows written over it.
//!
//! The override directory is re-read on every call and never cached. Problems
//! with it degrade to "no override" and are reported as [`DatasetWarning`]s
//! when a file is present but unusable.
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::dataset::{DatasetError, DatasetStore, DirectoryStore, RegionTable, StoreOrigin};
use crate::newtypes::{RegionCode, RegionLevel};
use crate::validation::ErrorKind;
use crate::version_index::{Candidate, DatasetVersion, DistanceMap, VersionIndex};

/// Default number of versions probed in each direction.
pub const DEFAULT_EXCURSION: usize = 3;

// ---------------------------------------------------------------------------
// ResolverConfig
// ---------------------------------------------------------------------------

/// Bounds on the nearest-version search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum versions probed at or before the birth month.
    pub forward_excursion: usize,
    /// Maximum versions probed after the birth month.
    pub backward_excursion: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            forward_excursion: DEFAULT_EXCURSION,
            backward_excursion: DEFAULT_EXCURSION,
        }
    }
}

// ---------------------------------------------------------------------------
// RegionInfo
// ---------------------------------------------------------------------------

/// The names and codes resolved for one region code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionInfo {
    /// Province-level name.
    pub province: String,
    /// City-level name, or the province name when the table has no city row.
    pub city: String,
    /// Name of the queried code itself.
    pub county: String,
    /// First two digits followed by `0000`.
    pub province_code: u32,
    /// First four digits followed by `00`.
    pub city_code: u32,
    /// The queried code.
    pub county_code: u32,
    /// Level of the queried code. A province-level code repeats the
    /// province name in every name field.
    pub level: RegionLevel,
    /// The dataset version whose table matched.
    pub region_version: DatasetVersion,
    /// Which store supplied the matching table.
    pub origin: StoreOrigin,
    /// `true` when `city` fell back to the province name.
    pub city_from_province: bool,
}

// ---------------------------------------------------------------------------
// DatasetWarning
// ---------------------------------------------------------------------------

/// A non-fatal problem with the override dataset.
///
/// The affected override file is ignored and resolution continues with the
/// remaining data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetWarning {
    /// The override index exists but could not be used; the whole override
    /// store was skipped.
    OverrideIndexUnusable {
        /// Why the index was rejected.
        detail: String,
    },
    /// One override table exists but could not be used.
    OverrideTableUnusable {
        /// The version whose table was skipped.
        version: DatasetVersion,
        /// Why the table was rejected.
        detail: String,
    },
}

impl fmt::Display for DatasetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverrideIndexUnusable { detail } => {
                write!(f, "override dataset ignored: {detail}")
            }
            Self::OverrideTableUnusable { version, detail } => {
                write!(f, "override table {version} ignored: {detail}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ResolveError
// ---------------------------------------------------------------------------

/// Why a region code could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No probed version lists the code.
    #[error("region code {code} not found in any dataset version near {birth_month}")]
    RegionNotFound {
        /// The queried code.
        code: RegionCode,
        /// The birth month the search was centred on.
        birth_month: u32,
    },

    /// A version lists the code but not its province.
    #[error("dataset version {version} lists {code} but has no province row {province_code}")]
    MissingProvince {
        /// The queried code.
        code: RegionCode,
        /// The province code that was expected.
        province_code: RegionCode,
        /// The version that matched.
        version: DatasetVersion,
    },

    /// The built-in store failed while being probed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl ResolveError {
    /// Maps the failure to its outcome tag.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RegionNotFound { .. } | Self::MissingProvince { .. } => ErrorKind::RegionNotFound,
            Self::Dataset(DatasetError::Missing { .. }) => ErrorKind::DatasetMissing,
            Self::Dataset(DatasetError::Corrupt { .. } | DatasetError::Io { .. }) => {
                ErrorKind::DatasetCorrupt
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves region codes against a built-in store and an optional override
/// directory.
///
/// A `Resolver` holds no mutable state and may be shared across threads.
pub struct Resolver {
    builtin: Arc<dyn DatasetStore>,
    builtin_index: VersionIndex,
    override_root: Option<PathBuf>,
    config: ResolverConfig,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("builtin_origin", &self.builtin.origin())
            .field("builtin_index", &self.builtin_index)
            .field("override_root", &self.override_root)
            .field("config", &self.config)
            .finish()
    }
}

impl Resolver {
    /// Creates a resolver over `builtin`, loading its index once.
    ///
    /// # Errors
    ///
    /// Returns the [`DatasetError`] from loading the built-in index. A
    /// built-in store without a usable index cannot resolve anything.
    pub fn new(
        builtin: Arc<dyn DatasetStore>,
        override_root: Option<PathBuf>,
        config: ResolverConfig,
    ) -> Result<Self, DatasetError> {
        let builtin_index = builtin.load_index()?;
        Ok(Self {
            builtin,
            builtin_index,
            override_root,
            config,
        })
    }

    /// The search bounds in effect.
    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    /// The configured override root, if any.
    pub fn override_root(&self) -> Option<&Path> {
        self.override_root.as_deref()
    }

    /// The built-in store's version index.
    pub fn builtin_index(&self) -> &VersionIndex {
        &self.builtin_index
    }

    /// Reads the override index fresh from disk.
    ///
    /// Returns `None` when no override is configured, the root does not
    /// exist, or the index is absent. A present-but-unusable index also
    /// yields `None` and pushes a [`DatasetWarning`].
    pub fn override_index(&self, warnings: &mut Vec<DatasetWarning>) -> Option<VersionIndex> {
        self.open_override(warnings).map(|(_, index)| index)
    }

    /// Resolves `code` for someone born in `birth_month` (`YYYYMM`).
    ///
    /// Override warnings are discarded; use
    /// [`Resolver::resolve_with_warnings`] to collect them.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve_with_warnings`].
    pub fn resolve(&self, code: &RegionCode, birth_month: u32) -> Result<RegionInfo, ResolveError> {
        let mut warnings = Vec::new();
        self.resolve_with_warnings(code, birth_month, &mut warnings)
    }

    /// Resolves `code` for `birth_month`, appending override problems to
    /// `warnings`.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::RegionNotFound`] when no version within the
    ///   excursion bounds lists the code.
    /// - [`ResolveError::MissingProvince`] when the matching version has no
    ///   row for the code's province.
    /// - [`ResolveError::Dataset`] when a built-in table exists but cannot
    ///   be parsed.
    pub fn resolve_with_warnings(
        &self,
        code: &RegionCode,
        birth_month: u32,
        warnings: &mut Vec<DatasetWarning>,
    ) -> Result<RegionInfo, ResolveError> {
        let overlay = self.open_override(warnings);
        let distances = DistanceMap::build(
            birth_month,
            &self.builtin_index,
            overlay.as_ref().map(|(_, index)| index),
        );
        let overlay_store = overlay.as_ref().map(|(store, _)| store);

        let forward = distances.at_or_before().take(self.config.forward_excursion);
        let backward = distances.after().take(self.config.backward_excursion);
        for candidate in forward.chain(backward) {
            if let Some((table, origin)) = self.probe(code, candidate, overlay_store, warnings)? {
                return extract(code, birth_month, &table, origin);
            }
        }

        tracing::debug!(
            %code,
            birth_month,
            candidates = distances.len(),
            "region code not found within excursion bounds"
        );
        Err(ResolveError::RegionNotFound {
            code: code.clone(),
            birth_month,
        })
    }

    /// Opens the override directory and reads its index.
    fn open_override(
        &self,
        warnings: &mut Vec<DatasetWarning>,
    ) -> Option<(DirectoryStore, VersionIndex)> {
        let root = self.override_root.as_deref()?;
        let store = DirectoryStore::open(root, StoreOrigin::Override)?;
        match store.load_index() {
            Ok(index) => Some((store, index)),
            Err(e) if e.is_missing() => {
                tracing::debug!(error = %e, "override root has no index; ignoring it");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "override dataset index is unusable; ignoring it");
                warnings.push(DatasetWarning::OverrideIndexUnusable {
                    detail: e.to_string(),
                });
                None
            }
        }
    }

    /// Loads the table for `candidate` and returns it if it lists `code`.
    fn probe(
        &self,
        code: &RegionCode,
        candidate: &Candidate,
        overlay: Option<&DirectoryStore>,
        warnings: &mut Vec<DatasetWarning>,
    ) -> Result<Option<(Arc<RegionTable>, StoreOrigin)>, DatasetError> {
        let loaded = match (candidate.origin, overlay) {
            (StoreOrigin::Override, Some(store)) => {
                self.load_merged(store, candidate.version, warnings)?
            }
            (StoreOrigin::Override, None) | (StoreOrigin::Builtin, _) => self
                .load_builtin(candidate.version)?
                .map(|table| (table, StoreOrigin::Builtin)),
        };

        let hit = loaded
            .as_ref()
            .is_some_and(|(table, _)| table.contains(code));
        tracing::debug!(
            %code,
            version = %candidate.version,
            origin = %candidate.origin,
            distance = candidate.distance,
            loaded = loaded.is_some(),
            hit,
            "probed dataset version"
        );
        Ok(loaded.filter(|_| hit))
    }

    /// Loads a built-in table, treating a missing file as a miss.
    fn load_builtin(&self, version: DatasetVersion) -> Result<Option<Arc<RegionTable>>, DatasetError> {
        match self.builtin.load_table(version) {
            Ok(table) => Ok(Some(table)),
            Err(e) if e.is_missing() => {
                tracing::debug!(error = %e, "built-in table missing; skipping version");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Loads an override table merged over the built-in table of the same
    /// effective month.
    fn load_merged(
        &self,
        overlay: &DirectoryStore,
        version: DatasetVersion,
        warnings: &mut Vec<DatasetWarning>,
    ) -> Result<Option<(Arc<RegionTable>, StoreOrigin)>, DatasetError> {
        let base = match self.builtin_index.find_month(version.effective_month()) {
            Some(builtin_version) => self.load_builtin(builtin_version)?,
            None => None,
        };

        let top = match overlay.load_table(version) {
            Ok(table) => Some(table),
            Err(e) if e.is_missing() => None,
            Err(e) => {
                tracing::warn!(error = %e, %version, "override table is unusable; ignoring it");
                warnings.push(DatasetWarning::OverrideTableUnusable {
                    version,
                    detail: e.to_string(),
                });
                None
            }
        };

        Ok(match (base, top) {
            (Some(base), Some(top)) => {
                Some((Arc::new(base.overlaid_with(&top)), StoreOrigin::Override))
            }
            (None, Some(top)) => Some((top, StoreOrigin::Override)),
            (Some(base), None) => Some((base, StoreOrigin::Builtin)),
            (None, None) => None,
        })
    }
}

/// Builds the [`RegionInfo`] for `code` from a table known to list it.
fn extract(
    code: &RegionCode,
    birth_month: u32,
    table: &RegionTable,
    origin: StoreOrigin,
) -> Result<RegionInfo, ResolveError> {
    let county = table.get(code).ok_or_else(|| ResolveError::RegionNotFound {
        code: code.clone(),
        birth_month,
    })?;

    let province_code = code.province_code();
    let province = table
        .get(&province_code)
        .ok_or_else(|| ResolveError::MissingProvince {
            code: code.clone(),
            province_code: province_code.clone(),
            version: table.version(),
        })?;

    // No city row: a province-administered county, or a municipality
    // without a separate city level.
    let city_code = code.city_code();
    let (city, city_from_province) = match table.get(&city_code) {
        Some(city) => (city, false),
        None => (province, true),
    };

    Ok(RegionInfo {
        province: province.to_owned(),
        city: city.to_owned(),
        county: county.to_owned(),
        province_code: province_code.as_u32(),
        city_code: city_code.as_u32(),
        county_code: code.as_u32(),
        level: code.level(),
        region_version: table.version(),
        origin,
        city_from_province,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
