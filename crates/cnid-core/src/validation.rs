//! The validation facade: one identity number in, one [`ValidationResult`] out.
//!
//! [`Validator::validate`] runs the structural checks, resolves the region
//! code and finally checks the birth date against the calendar. Per-number
//! failures never escape as `Err`; they are folded into the result's
//! [`ErrorKind`] and message. Only constructing a [`Validator`] can fail, and
//! only when the built-in dataset is unusable.
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dataset::{BundledStore, DatasetError, DatasetStore, StoreOrigin};
use crate::identity_number::{self, Sex};
use crate::newtypes::RegionLevel;
use crate::resolver::{
    DEFAULT_EXCURSION, DatasetWarning, RegionInfo, Resolver, ResolverConfig,
};
use crate::version_index::DatasetVersion;

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Outcome tag carried by every [`ValidationResult`].
///
/// Variants are listed in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Every check passed.
    Success,
    /// Input is not 18 characters.
    Length,
    /// Non-digit in the first 17 characters, or an impossible birth date.
    Format,
    /// Check character mismatch.
    Checksum,
    /// No dataset version within the search bounds lists the region code.
    RegionNotFound,
    /// The built-in dataset is absent.
    DatasetMissing,
    /// The built-in dataset cannot be read or parsed.
    DatasetCorrupt,
}

impl ErrorKind {
    /// Stable snake-case name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Length => "length",
            Self::Format => "format",
            Self::Checksum => "checksum",
            Self::RegionNotFound => "region_not_found",
            Self::DatasetMissing => "dataset_missing",
            Self::DatasetCorrupt => "dataset_corrupt",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ValidatorConfig
// ---------------------------------------------------------------------------

/// Construction-time settings for a [`Validator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Root of an override dataset laid out as
    /// `<root>/administrative-code-data/`. A root that does not exist is
    /// treated as "no override".
    pub override_root: Option<PathBuf>,
    /// Versions probed at or before the birth month. Default: 3.
    pub forward_excursion: usize,
    /// Versions probed after the birth month. Default: 3.
    pub backward_excursion: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            override_root: None,
            forward_excursion: DEFAULT_EXCURSION,
            backward_excursion: DEFAULT_EXCURSION,
        }
    }
}

impl ValidatorConfig {
    fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            forward_excursion: self.forward_excursion,
            backward_excursion: self.backward_excursion,
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationResult
// ---------------------------------------------------------------------------

/// The outcome of validating one identity number.
///
/// Built fresh by every [`Validator::validate`] call. On failure only the
/// echoed input, the error kind and message, and any dataset warnings are
/// set; the parsed and resolved fields are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    id: String,
    success: bool,
    error_kind: ErrorKind,
    error_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sex: Option<Sex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sex_label: Option<&'static str>,
    #[serde(flatten)]
    region: Option<RegionInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<DatasetWarning>,
}

impl ValidationResult {
    fn failure(
        id: &str,
        kind: ErrorKind,
        message: String,
        warnings: Vec<DatasetWarning>,
    ) -> Self {
        Self {
            id: id.to_owned(),
            success: false,
            error_kind: kind,
            error_message: message,
            birth: None,
            sex: None,
            sex_label: None,
            region: None,
            warnings,
        }
    }

    fn succeeded(
        id: &str,
        birth: NaiveDate,
        sex: Sex,
        region: RegionInfo,
        warnings: Vec<DatasetWarning>,
    ) -> Self {
        Self {
            id: id.to_owned(),
            success: true,
            error_kind: ErrorKind::Success,
            error_message: String::new(),
            birth: Some(birth),
            sex: Some(sex),
            sex_label: Some(sex.label()),
            region: Some(region),
            warnings,
        }
    }

    /// The identity number as supplied.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `true` when [`error_kind`](Self::error_kind) is [`ErrorKind::Success`].
    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error_kind(&self) -> ErrorKind {
        self.error_kind
    }

    /// Human-readable failure description; empty on success.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn birth(&self) -> Option<NaiveDate> {
        self.birth
    }

    pub fn sex(&self) -> Option<Sex> {
        self.sex
    }

    /// `男` or `女`.
    pub fn sex_label(&self) -> Option<&'static str> {
        self.sex_label
    }

    pub fn province(&self) -> Option<&str> {
        self.region.as_ref().map(|r| r.province.as_str())
    }

    pub fn city(&self) -> Option<&str> {
        self.region.as_ref().map(|r| r.city.as_str())
    }

    pub fn county(&self) -> Option<&str> {
        self.region.as_ref().map(|r| r.county.as_str())
    }

    pub fn province_code(&self) -> Option<u32> {
        self.region.as_ref().map(|r| r.province_code)
    }

    pub fn city_code(&self) -> Option<u32> {
        self.region.as_ref().map(|r| r.city_code)
    }

    pub fn county_code(&self) -> Option<u32> {
        self.region.as_ref().map(|r| r.county_code)
    }

    /// The dataset version whose table matched the region code.
    pub fn region_version(&self) -> Option<DatasetVersion> {
        self.region.as_ref().map(|r| r.region_version)
    }

    /// Administrative level of the embedded region code.
    pub fn region_level(&self) -> Option<RegionLevel> {
        self.region.as_ref().map(|r| r.level)
    }

    /// The full resolved region record.
    pub fn region(&self) -> Option<&RegionInfo> {
        self.region.as_ref()
    }

    /// Problems with the override dataset noticed during this call.
    pub fn warnings(&self) -> &[DatasetWarning] {
        &self.warnings
    }
}

// ---------------------------------------------------------------------------
// Version listing
// ---------------------------------------------------------------------------

/// One dataset version known to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListedVersion {
    pub version: DatasetVersion,
    pub effective_month: u32,
    pub origin: StoreOrigin,
}

/// Every version the validator can probe, with override problems seen while
/// reading the override index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionListing {
    /// Sorted by effective month; built-in before override within a month.
    pub versions: Vec<ListedVersion>,
    pub warnings: Vec<DatasetWarning>,
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Validates identity numbers against the built-in dataset and an optional
/// override directory.
///
/// A `Validator` holds no per-call state; `validate` takes `&self` and may be
/// called from many threads at once.
#[derive(Debug)]
pub struct Validator {
    resolver: Resolver,
}

impl Validator {
    /// Creates a validator over the bundled dataset with default bounds and
    /// no override directory.
    ///
    /// The bundled tables are a sample: a few dozen codes per revision from
    /// 198012 to 201912, covering only Beijing, Shanxi, Hubei, Hainan,
    /// Chongqing and Sichuan. Most real identity numbers resolve only
    /// when the full national tables are supplied through
    /// [`Validator::with_override`]; without them they fail with
    /// [`ErrorKind::RegionNotFound`].
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if the bundled dataset cannot be parsed.
    pub fn new() -> Result<Self, DatasetError> {
        Self::with_config(ValidatorConfig::default())
    }

    /// Creates a validator that also consults the override dataset under
    /// `root`.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if the bundled dataset cannot be parsed.
    /// Problems with the override directory are not errors.
    pub fn with_override(root: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        Self::with_config(ValidatorConfig {
            override_root: Some(root.into()),
            ..ValidatorConfig::default()
        })
    }

    /// Creates a validator over the bundled dataset with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if the bundled dataset cannot be parsed.
    pub fn with_config(config: ValidatorConfig) -> Result<Self, DatasetError> {
        let builtin: Arc<dyn DatasetStore> = Arc::new(BundledStore::load()?);
        Self::with_store(builtin, config)
    }

    /// Creates a validator over any built-in store.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if `builtin` cannot produce its index.
    pub fn with_store(
        builtin: Arc<dyn DatasetStore>,
        config: ValidatorConfig,
    ) -> Result<Self, DatasetError> {
        let resolver_config = config.resolver_config();
        let resolver = Resolver::new(builtin, config.override_root, resolver_config)?;
        Ok(Self { resolver })
    }

    /// The configured override root, whether or not it exists.
    pub fn override_root(&self) -> Option<&Path> {
        self.resolver.override_root()
    }

    /// The underlying resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Lists every version of the built-in store and the current override
    /// index.
    pub fn versions(&self) -> VersionListing {
        let mut warnings = Vec::new();
        let builtin = self
            .resolver
            .builtin_index()
            .iter()
            .map(|v| listed(v, StoreOrigin::Builtin));
        let overlay: Vec<ListedVersion> = self
            .resolver
            .override_index(&mut warnings)
            .map(|index| {
                index
                    .iter()
                    .map(|v| listed(v, StoreOrigin::Override))
                    .collect()
            })
            .unwrap_or_default();

        let mut versions: Vec<ListedVersion> = builtin.chain(overlay).collect();
        versions.sort_by_key(|v| (v.effective_month, v.origin, v.version));
        VersionListing { versions, warnings }
    }

    /// Validates one identity number.
    ///
    /// Checks run in this order; the first failure decides the result:
    ///
    /// 1. length ([`ErrorKind::Length`]);
    /// 2. digits in positions 0-16 ([`ErrorKind::Format`]);
    /// 3. check character ([`ErrorKind::Checksum`]);
    /// 4. region resolution ([`ErrorKind::RegionNotFound`], or a dataset
    ///    kind if the built-in store fails mid-search);
    /// 5. birth date is a real calendar date ([`ErrorKind::Format`]).
    pub fn validate(&self, id: &str) -> ValidationResult {
        let parsed = match identity_number::check(id) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(kind = %e.kind(), error = %e, "identity number rejected");
                return ValidationResult::failure(id, e.kind(), e.to_string(), Vec::new());
            }
        };

        let mut warnings = Vec::new();
        let region = match self.resolver.resolve_with_warnings(
            parsed.region_code(),
            parsed.birth_month(),
            &mut warnings,
        ) {
            Ok(region) => region,
            Err(e) => {
                tracing::debug!(
                    code = %parsed.region_code(),
                    kind = %e.kind(),
                    error = %e,
                    "region resolution failed"
                );
                return ValidationResult::failure(id, e.kind(), e.to_string(), warnings);
            }
        };

        let birth = match parsed.birth_date() {
            Ok(birth) => birth,
            Err(e) => {
                tracing::debug!(error = %e, "birth date rejected");
                return ValidationResult::failure(id, e.kind(), e.to_string(), warnings);
            }
        };

        tracing::debug!(
            code = %parsed.region_code(),
            version = %region.region_version,
            origin = %region.origin,
            "identity number valid"
        );
        ValidationResult::succeeded(id, birth, parsed.sex(), region, warnings)
    }
}

fn listed(version: DatasetVersion, origin: StoreOrigin) -> ListedVersion {
    ListedVersion {
        version,
        effective_month: version.effective_month(),
        origin,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
