#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod check_digits;
pub mod dataset;
pub mod identity_number;
pub mod newtypes;
pub mod resolver;
pub mod validation;
pub mod version_index;

#[cfg(test)]
mod test_helpers;

pub use check_digits::{mod11_2, mod11_2_check_char};
pub use dataset::{
    BundledStore, DATA_DIR_NAME, DatasetError, DatasetStore, DirectoryStore, INDEX_FILE_NAME,
    RegionTable, StoreOrigin,
};
pub use identity_number::{ID_LEN, IdError, ParsedId, Sex, check};
pub use newtypes::{NewtypeError, RegionCode, RegionLevel};
pub use resolver::{
    DEFAULT_EXCURSION, DatasetWarning, RegionInfo, ResolveError, Resolver, ResolverConfig,
};
pub use validation::{
    ErrorKind, ListedVersion, ValidationResult, Validator, ValidatorConfig, VersionListing,
};
pub use version_index::{Candidate, DatasetVersion, DistanceMap, VersionIndex};

/// Returns the current version of the cnid-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
