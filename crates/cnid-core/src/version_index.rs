//! Dataset version stamps, per-store version indexes, and the distance maps
//! that order candidate versions around a birth month.
//!
//! Version stamps are integers. Bundled indexes use `YYYYMM`; override
//! directories may use a bare `YYYY`, which is read as `YYYY00` when
//! computing distances. The raw stamp is kept for file naming.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::{DatasetError, StoreOrigin};

/// Stamps below this value are bare years.
const YEAR_ONLY_LIMIT: u32 = 10_000;

// ---------------------------------------------------------------------------
// DatasetVersion
// ---------------------------------------------------------------------------

/// The stamp of one administrative-code revision, as written in `index.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetVersion(u32);

impl DatasetVersion {
    /// Wraps a raw index value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The value exactly as written in the index and used in the file name.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// The stamp as `YYYYMM`. Bare years become `YYYY00`.
    pub fn effective_month(self) -> u32 {
        if self.0 < YEAR_ONLY_LIMIT {
            self.0.saturating_mul(100)
        } else {
            self.0
        }
    }

    /// Name of the table file for this version, e.g. `199612.json`.
    pub fn file_name(self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// VersionIndex
// ---------------------------------------------------------------------------

/// The set of versions one store knows about.
///
/// Duplicates in the source array are collapsed; iteration is ascending by
/// raw stamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionIndex {
    versions: BTreeSet<DatasetVersion>,
}

impl VersionIndex {
    /// Parses an `index.json` body: a JSON array of non-negative integers.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Corrupt`] for anything else.
    pub fn from_json(json: &str, origin: StoreOrigin, location: &str) -> Result<Self, DatasetError> {
        let raw: Vec<u32> = serde_json::from_str(json).map_err(|e| DatasetError::Corrupt {
            origin,
            location: location.to_owned(),
            detail: e.to_string(),
        })?;
        Ok(raw.into_iter().map(DatasetVersion::new).collect())
    }

    /// Iterates versions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = DatasetVersion> + '_ {
        self.versions.iter().copied()
    }

    /// Number of distinct versions.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Returns `true` when the index lists no versions.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Returns `true` if `version` is listed.
    pub fn contains(&self, version: DatasetVersion) -> bool {
        self.versions.contains(&version)
    }

    /// Finds the listed version whose effective month equals `month`.
    ///
    /// If several raw stamps share an effective month the largest raw stamp
    /// is returned.
    pub fn find_month(&self, month: u32) -> Option<DatasetVersion> {
        self.versions
            .iter()
            .rev()
            .find(|v| v.effective_month() == month)
            .copied()
    }
}

impl FromIterator<DatasetVersion> for VersionIndex {
    fn from_iter<I: IntoIterator<Item = DatasetVersion>>(iter: I) -> Self {
        Self {
            versions: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// DistanceMap
// ---------------------------------------------------------------------------

/// A version to probe, with the store it should be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// The version stamp.
    pub version: DatasetVersion,
    /// Which store listed it. Override wins when both list the same month.
    pub origin: StoreOrigin,
    /// `birth_month - effective_month`.
    pub distance: i64,
}

/// Candidate versions partitioned around a birth month and keyed by the
/// magnitude of their distance.
///
/// `at_or_before` holds versions whose effective month is not after the
/// birth month; `after` holds the rest. Each side iterates from the closest
/// version outward. Because the key is the distance, two entries collide
/// only when they share an effective month; the later insertion replaces
/// the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistanceMap {
    at_or_before: BTreeMap<u64, Candidate>,
    after: BTreeMap<u64, Candidate>,
}

impl DistanceMap {
    /// Builds the map for `birth_month` from the built-in index and, when
    /// present, the override index.
    ///
    /// Built-in versions are inserted first, so on an exact distance
    /// collision the override entry is the one kept.
    pub fn build(birth_month: u32, builtin: &VersionIndex, overlay: Option<&VersionIndex>) -> Self {
        let mut map = Self::default();
        for version in builtin.iter() {
            map.insert(birth_month, version, StoreOrigin::Builtin);
        }
        for version in overlay.into_iter().flat_map(|idx| idx.iter()) {
            map.insert(birth_month, version, StoreOrigin::Override);
        }
        map
    }

    /// Inserts one version, replacing any entry at the same distance.
    pub fn insert(&mut self, birth_month: u32, version: DatasetVersion, origin: StoreOrigin) {
        let distance = i64::from(birth_month) - i64::from(version.effective_month());
        let candidate = Candidate {
            version,
            origin,
            distance,
        };
        let side = if distance >= 0 {
            &mut self.at_or_before
        } else {
            &mut self.after
        };
        side.insert(distance.unsigned_abs(), candidate);
    }

    /// Versions at or before the birth month, closest first.
    pub fn at_or_before(&self) -> impl Iterator<Item = &Candidate> {
        self.at_or_before.values()
    }

    /// Versions after the birth month, closest first.
    pub fn after(&self) -> impl Iterator<Item = &Candidate> {
        self.after.values()
    }

    /// Total number of candidates on both sides.
    pub fn len(&self) -> usize {
        self.at_or_before.len() + self.after.len()
    }

    /// Returns `true` when there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.at_or_before.is_empty() && self.after.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn index(raw: &[u32]) -> VersionIndex {
        raw.iter().copied().map(DatasetVersion::new).collect()
    }

    fn versions<'a>(it: impl Iterator<Item = &'a Candidate>) -> Vec<(u32, StoreOrigin)> {
        it.map(|c| (c.version.raw(), c.origin)).collect()
    }

    #[test]
    fn effective_month_scales_bare_years() {
        assert_eq!(DatasetVersion::new(2020).effective_month(), 202_000);
        assert_eq!(DatasetVersion::new(199_612).effective_month(), 199_612);
    }

    #[test]
    fn file_name_uses_raw_stamp() {
        assert_eq!(DatasetVersion::new(2020).file_name(), "2020.json");
        assert_eq!(DatasetVersion::new(199_612).file_name(), "199612.json");
    }

    #[test]
    fn index_from_json_collapses_duplicates() {
        let idx = VersionIndex::from_json("[201912, 199612, 201912]", StoreOrigin::Override, "i")
            .expect("valid index");
        assert_eq!(idx.len(), 2);
        assert_eq!(
            idx.iter().map(DatasetVersion::raw).collect::<Vec<_>>(),
            vec![199_612, 201_912]
        );
    }

    #[test]
    fn index_from_json_rejects_objects_and_strings() {
        for bad in [r#"{"a":1}"#, r#"["199612"]"#, "[-1]", "", "[1.5]"] {
            assert!(
                VersionIndex::from_json(bad, StoreOrigin::Builtin, "i").is_err(),
                "should reject {bad:?}"
            );
        }
    }

    #[test]
    fn find_month_matches_effective_month() {
        let idx = index(&[2020, 199_612]);
        assert_eq!(idx.find_month(202_000), Some(DatasetVersion::new(2020)));
        assert_eq!(idx.find_month(199_612), Some(DatasetVersion::new(199_612)));
        assert_eq!(idx.find_month(201_912), None);
    }

    #[test]
    fn partitions_around_birth_month_closest_first() {
        let builtin = index(&[198_012, 199_112, 199_612, 200_212, 200_812]);
        let map = DistanceMap::build(199_705, &builtin, None);
        assert_eq!(
            versions(map.at_or_before()),
            vec![
                (199_612, StoreOrigin::Builtin),
                (199_112, StoreOrigin::Builtin),
                (198_012, StoreOrigin::Builtin),
            ]
        );
        assert_eq!(
            versions(map.after()),
            vec![
                (200_212, StoreOrigin::Builtin),
                (200_812, StoreOrigin::Builtin),
            ]
        );
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn exact_birth_month_is_distance_zero_on_the_early_side() {
        let map = DistanceMap::build(199_612, &index(&[199_612, 200_212]), None);
        let first = map.at_or_before().next().expect("one candidate");
        assert_eq!(first.distance, 0);
        assert_eq!(first.version.raw(), 199_612);
    }

    #[test]
    fn override_wins_distance_collision() {
        let builtin = index(&[199_612, 201_912]);
        let overlay = index(&[201_912]);
        let map = DistanceMap::build(202_001, &builtin, Some(&overlay));
        assert_eq!(
            versions(map.at_or_before()),
            vec![
                (201_912, StoreOrigin::Override),
                (199_612, StoreOrigin::Builtin),
            ]
        );
    }

    #[test]
    fn override_years_interleave_with_builtin_months() {
        let builtin = index(&[201_412, 201_912]);
        let overlay = index(&[2017]);
        let map = DistanceMap::build(201_805, &builtin, Some(&overlay));
        assert_eq!(
            versions(map.at_or_before()),
            vec![
                (2017, StoreOrigin::Override),
                (201_412, StoreOrigin::Builtin),
            ]
        );
        assert_eq!(versions(map.after()), vec![(201_912, StoreOrigin::Builtin)]);
    }

    #[test]
    fn zero_birth_month_puts_everything_after() {
        let map = DistanceMap::build(0, &index(&[198_012, 199_112]), None);
        assert_eq!(map.at_or_before().count(), 0);
        assert_eq!(
            versions(map.after()),
            vec![
                (198_012, StoreOrigin::Builtin),
                (199_112, StoreOrigin::Builtin),
            ]
        );
    }

    #[test]
    fn empty_indexes_give_empty_map() {
        let map = DistanceMap::build(199_705, &VersionIndex::default(), None);
        assert!(map.is_empty());
    }
}
