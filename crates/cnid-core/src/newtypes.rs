/// Validated newtype wrappers for administrative region codes.
///
/// [`RegionCode`] enforces its six-digit shape at construction time via
/// [`TryFrom<&str>`]. Once constructed, the inner value is immutable (no
/// `DerefMut`). The serde `Deserialize` impl re-runs validation so malformed
/// codes cannot enter the type system from dataset files.
use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when constructing a validated newtype from an invalid string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewtypeError {
    /// The string did not match the expected format.
    #[error("invalid {type_name}: expected {expected}, got {got:?}")]
    InvalidFormat {
        /// Name of the type that rejected the input.
        type_name: &'static str,
        /// A human-readable description of the expected format.
        expected: &'static str,
        /// The input that was rejected.
        got: String,
    },
}

// ---------------------------------------------------------------------------
// Regex statics
// ---------------------------------------------------------------------------

/// Matches exactly six ASCII digits.
static REGION_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{6}$").unwrap_or_else(|_| unreachable!("region code pattern is valid"))
});

// ---------------------------------------------------------------------------
// RegionLevel
// ---------------------------------------------------------------------------

/// Administrative level denoted by the trailing zeros of a [`RegionCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionLevel {
    /// `NN0000`: province, autonomous region or municipality.
    Province,
    /// `NNNN00`: prefecture-level city or equivalent.
    City,
    /// Any other code: county, district or county-level city.
    County,
}

// ---------------------------------------------------------------------------
// RegionCode
// ---------------------------------------------------------------------------

/// Six-digit administrative division code (GB/T 2260).
///
/// The code decomposes into a province prefix (digits 1-2), a city prefix
/// (digits 1-4) and the full county code. Use [`RegionCode::province_code`]
/// and [`RegionCode::city_code`] to obtain the enclosing divisions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionCode(String);

impl TryFrom<&str> for RegionCode {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if REGION_CODE_RE.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(NewtypeError::InvalidFormat {
                type_name: "RegionCode",
                expected: "six ASCII digits (e.g. 140428)",
                got: s.to_owned(),
            })
        }
    }
}

impl RegionCode {
    /// Returns the province-level code: the first two digits followed by `0000`.
    pub fn province_code(&self) -> RegionCode {
        self.with_prefix(2)
    }

    /// Returns the city-level code: the first four digits followed by `00`.
    pub fn city_code(&self) -> RegionCode {
        self.with_prefix(4)
    }

    /// Returns the administrative level implied by the trailing zeros.
    pub fn level(&self) -> RegionLevel {
        if self.0.ends_with("0000") {
            RegionLevel::Province
        } else if self.0.ends_with("00") {
            RegionLevel::City
        } else {
            RegionLevel::County
        }
    }

    /// Returns the code as an integer. Leading zeros are dropped.
    pub fn as_u32(&self) -> u32 {
        // Six ASCII digits always fit in a u32.
        self.0.parse().unwrap_or(0)
    }

    /// Keeps the first `len` digits and zero-fills the rest.
    fn with_prefix(&self, len: usize) -> RegionCode {
        let prefix = self.0.get(..len).unwrap_or_default();
        RegionCode(format!("{prefix:0<6}"))
    }
}

impl Deref for RegionCode {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RegionCode {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RegionCode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::try_from(s.as_str()).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
