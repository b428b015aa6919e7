//! Structural parsing of 18-character resident identity numbers.
//!
//! [`check`] applies the shape checks in a fixed order (length, digits,
//! check character) and yields a [`ParsedId`] holding the embedded region
//! code, birth month and sex. Calendar validation of the birth date is
//! exposed separately through [`ParsedId::birth_date`] so callers can decide
//! where in their pipeline an impossible date should surface.
//!
//! Layout (0-indexed byte positions):
//!
//! | Positions | Meaning                         |
//! |-----------|---------------------------------|
//! | 0-5       | region code                     |
//! | 6-13      | birth date, `YYYYMMDD`          |
//! | 14-15     | sequence                        |
//! | 16        | sex digit (odd male, even female) |
//! | 17        | check character `0-9` or `X`    |
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::check_digits::{BODY_LEN, mod11_2, mod11_2_check_char};
use crate::newtypes::RegionCode;
use crate::validation::ErrorKind;

/// Required length of an identity number in characters.
pub const ID_LEN: usize = 18;

// ---------------------------------------------------------------------------
// IdError
// ---------------------------------------------------------------------------

/// A per-number structural failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not exactly [`ID_LEN`] characters long.
    #[error("identity number must be 18 characters, got {actual}")]
    Length {
        /// Number of characters actually supplied.
        actual: usize,
    },

    /// A character among the first 17 is not an ASCII digit.
    #[error("identity number has non-digit {found:?} at position {position}")]
    NonDigit {
        /// 0-indexed character position.
        position: usize,
        /// The offending character.
        found: char,
    },

    /// The final character does not match the MOD 11-2 check character.
    #[error("check character mismatch: expected {expected}, got {found}")]
    Checksum {
        /// The check character computed from the body.
        expected: char,
        /// The check character present in the input.
        found: char,
    },

    /// Positions 6-13 do not form a real calendar date.
    #[error("birth date {raw} is not a valid calendar date")]
    BirthDate {
        /// The eight raw digits.
        raw: String,
    },
}

impl IdError {
    /// Maps the failure to its outcome tag.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Length { .. } => ErrorKind::Length,
            Self::NonDigit { .. } | Self::BirthDate { .. } => ErrorKind::Format,
            Self::Checksum { .. } => ErrorKind::Checksum,
        }
    }
}

// ---------------------------------------------------------------------------
// Sex
// ---------------------------------------------------------------------------

/// Sex encoded by the parity of position 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Even sex digit.
    Female,
    /// Odd sex digit.
    Male,
}

impl Sex {
    /// Derives the sex from the numeric value of the sex digit.
    pub fn from_digit(digit: u8) -> Self {
        if digit % 2 == 0 { Self::Female } else { Self::Male }
    }

    /// Chinese label as printed on the identity card.
    pub fn label(self) -> &'static str {
        match self {
            Self::Female => "女",
            Self::Male => "男",
        }
    }
}

// ---------------------------------------------------------------------------
// ParsedId
// ---------------------------------------------------------------------------

/// An identity number that passed the length, digit and check-character tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId {
    region_code: RegionCode,
    birth_digits: [u8; 8],
    sex: Sex,
    check_char: char,
}

impl ParsedId {
    /// The six-digit region code in positions 0-5.
    pub fn region_code(&self) -> &RegionCode {
        &self.region_code
    }

    /// Positions 6-11 read as a `YYYYMM` integer, used for version selection.
    ///
    /// This value is available even when the full date is not a real date.
    pub fn birth_month(&self) -> u32 {
        digits_value(&self.birth_digits[..6])
    }

    /// Positions 6-13 parsed as a calendar date.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::BirthDate`] when the month or day is out of range
    /// for the year (including month `00`, day `00` and February 29 in a
    /// common year).
    pub fn birth_date(&self) -> Result<NaiveDate, IdError> {
        let year = digits_value(&self.birth_digits[..4]);
        let month = digits_value(&self.birth_digits[4..6]);
        let day = digits_value(&self.birth_digits[6..]);
        i32::try_from(year)
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
            .ok_or_else(|| IdError::BirthDate {
                raw: self.birth_digits.iter().map(|d| char::from(b'0' + d)).collect(),
            })
    }

    /// Sex derived from position 16.
    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// The check character, normalised to uppercase.
    pub fn check_char(&self) -> char {
        self.check_char
    }
}

/// Folds a slice of decimal digit values into an integer.
fn digits_value(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0, |acc, d| acc * 10 + u32::from(*d))
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

/// Parses and verifies the structure of an identity number.
///
/// Checks run in this order and the first failure is returned:
///
/// 1. exactly 18 characters, else [`IdError::Length`];
/// 2. characters 0-16 are ASCII digits, else [`IdError::NonDigit`];
/// 3. character 17 equals the MOD 11-2 check character (case-insensitive),
///    else [`IdError::Checksum`].
///
/// # Errors
///
/// See the list above. Calendar validity of the birth date is not checked
/// here; call [`ParsedId::birth_date`].
pub fn check(id: &str) -> Result<ParsedId, IdError> {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() != ID_LEN {
        return Err(IdError::Length {
            actual: chars.len(),
        });
    }

    if let Some((position, found)) = chars
        .iter()
        .take(BODY_LEN)
        .copied()
        .enumerate()
        .find(|(_, c)| !c.is_ascii_digit())
    {
        return Err(IdError::NonDigit { position, found });
    }

    // The first 17 characters are ASCII digits, so the byte slice is exact.
    let body = id.get(..BODY_LEN).unwrap_or_default();
    if !mod11_2(id) {
        return Err(IdError::Checksum {
            expected: mod11_2_check_char(body).unwrap_or('?'),
            found: chars[BODY_LEN],
        });
    }
    let found = chars[BODY_LEN].to_ascii_uppercase();

    let digits: Vec<u8> = body.bytes().map(|b| b - b'0').collect();
    let region_code = RegionCode::try_from(&body[..6]).map_err(|_| IdError::NonDigit {
        position: 0,
        found: chars[0],
    })?;
    let mut birth_digits = [0u8; 8];
    birth_digits.copy_from_slice(&digits[6..14]);

    Ok(ParsedId {
        region_code,
        birth_digits,
        sex: Sex::from_digit(digits[16]),
        check_char: found,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
