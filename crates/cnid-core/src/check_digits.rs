//! Pure check-character computation for 18-character resident identity numbers.
//!
//! The scheme is ISO 7064 MOD 11-2 as profiled by GB 11643: the first 17
//! digits are multiplied by fixed position weights, the sum is reduced
//! modulo 11, and the remainder indexes a fixed table of check characters.
//! Both functions are zero-allocation and operate on the byte slice of the
//! input.

/// Position weights applied to the 17 body digits, left to right.
pub const WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];

/// Check character indexed by `weighted_sum % 11`.
pub const CHECK_CHARS: [char; 11] = ['1', '0', 'X', '9', '8', '7', '6', '5', '4', '3', '2'];

/// Number of body digits covered by the check character.
pub const BODY_LEN: usize = 17;

/// Computes the expected check character for a 17-digit identity body.
///
/// Returns `None` if `body` is not exactly 17 ASCII digits.
///
/// # Examples
///
/// ```
/// use cnid_core::check_digits::mod11_2_check_char;
///
/// assert_eq!(mod11_2_check_char("14042819970502003"), Some('7'));
/// assert_eq!(mod11_2_check_char("00000000000000000"), Some('1'));
/// assert_eq!(mod11_2_check_char("1404281997050200"), None);
/// ```
pub fn mod11_2_check_char(body: &str) -> Option<char> {
    let bytes = body.as_bytes();
    if bytes.len() != BODY_LEN {
        return None;
    }

    let mut sum: u32 = 0;
    for (byte, weight) in bytes.iter().zip(WEIGHTS) {
        if !byte.is_ascii_digit() {
            return None;
        }
        sum += u32::from(byte - b'0') * weight;
    }

    // sum % 11 is always < 11, so the index is in bounds.
    CHECK_CHARS.get((sum % 11) as usize).copied()
}

/// Verifies the MOD 11-2 check character of a full 18-character identity number.
///
/// The final character is compared case-insensitively, so `x` and `X` are
/// equivalent. Returns `false` for anything that is not 17 ASCII digits
/// followed by one character.
///
/// # Examples
///
/// ```
/// use cnid_core::check_digits::mod11_2;
///
/// assert!(mod11_2("140428199705020037"));
/// assert!(!mod11_2("140000000000000000"));
/// ```
pub fn mod11_2(id: &str) -> bool {
    let Some(body) = id.get(..BODY_LEN) else {
        return false;
    };
    let Some(actual) = id.get(BODY_LEN..) else {
        return false;
    };
    let mut actual_chars = actual.chars();
    let (Some(check), None) = (actual_chars.next(), actual_chars.next()) else {
        return false;
    };
    mod11_2_check_char(body).is_some_and(|expected| expected == check.to_ascii_uppercase())
}
