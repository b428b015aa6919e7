//! Property-based tests for the structural checks.
//!
//! Covers the checksum, length and format laws with `proptest`-generated
//! inputs. None of these need region data, but the length and format laws
//! are also run through [`Validator::validate`] to confirm the outcome tag.
#![allow(clippy::expect_used)]

use cnid_core::{ErrorKind, IdError, Validator, check, mod11_2, mod11_2_check_char};
use proptest::prelude::*;

const CANDIDATES: [char; 11] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'X'];

fn body() -> impl Strategy<Value = String> {
    "[0-9]{17}"
}

fn not_eighteen_chars() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..40)
        .prop_filter("length must differ from 18", |chars| chars.len() != 18)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Exactly one of the eleven check characters is accepted for any body.
    #[test]
    fn exactly_one_check_character_passes(body in body()) {
        let expected = mod11_2_check_char(&body).expect("17 digits");
        let passing: Vec<char> = CANDIDATES
            .iter()
            .copied()
            .filter(|c| check(&format!("{body}{c}")).is_ok())
            .collect();
        prop_assert_eq!(passing, vec![expected]);
        let helper_agrees = mod11_2(&format!("{body}{expected}"));
        prop_assert!(helper_agrees);
    }

    /// Every wrong check character is reported as a checksum failure.
    #[test]
    fn wrong_check_character_is_checksum_error(body in body(), pick in 0usize..11) {
        let expected = mod11_2_check_char(&body).expect("17 digits");
        let candidate = CANDIDATES[pick];
        prop_assume!(candidate != expected);
        let err = check(&format!("{body}{candidate}")).expect_err("wrong check character");
        let is_checksum = matches!(err, IdError::Checksum { .. });
        prop_assert!(is_checksum, "{:?}", err);
        prop_assert_eq!(err.kind(), ErrorKind::Checksum);
    }

    /// Lower-case `x` is accepted wherever `X` is.
    #[test]
    fn check_character_is_case_insensitive(body in body()) {
        let expected = mod11_2_check_char(&body).expect("17 digits");
        let lower = expected.to_ascii_lowercase();
        let id = format!("{body}{lower}");
        let accepted = mod11_2(&id) && check(&id).is_ok();
        prop_assert!(accepted);
    }

    /// Any input that is not 18 characters long fails on length.
    #[test]
    fn wrong_length_is_length_error(input in not_eighteen_chars()) {
        let err = check(&input).expect_err("wrong length");
        prop_assert_eq!(err.kind(), ErrorKind::Length);
    }

    /// A non-digit anywhere in the first 17 characters fails on format.
    #[test]
    fn non_digit_in_body_is_format_error(
        body in body(),
        position in 0usize..17,
        bad in "[^0-9]",
    ) {
        let mut chars: Vec<char> = body.chars().collect();
        chars[position] = bad.chars().next().expect("one char");
        let id: String = chars.into_iter().chain(std::iter::once('0')).collect();
        let err = check(&id).expect_err("non-digit body");
        prop_assert_eq!(err.kind(), ErrorKind::Format);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn validator_reports_length_and_format(
        input in not_eighteen_chars(),
        body in body(),
        position in 0usize..17,
    ) {
        let validator = Validator::new().expect("bundled dataset");

        let short = validator.validate(&input);
        prop_assert!(!short.success());
        prop_assert_eq!(short.error_kind(), ErrorKind::Length);

        let mut chars: Vec<char> = body.chars().collect();
        chars[position] = 'a';
        let id: String = chars.into_iter().chain(std::iter::once('1')).collect();
        let bad = validator.validate(&id);
        prop_assert_eq!(bad.error_kind(), ErrorKind::Format);
    }
}
