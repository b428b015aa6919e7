//! Identity number generator and benchmark utilities for cnid.
//!
//! This crate produces deterministic batches of identity numbers for
//! benchmarking `cnid-core`.

use cnid_core::mod11_2_check_char;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// County codes present in every bundled dataset revision.
pub const STABLE_COUNTIES: &[&str] = &[
    "110101", "110102", "110105", "110106", "110108", "140105", "140106", "140423", "140428",
    "420102", "420106", "510104",
];

const CHECK_CHARS: [char; 11] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'X'];

/// Configuration for the identity number generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Number of identity numbers to generate.
    pub count: usize,
    /// Fraction of numbers given a wrong check character (0.0-1.0).
    pub invalid_fraction: f64,
}

/// Predefined batch sizes for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// 100 identity numbers
    Small,
    /// 1 000 identity numbers
    Medium,
    /// 10 000 identity numbers
    Large,
}

impl SizeTier {
    /// Returns the default `GeneratorConfig` for this size tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        let count = match self {
            SizeTier::Small => 100,
            SizeTier::Medium => 1_000,
            SizeTier::Large => 10_000,
        };
        GeneratorConfig {
            seed,
            count,
            invalid_fraction: 0.1,
        }
    }
}

/// Generates `config.count` identity numbers drawn from [`STABLE_COUNTIES`]
/// with birth dates between 1981 and 2019.
///
/// Numbers not chosen as invalid carry a correct check character and
/// resolve against the bundled dataset with the default search bounds.
pub fn generate_ids(config: &GeneratorConfig) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    (0..config.count)
        .map(|_| {
            let county = STABLE_COUNTIES[rng.gen_range(0..STABLE_COUNTIES.len())];
            let body = format!(
                "{county}{:04}{:02}{:02}{:03}",
                rng.gen_range(1981..=2019),
                rng.gen_range(1..=12),
                rng.gen_range(1..=28),
                rng.gen_range(0..1000),
            );
            let Some(check) = mod11_2_check_char(&body) else {
                return body;
            };
            let check = if rng.gen_bool(config.invalid_fraction) {
                let offset = rng.gen_range(1..CHECK_CHARS.len());
                let at = CHECK_CHARS.iter().position(|&c| c == check).unwrap_or(0);
                CHECK_CHARS[(at + offset) % CHECK_CHARS.len()]
            } else {
                check
            };
            format!("{body}{check}")
        })
        .collect()
}
