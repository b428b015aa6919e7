//! Shared test helper functions for constructing test fixtures.
//!
//! This module is compiled only in test builds and provides constructors for
//! region codes, tables, identity numbers and on-disk dataset directories used
//! across unit test modules throughout `cnid-core`.
//!
//! Integration tests in `crates/cnid-core/tests/` define their own local
//! helpers because they link against the non-test library build where this
//! module is not available.
#![allow(clippy::expect_used)]

use std::collections::BTreeMap;
use std::path::Path;

use crate::check_digits::mod11_2_check_char;
use crate::dataset::{DATA_DIR_NAME, INDEX_FILE_NAME, RegionTable};
use crate::newtypes::RegionCode;
use crate::version_index::DatasetVersion;

/// Parses a region code, panicking on invalid input (test-only).
pub fn code(s: &str) -> RegionCode {
    RegionCode::try_from(s).expect("valid RegionCode")
}

/// Builds an in-memory table from `(code, name)` pairs.
pub fn table(version: u32, rows: &[(&str, &str)]) -> RegionTable {
    let entries: BTreeMap<RegionCode, String> = rows
        .iter()
        .map(|(c, n)| (code(c), (*n).to_owned()))
        .collect();
    RegionTable::new(DatasetVersion::new(version), entries)
}

/// Appends the correct check character to a 17-digit body.
pub fn with_check_char(body: &str) -> String {
    let check = mod11_2_check_char(body).expect("17-digit body");
    format!("{body}{check}")
}

/// Writes `<root>/administrative-code-data/index.json` with the given body.
pub fn write_index(root: &Path, json: &str) {
    let dir = root.join(DATA_DIR_NAME);
    std::fs::create_dir_all(&dir).expect("create data dir");
    std::fs::write(dir.join(INDEX_FILE_NAME), json).expect("write index");
}

/// Writes `<root>/administrative-code-data/<version>.json` from `(code, name)` pairs.
pub fn write_table(root: &Path, version: u32, rows: &[(&str, &str)]) {
    let dir = root.join(DATA_DIR_NAME);
    std::fs::create_dir_all(&dir).expect("create data dir");
    let map: BTreeMap<&str, &str> = rows.iter().copied().collect();
    let json = serde_json::to_string_pretty(&map).expect("serialize table");
    std::fs::write(dir.join(format!("{version}.json")), json).expect("write table");
}
