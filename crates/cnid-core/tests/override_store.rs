//! Override-directory behaviour exercised through the public API.
//!
//! Each test builds a throwaway dataset tree with `tempfile`. Some tests also
//! use a directory as the built-in store so the search bounds can be checked
//! against a controlled set of versions.
#![allow(clippy::expect_used)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use cnid_core::{
    DATA_DIR_NAME, DatasetStore, DatasetVersion, DatasetWarning, DirectoryStore, ErrorKind,
    INDEX_FILE_NAME, StoreOrigin, Validator, ValidatorConfig, mod11_2_check_char,
};

fn write_index(root: &Path, json: &str) {
    let dir = root.join(DATA_DIR_NAME);
    std::fs::create_dir_all(&dir).expect("create data dir");
    std::fs::write(dir.join(INDEX_FILE_NAME), json).expect("write index");
}

fn write_table(root: &Path, version: u32, rows: &[(&str, &str)]) {
    let dir = root.join(DATA_DIR_NAME);
    std::fs::create_dir_all(&dir).expect("create data dir");
    let map: BTreeMap<&str, &str> = rows.iter().copied().collect();
    let json = serde_json::to_string(&map).expect("serialize table");
    std::fs::write(dir.join(format!("{version}.json")), json).expect("write table");
}

fn id(body: &str) -> String {
    let check = mod11_2_check_char(body).expect("17-digit body");
    format!("{body}{check}")
}

fn directory_validator(builtin: &Path, config: ValidatorConfig) -> Validator {
    let store: Arc<dyn DatasetStore> = Arc::new(DirectoryStore::new(builtin, StoreOrigin::Builtin));
    Validator::with_store(store, config).expect("built-in index")
}

// ── Override over the bundled dataset ──────────────────────────────────────

#[test]
fn override_renames_code_for_matching_version() {
    let overlay = tempfile::tempdir().expect("tempdir");
    write_index(overlay.path(), "[199612]");
    write_table(overlay.path(), 199_612, &[("140428", "长子县（测试）")]);

    let v = Validator::with_override(overlay.path()).expect("validator");
    let r = v.validate("140428199705020037");
    assert!(r.success(), "{}", r.error_message());
    assert_eq!(r.county(), Some("长子县（测试）"));
    assert_eq!(r.province(), Some("山西省"));
}

#[test]
fn override_adds_codes_the_bundle_lacks() {
    let overlay = tempfile::tempdir().expect("tempdir");
    write_index(overlay.path(), "[2020, 2020]");
    write_table(
        overlay.path(),
        2020,
        &[
            ("330000", "浙江省"),
            ("330100", "杭州市"),
            ("330106", "西湖区"),
        ],
    );

    let v = Validator::with_override(overlay.path()).expect("validator");
    let r = v.validate(&id("33010620200305002"));
    assert!(r.success(), "{}", r.error_message());
    assert_eq!(r.county(), Some("西湖区"));
    assert_eq!(r.city(), Some("杭州市"));
    assert_eq!(r.region_version(), Some(DatasetVersion::new(2020)));
    assert_eq!(r.region().map(|i| i.origin), Some(StoreOrigin::Override));
}

#[test]
fn corrupt_override_table_warns_when_probed() {
    let overlay = tempfile::tempdir().expect("tempdir");
    write_index(overlay.path(), "[1997]");
    std::fs::write(
        overlay.path().join(DATA_DIR_NAME).join("1997.json"),
        "not json at all",
    )
    .expect("write");

    let v = Validator::with_override(overlay.path()).expect("validator");
    let r = v.validate("140428199705020037");
    assert!(r.success(), "{}", r.error_message());
    assert_eq!(r.county(), Some("长子县"));
    assert!(matches!(
        r.warnings(),
        [DatasetWarning::OverrideTableUnusable { .. }]
    ));
}

#[test]
fn corrupt_override_does_not_affect_unrelated_failures() {
    let overlay = tempfile::tempdir().expect("tempdir");
    write_index(overlay.path(), "[[[");
    let v = Validator::with_override(overlay.path()).expect("validator");
    let r = v.validate("140123");
    assert_eq!(r.error_kind(), ErrorKind::Length);
    assert!(r.warnings().is_empty());
}

// ── Search bounds over a directory-backed built-in store ───────────────────

fn sparse_builtin(root: &Path) {
    write_index(
        root,
        "[198012, 199112, 199612, 200212, 200812, 201412, 201912]",
    );
    for v in [198_012, 199_112, 199_612, 200_212, 200_812, 201_412] {
        write_table(root, v, &[("140000", "山西省")]);
    }
    write_table(root, 201_912, &[("140000", "山西省"), ("140404", "上党区")]);
}

#[test]
fn code_three_revisions_after_birth_is_found() {
    let builtin = tempfile::tempdir().expect("tempdir");
    sparse_builtin(builtin.path());
    let v = directory_validator(builtin.path(), ValidatorConfig::default());
    let r = v.validate(&id("14040420050101002"));
    assert!(r.success(), "{}", r.error_message());
    assert_eq!(r.region_version(), Some(DatasetVersion::new(201_912)));
    assert_eq!(r.city(), Some("山西省"));
}

#[test]
fn code_four_revisions_after_birth_is_not_found() {
    let builtin = tempfile::tempdir().expect("tempdir");
    sparse_builtin(builtin.path());
    let v = directory_validator(builtin.path(), ValidatorConfig::default());
    let r = v.validate(&id("14040419970502003"));
    assert_eq!(r.error_kind(), ErrorKind::RegionNotFound);
}

#[test]
fn override_version_closer_to_birth_brings_code_into_bounds() {
    let builtin = tempfile::tempdir().expect("tempdir");
    let overlay = tempfile::tempdir().expect("tempdir");
    sparse_builtin(builtin.path());
    write_index(overlay.path(), "[1998]");
    write_table(
        overlay.path(),
        1998,
        &[("140000", "山西省"), ("140404", "上党区（预置）")],
    );

    let v = directory_validator(
        builtin.path(),
        ValidatorConfig {
            override_root: Some(overlay.path().to_path_buf()),
            ..ValidatorConfig::default()
        },
    );
    let r = v.validate(&id("14040419970502003"));
    assert_eq!(r.error_kind(), ErrorKind::Success, "{}", r.error_message());
    assert_eq!(r.county(), Some("上党区（预置）"));
    assert_eq!(r.region_version(), Some(DatasetVersion::new(1998)));
}

#[test]
fn override_version_matching_builtin_month_is_merged() {
    let builtin = tempfile::tempdir().expect("tempdir");
    let overlay = tempfile::tempdir().expect("tempdir");
    sparse_builtin(builtin.path());
    write_index(overlay.path(), "[199612]");
    write_table(overlay.path(), 199_612, &[("140404", "上党区（预置）")]);

    let v = directory_validator(
        builtin.path(),
        ValidatorConfig {
            override_root: Some(overlay.path().to_path_buf()),
            ..ValidatorConfig::default()
        },
    );
    let r = v.validate(&id("14040419970502003"));
    assert!(r.success(), "{}", r.error_message());
    // Province row comes from the built-in 199612 table.
    assert_eq!(r.province(), Some("山西省"));
    assert_eq!(r.region_version(), Some(DatasetVersion::new(199_612)));
}

#[test]
fn versions_reflect_override_edits() {
    let builtin = tempfile::tempdir().expect("tempdir");
    let overlay = tempfile::tempdir().expect("tempdir");
    sparse_builtin(builtin.path());
    let v = directory_validator(
        builtin.path(),
        ValidatorConfig {
            override_root: Some(overlay.path().to_path_buf()),
            ..ValidatorConfig::default()
        },
    );
    assert_eq!(v.versions().versions.len(), 7);

    write_index(overlay.path(), "[2021]");
    let listing = v.versions();
    assert_eq!(listing.versions.len(), 8);
    assert!(
        listing
            .versions
            .iter()
            .any(|l| l.origin == StoreOrigin::Override && l.effective_month == 202_100)
    );
}
