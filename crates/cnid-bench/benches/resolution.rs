//! Group 2: Validation cost with and without an override directory.
//!
//! The override store is re-read on every call, so the override case
//! measures file I/O plus the table merge.
#![allow(clippy::expect_used)]

use cnid_bench::{SizeTier, generate_ids};
use cnid_core::Validator;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn override_root() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let data = dir.path().join("administrative-code-data");
    std::fs::create_dir_all(&data).expect("create data dir");
    std::fs::write(data.join("index.json"), "[1997, 2005]").expect("write index");
    std::fs::write(
        data.join("1997.json"),
        r#"{"140000":"山西省","140400":"长治市","140428":"长子县"}"#,
    )
    .expect("write 1997");
    std::fs::write(
        data.join("2005.json"),
        r#"{"110000":"北京市","110101":"东城区"}"#,
    )
    .expect("write 2005");
    dir
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    let ids = generate_ids(&SizeTier::Small.config(7));
    group.throughput(Throughput::Elements(ids.len() as u64));

    let bundled = Validator::new().expect("bundled dataset");
    group.bench_with_input(BenchmarkId::new("bundled", "S"), &ids, |b, ids| {
        b.iter(|| ids.iter().filter(|id| bundled.validate(id).success()).count());
    });

    let root = override_root();
    let overridden = Validator::with_override(root.path()).expect("validator");
    group.bench_with_input(BenchmarkId::new("override", "S"), &ids, |b, ids| {
        b.iter(|| ids.iter().filter(|id| overridden.validate(id).success()).count());
    });

    group.finish();
}

criterion_group!(benches, bench_resolution);
criterion_main!(benches);
