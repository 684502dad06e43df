use config::StoreConfig;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use layout::{Alarm, Mirror, SegmentId, Text, MIRROR_LEN};
use medium::{RamMedium, ERASED_BYTE};
use store::Store;
use tempfile::tempdir;

const CAPACITY: usize = 512;

fn healthy_medium() -> RamMedium {
    let mut bytes = vec![ERASED_BYTE; CAPACITY];
    bytes[..MIRROR_LEN].copy_from_slice(Mirror::with_defaults().as_bytes());
    RamMedium::from_bytes(bytes)
}

fn open_healthy_benchmark(c: &mut Criterion) {
    let config = StoreConfig::default();
    c.bench_function("open_healthy", |b| {
        b.iter_batched(
            healthy_medium,
            |medium| Store::open(medium, &config).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

fn open_blank_benchmark(c: &mut Criterion) {
    let config = StoreConfig::default();
    c.bench_function("open_blank_full_recovery", |b| {
        b.iter_batched(
            || RamMedium::new(CAPACITY),
            |medium| Store::open(medium, &config).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

fn check_benchmark(c: &mut Criterion) {
    let store = Store::open(healthy_medium(), &StoreConfig::default()).unwrap();
    c.bench_function("check_all_segments", |b| {
        b.iter(|| {
            let health = store.check();
            assert!(health.iter().all(|h| h.is_healthy()));
        });
    });
}

fn edit_commit_benchmark(c: &mut Criterion) {
    let mut store = Store::open(healthy_medium(), &StoreConfig::default()).unwrap();
    let addresses = [
        Text::new("1 First St").unwrap(),
        Text::new("2 Second Ave").unwrap(),
    ];
    let mut i = 0usize;
    c.bench_function("edit_and_commit_verified", |b| {
        b.iter(|| {
            i += 1;
            store.edit::<Alarm>().home_address = addresses[i % 2];
            store.commit().unwrap();
        });
    });
    assert!(store.mirror().is_consistent(SegmentId::Alarm));
}

fn file_commit_benchmark(c: &mut Criterion) {
    c.bench_function("file_open_and_commit_nosync", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let path = dir.path().join("bench.nvm");
                (dir, path)
            },
            |(_dir, path)| {
                let config = StoreConfig {
                    sync: false,
                    ..StoreConfig::default()
                };
                let medium = medium::FileMedium::open(&path, CAPACITY, config.sync).unwrap();
                let mut store = Store::open(medium, &config).unwrap();
                store.commit().unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    open_healthy_benchmark,
    open_blank_benchmark,
    check_benchmark,
    edit_commit_benchmark,
    file_commit_benchmark
);
criterion_main!(benches);
