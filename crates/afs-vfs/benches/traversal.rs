//! Benchmarks for path traversal.
//!
//! Measures lookups through deep directory chains and append throughput
//! on a single sequence.
//!
//! # Run Benchmarks
//!
//! ```bash
//! cargo bench --bench traversal
//! ```

use afs_vfs::{AFile, AFileSystem, Directory, SlotSequence};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tokio::runtime::Runtime;

fn nested(depth: usize) -> (Directory, String) {
    let mut directory = Directory::new().with_files("leaf", SlotSequence::file("leaf", "data"));
    let mut path = String::from("/leaf");
    for level in (0..depth).rev() {
        let name = format!("d{level}");
        path = format!("/{name}{path}");
        directory = Directory::new().with_dir(name, directory);
    }
    (directory, path)
}

/// Lookup cost as the path gets deeper.
fn bench_find_by_depth(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let mut group = c.benchmark_group("find_by_depth");

    for depth in [1, 4, 16, 64] {
        let (root, path) = nested(depth);
        let fs = AFileSystem::new(root);

        group.bench_with_input(BenchmarkId::from_parameter(depth), &path, |b, path| {
            b.iter(|| {
                runtime.block_on(async {
                    let found = fs.find(black_box(path)).await.unwrap();
                    black_box(found.is_found())
                })
            });
        });
    }

    group.finish();
}

/// Version resolution within a long sequence.
fn bench_find_versions(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let files = (0..1_000).map(|i| AFile::new("seq", format!("v{i}")).into_ref());
    let fs = AFileSystem::new(Directory::new().with_files("seq", SlotSequence::from_files(files)));

    let mut group = c.benchmark_group("find_versions");
    for path in ["/seq@1", "/seq@-500", "/seq@latest", "/seq@missing"] {
        group.bench_with_input(BenchmarkId::from_parameter(path), &path, |b, path| {
            b.iter(|| runtime.block_on(async { black_box(fs.find(path).await.unwrap()) }));
        });
    }
    group.finish();
}

/// Appending new versions, including notification.
fn bench_append(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let fs = AFileSystem::new(Directory::new());
    let file = AFile::new("log", "entry").into_ref();

    c.bench_function("append", |b| {
        b.iter(|| {
            runtime.block_on(async {
                black_box(fs.add("/logs/app/log", file.clone()).await.unwrap());
            });
        });
    });
}

criterion_group!(benches, bench_find_by_depth, bench_find_versions, bench_append);
criterion_main!(benches);
