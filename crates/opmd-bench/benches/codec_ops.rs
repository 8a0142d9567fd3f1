//! Criterion micro-benchmarks for the container codec and content hash.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use opmd_bench::sample_tree;
use opmd_store::{content_hash, read_container, write_container};

/// Benchmark: encode the reference snapshot.
fn bench_encode_sample(c: &mut Criterion) {
    let tree = sample_tree(42).unwrap();

    c.bench_function("codec_encode_sample", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(128 * 1024);
            write_container(&mut buf, &tree).unwrap();
            black_box(&buf);
        });
    });
}

/// Benchmark: decode the same bytes.
fn bench_decode_sample(c: &mut Criterion) {
    let tree = sample_tree(42).unwrap();
    let mut encoded = Vec::new();
    write_container(&mut encoded, &tree).unwrap();

    c.bench_function("codec_decode_sample", |b| {
        b.iter(|| {
            let mut cursor = encoded.as_slice();
            let decoded = read_container(&mut cursor).unwrap();
            black_box(&decoded);
        });
    });
}

/// Benchmark: FNV-1a content hash of the snapshot.
fn bench_hash_sample(c: &mut Criterion) {
    let tree = sample_tree(42).unwrap();

    c.bench_function("content_hash_sample", |b| {
        b.iter(|| black_box(content_hash(&tree).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_encode_sample,
    bench_decode_sample,
    bench_hash_sample
);
criterion_main!(benches);
