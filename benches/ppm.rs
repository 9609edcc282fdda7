//! Benchmarks for PPM model throughput.
//!
//! Run with: `cargo bench`
//! Compare with baseline: `cargo bench -- --save-baseline main`
//! Compare against baseline: `cargo bench -- --baseline main`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ppm_model::{compress, decompress, ContextSearch, PpmConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Roughly English text built from a fixed word list.
fn text_corpus(len: usize) -> Vec<u8> {
    const WORDS: &[&str] = &[
        "the", "model", "predicts", "next", "byte", "from", "context", "and", "escapes", "to",
        "a", "shorter", "one", "when", "it", "has", "never", "seen", "this", "symbol", "before",
    ];
    let mut rng = StdRng::seed_from_u64(1);
    let mut out = Vec::with_capacity(len + 16);
    while out.len() < len {
        out.extend_from_slice(WORDS[rng.gen_range(0..WORDS.len())].as_bytes());
        out.push(if rng.gen_range(0..12) == 0 { b'.' } else { b' ' });
    }
    out.truncate(len);
    out
}

fn random_corpus(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(2);
    (0..len).map(|_| rng.gen()).collect()
}

/// Benchmark compression across context orders
fn bench_compress(c: &mut Criterion) {
    let data = text_corpus(64 * 1024);

    let mut group = c.benchmark_group("compress");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for order in [2, 4, 8] {
        for search in [ContextSearch::Binary, ContextSearch::LongestFirst] {
            let config = PpmConfig {
                max_context_length: order,
                search,
            };
            group.bench_with_input(
                BenchmarkId::new(format!("{search:?}"), order),
                &config,
                |b, config| b.iter(|| compress(black_box(&data), config)),
            );
        }
    }

    group.finish();
}

/// Benchmark decompression of text and incompressible input
fn bench_decompress(c: &mut Criterion) {
    let config = PpmConfig::default();

    let mut group = c.benchmark_group("decompress");
    for (name, data) in [
        ("text", text_corpus(64 * 1024)),
        ("random", random_corpus(64 * 1024)),
    ] {
        let frame = compress(&data, &config).expect("Failed to compress");
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let result = decompress(black_box(&frame));
                black_box(result)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
