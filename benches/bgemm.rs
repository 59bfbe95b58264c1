//! Binary GEMM benchmarks.
//!
//! Compares the naive triple loop, the blocked kernel and the rayon-parallel driver across
//! problem sizes typical of binary convolution layers (im2col rows × output channels × depth).
//!
//! # Usage:
//! ```bash
//! cargo bench --bench bgemm
//!
//! # One group only
//! cargo bench --bench bgemm -- bgemm_256x256x32
//!
//! # Force the portable micro-kernel
//! BGEMM_KERNEL=portable cargo bench --bench bgemm
//! ```

use std::hint::black_box;

use bgemm::{bgemm, bgemm_naive, bgemm_with_workspace, par_bgemm, BlockConfig, Workspace};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

fn random_words(len: usize, rng: &mut StdRng) -> Vec<u64> {
    (0..len).map(|_| rng.random()).collect()
}

fn bench_bgemm_by_size(c: &mut Criterion) {
    // (m, n, k) with k in 64-bit words
    let sizes = [(64, 64, 8), (256, 256, 32), (784, 128, 18), (1024, 512, 64)];

    for (m, n, k) in sizes {
        let mut group = c.benchmark_group(format!("bgemm_{m}x{n}x{k}"));
        group.sample_size(20);
        group.throughput(Throughput::Elements((m * n * k) as u64));

        let mut rng = StdRng::seed_from_u64(42);
        let a = random_words(m * k, &mut rng);
        let b = random_words(k * n, &mut rng);
        let mut out = vec![0.0f32; m * n];

        if m * n * k <= 256 * 256 * 32 {
            group.bench_function("naive", |bench| {
                bench.iter(|| {
                    bgemm_naive(m, n, k, black_box(&a), m, black_box(&b), k, &mut out, m).unwrap();
                    black_box(&out);
                });
            });
        }

        group.bench_function("blocked", |bench| {
            bench.iter(|| {
                bgemm(m, n, k, black_box(&a), m, black_box(&b), k, &mut out, m).unwrap();
                black_box(&out);
            });
        });

        group.bench_function("parallel", |bench| {
            bench.iter(|| {
                par_bgemm(m, n, k, black_box(&a), m, black_box(&b), k, &mut out, m).unwrap();
                black_box(&out);
            });
        });

        group.finish();
    }
}

fn bench_block_sizes(c: &mut Criterion) {
    let (m, n, k) = (256, 256, 64);
    let mut rng = StdRng::seed_from_u64(7);
    let a = random_words(m * k, &mut rng);
    let b = random_words(k * n, &mut rng);
    let mut out = vec![0.0f32; m * n];
    let mut ws = Workspace::new();

    let mut group = c.benchmark_group("bgemm_block_sizes");
    group.sample_size(20);
    for (kc, mc) in [(16, 32), (32, 32), (32, 64), (64, 64), (64, 128)] {
        let config = BlockConfig::new(kc, mc).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("kc{kc}_mc{mc}")),
            &config,
            |bench, config| {
                bench.iter(|| {
                    bgemm_with_workspace(&mut ws, config, m, n, k, &a, m, &b, k, &mut out, m)
                        .unwrap();
                    black_box(&out);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_bgemm_by_size, bench_block_sizes);
criterion_main!(benches);
