//! NTT (Number Theoretic Transform) Benchmarks
//!
//! Measures the reference transforms, twiddle-table generation and the
//! primitive-root scan on the 32-bit preset modulus.
//!
//! Run with: `cargo bench --bench ntt_benchmark`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ntt::field::mod_pow;
use ntt::params::{find_primitive_root, NttParameters, DEFAULT_PRESET};
use ntt::transform::bit_reverse_permute;
use ntt::twiddle::TwiddleTables;
use ntt::vectors::random_sequence;
use num_bigint::BigUint;

/// Preset modulus with the 2048-th root lowered to a 2d-th root.
fn params_for(d: usize, lanes: usize) -> NttParameters {
    let q = BigUint::from(DEFAULT_PRESET.q);
    let psi = mod_pow(
        &BigUint::from(DEFAULT_PRESET.psi),
        (DEFAULT_PRESET.n / d) as u64,
        &q,
    );
    NttParameters::from_modulus_and_root(d, DEFAULT_PRESET.bit_length, lanes, q, psi).unwrap()
}

// ============================================================================
// Transforms
// ============================================================================

fn bench_ntt_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("ntt_transform");

    for d in [64, 256, 1024] {
        let mut rng = rand::rng();
        let params = params_for(d, 8);
        let engine = params.engine();
        let a = random_sequence(d, &params.q, &mut rng);

        group.bench_with_input(BenchmarkId::new("forward", d), &a, |bench, a| {
            bench.iter(|| engine.forward(a).unwrap());
        });

        let a_rev = bit_reverse_permute(&engine.forward(&a).unwrap()).unwrap();
        group.bench_with_input(BenchmarkId::new("inverse", d), &a_rev, |bench, a_rev| {
            bench.iter(|| engine.inverse(a_rev).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("bit_reverse", d), &a, |bench, a| {
            bench.iter(|| bit_reverse_permute(a).unwrap());
        });
    }

    group.finish();
}

// ============================================================================
// Parameter Derivation
// ============================================================================

fn bench_twiddle_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("twiddle_tables");

    for lanes in [1, 8, 64] {
        let params = params_for(1024, lanes);
        group.bench_with_input(BenchmarkId::new("generate_1024", lanes), &params, |bench, params| {
            bench.iter(|| TwiddleTables::from_parameters(params).unwrap());
        });
    }

    group.finish();
}

fn bench_root_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("root_search");
    group.sample_size(10);

    // 40961 = 20 · 2048 + 1
    let q = BigUint::from(40961u32);
    group.bench_function("q40961_n1024", |bench| {
        bench.iter(|| find_primitive_root(1024, &q, None).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_ntt_transform, bench_twiddle_tables, bench_root_search);
criterion_main!(benches);
