use std::time::Instant;

use bgemm::bitpack::{binarize, pack_lhs, pack_rhs, words_for_bits};
use bgemm::dispatch::Kernel;
use bgemm::matrix::at;
use bgemm::{bgemm, bgemm_naive, par_bgemm};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Random column-major words with ld == rows
fn random_words(rows: usize, cols: usize, rng: &mut StdRng) -> Vec<u64> {
    (0..rows * cols).map(|_| rng.random()).collect()
}

fn max_abs_diff(v1: &[f32], v2: &[f32]) -> f32 {
    v1.iter()
        .zip(v2.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f32::max)
}

fn timed(name: &str, f: impl FnOnce() -> bgemm::Result<()>) {
    let start = Instant::now();
    match f() {
        Ok(()) => println!("  {name:>8}: {:?}", start.elapsed()),
        Err(e) => eprintln!("  {name:>8}: FAILURE: {e}"),
    }
}

fn run_case(m: usize, n: usize, k: usize, rng: &mut StdRng) {
    println!("\n--- bgemm {m}x{n}, k = {k} words ({} bits) ---", k * 64);

    let a = random_words(m, k, rng);
    let b = random_words(k, n, rng);
    let mut c_naive = vec![0.0f32; m * n];
    let mut c_blocked = vec![0.0f32; m * n];
    let mut c_par = vec![0.0f32; m * n];

    timed("naive", || bgemm_naive(m, n, k, &a, m, &b, k, &mut c_naive, m));
    timed("blocked", || bgemm(m, n, k, &a, m, &b, k, &mut c_blocked, m));
    timed("parallel", || par_bgemm(m, n, k, &a, m, &b, k, &mut c_par, m));

    let diff = max_abs_diff(&c_naive, &c_blocked).max(max_abs_diff(&c_naive, &c_par));
    if diff == 0.0 {
        println!("SUCCESS: blocked and parallel results match the naive kernel.");
    } else {
        println!("FAILURE: results differ from the naive kernel by up to {diff}.");
    }
}

// ±1 activations against ±1 weights: bits - 2 * H is the signed dot product
fn run_dot_product_case(rng: &mut StdRng) {
    let (m, bits, n) = (4, 200, 3);
    println!("\n--- signed dot products, {m}x{bits} by {bits}x{n} ---");

    let sign = |rng: &mut StdRng| if rng.random::<bool>() { 1.0f32 } else { -1.0 };
    let x = Array2::from_shape_fn((m, bits), |_| sign(rng));
    let w = Array2::from_shape_fn((bits, n), |_| sign(rng));

    let a = pack_lhs(binarize(x.view()).view());
    let b = pack_rhs(binarize(w.view()).view());
    let k = words_for_bits(bits);
    let mut c = vec![0.0f32; m * n];

    if let Err(e) = bgemm(m, n, k, &a, m, &b, k, &mut c, m) {
        eprintln!("FAILURE: bgemm returned an error: {e}");
        return;
    }

    let expected = x.dot(&w);
    let mut mismatches = 0;
    for j in 0..n {
        for i in 0..m {
            let dot = bits as f32 - 2.0 * c[at(i, j, m)];
            if dot != expected[[i, j]] {
                mismatches += 1;
            }
        }
    }
    println!("  first row of dot products: {:?}", expected.row(0).to_vec());
    if mismatches == 0 {
        println!("SUCCESS: all dot products recovered from Hamming sums.");
    } else {
        println!("FAILURE: {mismatches} dot products differ.");
    }
}

fn main() {
    println!("bgemm demo, micro-kernel: {}", Kernel::selected().name());

    let mut rng = StdRng::seed_from_u64(2024);

    run_case(2, 2, 2, &mut rng);
    // Remainders on every side of the 8x6 tile grid
    run_case(9, 7, 2, &mut rng);
    // Depth spanning several cache blocks, odd word count
    run_case(100, 64, 75, &mut rng);
    run_case(512, 512, 32, &mut rng);

    run_dot_product_case(&mut rng);
}
