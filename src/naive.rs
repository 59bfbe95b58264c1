//! Reference binary GEMM.
//!
//! A direct triple loop: every `C(i, j)` gains `popcount(A(i, p) ^ B(p, j))` for each depth
//! word `p`. The blocked kernel reuses [`accumulate`] for the rows and columns that do not
//! fill a whole micro-kernel tile.

use crate::error::Result;
use crate::matrix::{operands, MatMut, MatRef};

/// Adds the Hamming sums of `a` (m × k) against `b` (k × n) into `c` (m × n).
#[inline]
pub(crate) fn accumulate(a: MatRef<'_, u64>, b: MatRef<'_, u64>, mut c: MatMut<'_, f32>) {
    debug_assert_eq!(a.rows(), c.rows());
    debug_assert_eq!(b.cols(), c.cols());
    debug_assert_eq!(a.cols(), b.rows());
    if a.cols() == 0 {
        return;
    }

    for j in 0..c.cols() {
        let b_col = b.col(j);
        for i in 0..c.rows() {
            let distance: u32 = b_col
                .iter()
                .enumerate()
                .map(|(p, &b_word)| (a.get(i, p) ^ b_word).count_ones())
                .sum();
            *c.get_mut(i, j) += distance as f32;
        }
    }
}

/// Naive binary GEMM: `C += H(A, B)` without blocking, packing, or SIMD.
///
/// Same arguments and semantics as [`crate::bgemm`]; intended as a correctness baseline and
/// for tiny problems.
///
/// # Arguments
/// * `m`, `n` - Rows and columns of `C`.
/// * `k` - Depth in 64-bit words.
/// * `a`, `lda` - `m × k` packed words, column-major, leading dimension `lda`.
/// * `b`, `ldb` - `k × n` packed words, column-major, leading dimension `ldb`.
/// * `c`, `ldc` - `m × n` output, column-major, leading dimension `ldc`.
///
/// # Errors
/// Returns [`crate::BgemmError::ShapeError`] if a slice does not cover its declared shape.
#[allow(clippy::too_many_arguments)]
pub fn bgemm_naive(
    m: usize,
    n: usize,
    k: usize,
    a: &[u64],
    lda: usize,
    b: &[u64],
    ldb: usize,
    c: &mut [f32],
    ldc: usize,
) -> Result<()> {
    let (a, b, c) = operands(m, n, k, a, lda, b, ldb, c, ldc)?;
    accumulate(a, b, c);
    Ok(())
}
