//! Conversions from `ndarray` boolean matrices to the packed operand layouts.
//!
//! Bit `d % 64` of word `d / 64` holds depth element `d`. A `true` element sets its bit;
//! with ±1 encodings (see [`binarize`]) a set bit stands for -1. Trailing bits of the last
//! word are zero in both operands, so padding never adds to a Hamming sum and the signed dot
//! product over `bits` real depth elements is `bits - 2 * H`.

use ndarray::{Array2, ArrayView2};

use crate::matrix::at;

/// Number of 64-bit words needed to hold `bits` depth elements.
#[inline(always)]
pub fn words_for_bits(bits: usize) -> usize {
    bits.div_ceil(64)
}

/// Packs a `rows × depth` matrix into `A` layout: `rows × words_for_bits(depth)` words,
/// column-major with leading dimension `rows`.
pub fn pack_lhs(a: ArrayView2<'_, bool>) -> Vec<u64> {
    let (rows, depth) = a.dim();
    let mut packed = vec![0u64; rows * words_for_bits(depth)];

    for ((i, d), &bit) in a.indexed_iter() {
        if bit {
            packed[at(i, d / 64, rows)] |= 1u64 << (d % 64);
        }
    }
    packed
}

/// Packs a `depth × cols` matrix into `B` layout: `words_for_bits(depth) × cols` words,
/// column-major with leading dimension `words_for_bits(depth)`.
pub fn pack_rhs(b: ArrayView2<'_, bool>) -> Vec<u64> {
    let (depth, cols) = b.dim();
    let k = words_for_bits(depth);
    let mut packed = vec![0u64; k * cols];

    for ((d, j), &bit) in b.indexed_iter() {
        if bit {
            packed[at(d / 64, j, k)] |= 1u64 << (d % 64);
        }
    }
    packed
}

/// Sign binarization: `true` where the value is negative.
pub fn binarize(x: ArrayView2<'_, f32>) -> Array2<bool> {
    x.mapv(|v| v < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemm::bgemm;
    use ndarray::{array, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_words_for_bits() {
        assert_eq!(words_for_bits(0), 0);
        assert_eq!(words_for_bits(1), 1);
        assert_eq!(words_for_bits(64), 1);
        assert_eq!(words_for_bits(65), 2);
    }

    #[test]
    fn test_pack_lhs_layout() {
        // 2 rows, 66 depth bits -> 2 words per row, ld = 2.
        let mut a = Array2::from_elem((2, 66), false);
        a[[0, 0]] = true;
        a[[0, 65]] = true;
        a[[1, 63]] = true;

        let packed = pack_lhs(a.view());

        assert_eq!(packed, vec![1u64, 1 << 63, 1 << 1, 0]);
    }

    #[test]
    fn test_pack_rhs_layout() {
        let mut b = Array2::from_elem((70, 2), false);
        b[[3, 0]] = true;
        b[[64, 1]] = true;

        let packed = pack_rhs(b.view());

        assert_eq!(packed, vec![1u64 << 3, 0, 0, 1]);
    }

    #[test]
    fn test_binarize() {
        let x = array![[-1.0f32, 0.0], [2.5, -0.1]];
        assert_eq!(binarize(x.view()), array![[true, false], [false, true]]);
    }

    #[test]
    fn test_hamming_sums_give_signed_dot_products() {
        let (m, bits, n) = (5, 100, 3);
        let mut rng = StdRng::seed_from_u64(7);
        let sign = |rng: &mut StdRng| if rng.random::<bool>() { 1.0f32 } else { -1.0 };
        let x = Array2::from_shape_fn((m, bits), |_| sign(&mut rng));
        let w = Array2::from_shape_fn((bits, n), |_| sign(&mut rng));

        let a = pack_lhs(binarize(x.view()).view());
        let b = pack_rhs(binarize(w.view()).view());
        let k = words_for_bits(bits);
        let mut c = vec![0.0f32; m * n];
        bgemm(m, n, k, &a, m, &b, k, &mut c, m).unwrap();

        let expected = x.dot(&w);
        for j in 0..n {
            for i in 0..m {
                let dot = bits as f32 - 2.0 * c[at(i, j, m)];
                assert_eq!(dot, expected[[i, j]], "({i}, {j})");
            }
        }
    }
}
