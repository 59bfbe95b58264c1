//! Panel packing for the binary micro-kernels.
//!
//! Both operands are packed in word pairs: the micro-kernels read 128 bits (two depth
//! words) per row of `A` and per column of `B` at a time, so the packed panels place
//! words `2p` and `2p + 1` of every row (or column) next to each other and only then move
//! on to the next pair.
//!
//! For a panel of `MR` rows of `A` and depth `kc`, the layout is:
//! ```text
//! // pair 0: [ A(0,0), A(0,1), A(1,0), A(1,1), ..., A(MR-1,0), A(MR-1,1) ]
//! // pair 1: [ A(0,2), A(0,3), A(1,2), A(1,3), ..., A(MR-1,2), A(MR-1,3) ]
//! // ...
//! ```
//! The `B` panel is the same with columns of `B` in place of rows of `A`.

use crate::matrix::{MatMut, MatRef};

/// Packs the top `mr` rows and `kc` depth words of `a` into `dst`.
///
/// `a` is a view starting at the panel's first row and depth word; `dst` must hold at
/// least `mr * kc` words.
#[inline(always)]
pub fn pack_a(a: &MatRef<'_, u64>, kc: usize, mr: usize, dst: &mut [u64]) {
    debug_assert!(kc % 2 == 0, "kc ({kc}) must be even");
    debug_assert!(a.rows() >= mr && a.cols() >= kc);

    for (q, block) in dst[..mr * kc].chunks_exact_mut(2 * mr).enumerate() {
        let p = 2 * q;
        for (i, pair) in block.chunks_exact_mut(2).enumerate() {
            pair[0] = a.get(i, p);
            pair[1] = a.get(i, p + 1);
        }
    }
}

/// Packs the left `nr` columns and top `kc` depth words of `b` into `dst`.
///
/// `b` is a view starting at the panel's first depth word and column; `dst` must hold at
/// least `nr * kc` words. Columns of `B` are contiguous, so each pair is a straight copy.
#[inline(always)]
pub fn pack_b(b: &MatRef<'_, u64>, kc: usize, nr: usize, dst: &mut [u64]) {
    debug_assert!(kc % 2 == 0, "kc ({kc}) must be even");
    debug_assert!(b.rows() >= kc && b.cols() >= nr);

    for (q, block) in dst[..nr * kc].chunks_exact_mut(2 * nr).enumerate() {
        let p = 2 * q;
        for (j, pair) in block.chunks_exact_mut(2).enumerate() {
            pair.copy_from_slice(&b.col(j)[p..p + 2]);
        }
    }
}

/// Adds an `mr × nr` column-major tile into `c` at `(row, col)`.
#[inline(always)]
pub fn unpack_c(
    tile: &[f32],
    mr: usize,
    nr: usize,
    c: &mut MatMut<'_, f32>,
    row: usize,
    col: usize,
) {
    for (j, tile_col) in tile[..mr * nr].chunks_exact(mr).enumerate() {
        for (i, &value) in tile_col.iter().enumerate() {
            *c.get_mut(row + i, col + j) += value;
        }
    }
}
