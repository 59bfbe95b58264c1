//! Scalar micro-kernel built on `u64::count_ones`.
//!
//! Works for any tile shape. On targets with a hardware popcount the compiler lowers
//! `count_ones` to a single instruction, so this is also a reasonable fallback in practice.

use super::traits::MicroKernel;

/// Portable `P × R` micro-kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Portable<const P: usize, const R: usize>;

impl<const P: usize, const R: usize> MicroKernel for Portable<P, R> {
    const MR: usize = P;
    const NR: usize = R;
    const NAME: &'static str = "portable";

    #[inline]
    fn compute(&self, pairs: usize, tile: &mut [f32], a_panel: &[u64], b_panel: &[u64]) {
        assert!(tile.len() >= P * R, "tile holds {} of {} values", tile.len(), P * R);
        assert!(a_panel.len() >= pairs * 2 * P, "A panel too short");
        assert!(b_panel.len() >= pairs * 2 * R, "B panel too short");

        let mut acc = [[0u32; P]; R];

        let a_pairs = a_panel[..pairs * 2 * P].chunks_exact(2 * P);
        let b_pairs = b_panel[..pairs * 2 * R].chunks_exact(2 * R);
        for (a, b) in a_pairs.zip(b_pairs) {
            for (j, col) in acc.iter_mut().enumerate() {
                let (b0, b1) = (b[2 * j], b[2 * j + 1]);
                for (i, count) in col.iter_mut().enumerate() {
                    *count += (a[2 * i] ^ b0).count_ones() + (a[2 * i + 1] ^ b1).count_ones();
                }
            }
        }

        for (tile_col, col) in tile.chunks_exact_mut(P).zip(acc.iter()) {
            for (value, &count) in tile_col.iter_mut().zip(col.iter()) {
                *value = count as f32;
            }
        }
    }
}
