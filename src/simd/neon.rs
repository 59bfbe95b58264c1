//! NEON 8×6 micro-kernel.
//!
//! A word pair fills one 128-bit register. For each column of `B`, the XOR with four rows of
//! `A` is byte-popcounted with `cnt`, and pairwise plus widening adds fold the four
//! registers into a single `uint32x4_t` holding those four rows' counts. Twelve such
//! accumulators (two per column) cover the 8×6 tile.

use std::arch::aarch64::*;

use super::traits::MicroKernel;

const MR: usize = 8;
const NR: usize = 6;

/// NEON micro-kernel. Only constructible on CPUs that report NEON.
#[derive(Debug, Clone, Copy)]
pub struct NeonKernel {
    _detected: (),
}

impl NeonKernel {
    /// Returns the kernel if the running CPU supports NEON.
    pub fn new() -> Option<Self> {
        if std::arch::is_aarch64_feature_detected!("neon") {
            Some(NeonKernel { _detected: () })
        } else {
            None
        }
    }
}

impl MicroKernel for NeonKernel {
    const MR: usize = MR;
    const NR: usize = NR;
    const NAME: &'static str = "neon";

    #[inline]
    fn compute(&self, pairs: usize, tile: &mut [f32], a_panel: &[u64], b_panel: &[u64]) {
        assert!(tile.len() >= MR * NR, "tile holds {} of {} values", tile.len(), MR * NR);
        assert!(a_panel.len() >= pairs * 2 * MR, "A panel too short");
        assert!(b_panel.len() >= pairs * 2 * NR, "B panel too short");

        // SAFETY: NEON support was checked in `new`, and the lengths were checked above.
        unsafe { kernel_8x6(pairs, tile.as_mut_ptr(), a_panel.as_ptr(), b_panel.as_ptr()) }
    }
}

/// Popcounts of `b ^ rows[i]` for four rows, reduced to one u32 lane per row.
#[inline]
#[target_feature(enable = "neon")]
unsafe fn count_rows(rows: &[uint8x16_t], b: uint8x16_t) -> uint32x4_t {
    let c0 = vcntq_u8(veorq_u8(b, rows[0]));
    let c1 = vcntq_u8(veorq_u8(b, rows[1]));
    let c2 = vcntq_u8(veorq_u8(b, rows[2]));
    let c3 = vcntq_u8(veorq_u8(b, rows[3]));

    // Two pairwise adds leave 4 bytes per row; the widening adds fold those into one u32.
    let c01 = vpaddq_u8(c0, c1);
    let c23 = vpaddq_u8(c2, c3);
    let c0123 = vpaddq_u8(c01, c23);

    vpaddlq_u16(vpaddlq_u8(c0123))
}

/// # Safety
/// The CPU must support NEON. `tile` must be valid for `MR * NR` writes, `a` for
/// `pairs * 2 * MR` reads, and `b` for `pairs * 2 * NR` reads.
#[target_feature(enable = "neon")]
unsafe fn kernel_8x6(pairs: usize, tile: *mut f32, a: *const u64, b: *const u64) {
    // acc[j][0]: column j, rows 0..4; acc[j][1]: rows 4..8.
    let mut acc = [[vdupq_n_u32(0); 2]; NR];

    for pair in 0..pairs {
        let a_pair = a.add(pair * 2 * MR).cast::<u8>();
        let b_pair = b.add(pair * 2 * NR).cast::<u8>();

        let mut rows = [vdupq_n_u8(0); MR];
        for (i, row) in rows.iter_mut().enumerate() {
            *row = vld1q_u8(a_pair.add(16 * i));
        }

        for (j, col) in acc.iter_mut().enumerate() {
            let b_reg = vld1q_u8(b_pair.add(16 * j));
            col[0] = vaddq_u32(col[0], count_rows(&rows[..4], b_reg));
            col[1] = vaddq_u32(col[1], count_rows(&rows[4..], b_reg));
        }
    }

    for (j, col) in acc.iter().enumerate() {
        vst1q_f32(tile.add(j * MR), vcvtq_f32_u32(col[0]));
        vst1q_f32(tile.add(j * MR + 4), vcvtq_f32_u32(col[1]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::Portable;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_matches_portable() {
        let Some(kernel) = NeonKernel::new() else {
            return;
        };

        let mut rng = StdRng::seed_from_u64(0x5a5a);
        for pairs in [0usize, 1, 3, 16] {
            let a: Vec<u64> = (0..pairs * 2 * MR).map(|_| rng.random()).collect();
            let b: Vec<u64> = (0..pairs * 2 * NR).map(|_| rng.random()).collect();

            let mut expected = [0.0f32; MR * NR];
            let mut actual = [f32::NAN; MR * NR];
            Portable::<MR, NR>.compute(pairs, &mut expected, &a, &b);
            kernel.compute(pairs, &mut actual, &a, &b);

            assert_eq!(actual, expected, "pairs = {pairs}");
        }
    }
}
