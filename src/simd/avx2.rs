//! AVX2 8×6 micro-kernel.
//!
//! Each 256-bit register of `A` holds one word pair for two consecutive rows; the matching
//! word pair of a `B` column is broadcast to both 128-bit lanes. After the XOR, bytes are
//! popcounted with a nibble lookup (`vpshufb`) and summed into the four 64-bit lanes with
//! `vpsadbw`, so lanes 0+1 belong to the even row and lanes 2+3 to the odd row.

use std::arch::x86_64::*;

use super::traits::MicroKernel;

const MR: usize = 8;
const NR: usize = 6;

/// AVX2 micro-kernel. Only constructible on CPUs that support AVX2.
#[derive(Debug, Clone, Copy)]
pub struct Avx2Kernel {
    _detected: (),
}

impl Avx2Kernel {
    /// Returns the kernel if the running CPU supports AVX2.
    pub fn new() -> Option<Self> {
        if is_x86_feature_detected!("avx2") {
            Some(Avx2Kernel { _detected: () })
        } else {
            None
        }
    }
}

impl MicroKernel for Avx2Kernel {
    const MR: usize = MR;
    const NR: usize = NR;
    const NAME: &'static str = "avx2";

    #[inline]
    fn compute(&self, pairs: usize, tile: &mut [f32], a_panel: &[u64], b_panel: &[u64]) {
        assert!(tile.len() >= MR * NR, "tile holds {} of {} values", tile.len(), MR * NR);
        assert!(a_panel.len() >= pairs * 2 * MR, "A panel too short");
        assert!(b_panel.len() >= pairs * 2 * NR, "B panel too short");

        // SAFETY: AVX2 support was checked in `new`, and the lengths were checked above.
        unsafe { kernel_8x6(pairs, tile.as_mut_ptr(), a_panel.as_ptr(), b_panel.as_ptr()) }
    }
}

/// Byte popcount of a 256-bit register, summed into its four 64-bit lanes.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn popcount_lanes(x: __m256i) -> __m256i {
    let lut = _mm256_setr_epi8(
        0, 1, 1, 2, 1, 2, 2, 3, 1, 2, 2, 3, 2, 3, 3, 4, //
        0, 1, 1, 2, 1, 2, 2, 3, 1, 2, 2, 3, 2, 3, 3, 4,
    );
    let low_mask = _mm256_set1_epi8(0x0f);

    let lo = _mm256_and_si256(x, low_mask);
    let hi = _mm256_and_si256(_mm256_srli_epi16::<4>(x), low_mask);
    let bytes = _mm256_add_epi8(_mm256_shuffle_epi8(lut, lo), _mm256_shuffle_epi8(lut, hi));

    _mm256_sad_epu8(bytes, _mm256_setzero_si256())
}

/// # Safety
/// The CPU must support AVX2. `tile` must be valid for `MR * NR` writes, `a` for
/// `pairs * 2 * MR` reads, and `b` for `pairs * 2 * NR` reads.
#[target_feature(enable = "avx2")]
unsafe fn kernel_8x6(pairs: usize, tile: *mut f32, a: *const u64, b: *const u64) {
    // acc[j][r]: column j, rows 2r and 2r + 1.
    let mut acc = [[_mm256_setzero_si256(); MR / 2]; NR];

    for pair in 0..pairs {
        let a_pair = a.add(pair * 2 * MR);
        let b_pair = b.add(pair * 2 * NR);

        let a_regs = [
            _mm256_loadu_si256(a_pair.cast()),
            _mm256_loadu_si256(a_pair.add(4).cast()),
            _mm256_loadu_si256(a_pair.add(8).cast()),
            _mm256_loadu_si256(a_pair.add(12).cast()),
        ];

        for (j, col) in acc.iter_mut().enumerate() {
            let b_reg = _mm256_broadcastsi128_si256(_mm_loadu_si128(b_pair.add(2 * j).cast()));
            for (count, &a_reg) in col.iter_mut().zip(a_regs.iter()) {
                *count = _mm256_add_epi64(*count, popcount_lanes(_mm256_xor_si256(a_reg, b_reg)));
            }
        }
    }

    let mut lanes = [0u64; 4];
    for (j, col) in acc.iter().enumerate() {
        for (r, &count) in col.iter().enumerate() {
            _mm256_storeu_si256(lanes.as_mut_ptr().cast(), count);
            *tile.add(j * MR + 2 * r) = (lanes[0] + lanes[1]) as f32;
            *tile.add(j * MR + 2 * r + 1) = (lanes[2] + lanes[3]) as f32;
        }
    }
}
