//! Blocked binary GEMM.
//!
//! The driver walks the depth dimension in blocks of `kc` words and, inside each depth block,
//! the rows of `A` in blocks of `mc`. Every `(row block, depth block)` pair goes through the
//! inner kernel, which packs panels, runs the micro-kernel over every full `MR × NR` tile and
//! hands the leftover rows and columns to the naive kernel.
//!
//! ```text
//! for q in (0..k).step_by(kc)            // depth blocks
//!   for i in (0..m).step_by(mc)          // row blocks, B panels packed when i == 0
//!     for j in (0..n).step_by(NR)        // column panels of B
//!       for ii in (0..mc).step_by(MR)    // row panels of A, packed when j == 0
//!         micro-kernel -> tile -> C
//! ```

use std::cell::RefCell;

use rayon::prelude::*;

use crate::config::{BlockConfig, NR, PACK_CAPACITY};
use crate::dispatch::Kernel;
use crate::error::Result;
use crate::matrix::{operands, MatMut, MatRef};
use crate::naive::accumulate;
use crate::panels::{pack_a, pack_b, unpack_c};
use crate::simd::MicroKernel;
use crate::workspace::{Buffers, Workspace};

thread_local! {
    static WORKSPACE: RefCell<Workspace> = RefCell::new(Workspace::new());
}

/// Accumulates one `(row block × all columns × depth block)` region into `c`.
///
/// `a` is `mb × kb`, `b` is `kb × n` and `c` is `mb × n`. When `first_time` is false the `B`
/// panels packed by the previous call on `ws` (same depth block, same columns) are reused.
///
/// # Panics
/// Panics if `kb` is odd or if an `MR`- or `NR`-wide panel of depth `kb` would exceed
/// [`PACK_CAPACITY`].
pub(crate) fn inner_kernel<K: MicroKernel>(
    kernel: &K,
    ws: &mut Workspace,
    a: MatRef<'_, u64>,
    b: MatRef<'_, u64>,
    mut c: MatMut<'_, f32>,
    first_time: bool,
) {
    let (m, n, k) = (c.rows(), c.cols(), a.cols());
    let (mr, nr) = (K::MR, K::NR);

    assert!(k % 2 == 0, "k-block must be even, got {k}");
    assert!(
        k * mr <= PACK_CAPACITY && k * nr <= PACK_CAPACITY,
        "k-block of {k} words exceeds the packed panel capacity of {PACK_CAPACITY} words"
    );

    let m_tiles = m / mr * mr;
    let n_tiles = n / nr * nr;

    let Buffers {
        packed_a,
        packed_b,
        tile,
    } = ws.buffers(m_tiles * k, n_tiles * k, mr * nr);

    for j in (0..n_tiles).step_by(nr) {
        let b_panel = &mut packed_b[j * k..(j + nr) * k];
        if first_time {
            pack_b(&b.submatrix(0, j, k, nr), k, nr, b_panel);
        }

        for i in (0..m_tiles).step_by(mr) {
            let a_panel = &mut packed_a[i * k..(i + mr) * k];
            if j == 0 {
                pack_a(&a.submatrix(i, 0, mr, k), k, mr, a_panel);
            }

            tile.fill(0.0);
            kernel.compute(k / 2, tile, a_panel, b_panel);
            unpack_c(tile, mr, nr, &mut c, i, j);
        }
    }

    // Bottom rows across the tiled columns.
    accumulate(
        a.submatrix(m_tiles, 0, m - m_tiles, k),
        b.submatrix(0, 0, k, n_tiles),
        c.submatrix_mut(m_tiles, 0, m - m_tiles, n_tiles),
    );
    // Right columns across the tiled rows.
    accumulate(
        a.submatrix(0, 0, m_tiles, k),
        b.submatrix(0, n_tiles, k, n - n_tiles),
        c.submatrix_mut(0, n_tiles, m_tiles, n - n_tiles),
    );
    // Corner.
    accumulate(
        a.submatrix(m_tiles, 0, m - m_tiles, k),
        b.submatrix(0, n_tiles, k, n - n_tiles),
        c.submatrix_mut(m_tiles, n_tiles, m - m_tiles, n - n_tiles),
    );
}

/// Blocking driver: splits depth by `kc` and rows by `mc`.
///
/// An odd final depth block runs its even prefix through the inner kernel and its last word
/// through the naive kernel.
pub(crate) fn blocked<K: MicroKernel>(
    kernel: &K,
    ws: &mut Workspace,
    config: &BlockConfig,
    a: MatRef<'_, u64>,
    b: MatRef<'_, u64>,
    mut c: MatMut<'_, f32>,
) {
    let (m, n, k) = (c.rows(), c.cols(), a.cols());
    if m == 0 || n == 0 || k == 0 {
        return;
    }

    let (kc, mc) = (config.kc(), config.mc());
    for q in (0..k).step_by(kc) {
        let qb = kc.min(k - q);
        let even = qb & !1;

        if even > 0 {
            for i in (0..m).step_by(mc) {
                let ib = mc.min(m - i);
                inner_kernel(
                    kernel,
                    ws,
                    a.submatrix(i, q, ib, even),
                    b.submatrix(q, 0, even, n),
                    c.submatrix_mut(i, 0, ib, n),
                    i == 0,
                );
            }
        }

        if qb > even {
            let p = q + even;
            accumulate(a.submatrix(0, p, m, 1), b.submatrix(p, 0, 1, n), c.rb_mut());
        }
    }
}

/// Runs the blocked product with the micro-kernel behind `kernel`.
pub(crate) fn drive(
    kernel: Kernel,
    ws: &mut Workspace,
    config: &BlockConfig,
    a: MatRef<'_, u64>,
    b: MatRef<'_, u64>,
    c: MatMut<'_, f32>,
) {
    match kernel {
        Kernel::Portable(k) => blocked(&k, ws, config, a, b, c),
        #[cfg(target_arch = "x86_64")]
        Kernel::Avx2(k) => blocked(&k, ws, config, a, b, c),
        #[cfg(target_arch = "aarch64")]
        Kernel::Neon(k) => blocked(&k, ws, config, a, b, c),
    }
}

/// Binary GEMM: `C += H(A, B)`.
///
/// `A` is `m × k` and `B` is `k × n`, both packed 64 bits per word and stored column-major
/// with leading dimensions `lda` and `ldb`; `k` counts words. `C` is `m × n` column-major with
/// leading dimension `ldc`. Each `C(i, j)` gains `Σ popcount(A(i, p) ^ B(p, j))`; entries
/// outside the `m × n` region (column padding) are never touched.
///
/// Uses a thread-local [`Workspace`] and the micro-kernel picked by
/// [`Kernel::selected`].
///
/// # Errors
/// Returns [`crate::BgemmError::ShapeError`] if a leading dimension is smaller than its row
/// count or a slice is too short for its shape. `C` is left untouched in that case.
///
/// # Examples
/// ```rust
/// use bgemm::bgemm;
///
/// // One row of A and one column of B, a single word each.
/// let a = [0b1010u64];
/// let b = [0b0110u64];
/// let mut c = [0.0f32];
/// bgemm(1, 1, 1, &a, 1, &b, 1, &mut c, 1).unwrap();
/// assert_eq!(c[0], 2.0);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn bgemm(
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
    let kernel = Kernel::selected();
    log::trace!("bgemm m={m} n={n} k={k} kernel={}", kernel.name());

    WORKSPACE.with(|ws| {
        let mut ws = ws.borrow_mut();
        drive(kernel, &mut ws, &BlockConfig::default(), a, b, c);
    });
    Ok(())
}

/// [`bgemm`] with a caller-owned workspace and explicit block sizes.
///
/// Reusing one workspace across calls avoids reallocating the packed panels.
///
/// # Errors
/// Same as [`bgemm`].
#[allow(clippy::too_many_arguments)]
pub fn bgemm_with_workspace(
    ws: &mut Workspace,
    config: &BlockConfig,
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
    let kernel = Kernel::selected();
    log::trace!(
        "bgemm m={m} n={n} k={k} kc={} mc={} kernel={}",
        config.kc(),
        config.mc(),
        kernel.name()
    );

    drive(kernel, ws, config, a, b, c);
    Ok(())
}

/// Columns of `C` handed to each parallel task: an even share per thread, rounded up to a
/// whole number of `NR`-wide panels.
fn par_chunk_cols(n: usize) -> usize {
    let share = n.div_ceil(rayon::current_num_threads().max(1));
    share.div_ceil(NR).max(1) * NR
}

/// Parallel [`bgemm`] on the rayon thread pool.
///
/// `C` is split into column ranges, each computed by one task with its own workspace. Every
/// element of `C` belongs to exactly one range, so the result is identical to [`bgemm`].
///
/// # Errors
/// Same as [`bgemm`].
#[allow(clippy::too_many_arguments)]
pub fn par_bgemm(
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
    if m == 0 || n == 0 || k == 0 {
        return Ok(());
    }

    let kernel = Kernel::selected();
    let config = BlockConfig::default();
    let chunk_cols = par_chunk_cols(n);
    log::trace!(
        "par_bgemm m={m} n={n} k={k} chunk_cols={chunk_cols} kernel={}",
        kernel.name()
    );

    c.into_col_chunks(chunk_cols)
        .into_par_iter()
        .enumerate()
        .for_each_init(Workspace::new, |ws, (idx, c_chunk)| {
            let b_chunk = b.submatrix(0, idx * chunk_cols, k, c_chunk.cols());
            drive(kernel, ws, &config, a, b_chunk, c_chunk);
        });

    Ok(())
}
