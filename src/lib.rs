//! Binary matrix multiplication on bit-packed operands.
//!
//! `bgemm` computes `C += H(A, B)` where `A` (m × k) and `B` (k × n) hold 64 binary
//! values per `u64` word and `H(i, j)` is the Hamming distance between row `i` of `A`
//! and column `j` of `B`, i.e. `Σ popcount(A(i, p) ^ B(p, j))` over the `k` depth words.
//! All matrices are column-major with explicit leading dimensions and `C` is `f32`.
//!
//! The product follows the BLIS structure: a blocking driver splits the depth and row
//! dimensions into cache-sized blocks, panels of `A` and `B` are packed into the layout
//! the micro-kernel streams through, and an 8×6 micro-kernel (AVX2, NEON, or portable)
//! produces one output tile at a time. Rows and columns that do not fill a whole tile go
//! through the naive kernel.
//!
//! Values written into `C` are raw Hamming sums. For ±1 encodings, the signed dot product
//! is `k * 64 - 2 * C(i, j)`; that conversion is left to the caller.
//!
//! ```rust
//! use bgemm::bgemm;
//!
//! // 2×2 result, depth of two words (128 bits).
//! let a = vec![0u64; 2 * 2];
//! let b = vec![u64::MAX; 2 * 2];
//! let mut c = vec![0.0f32; 2 * 2];
//!
//! bgemm(2, 2, 2, &a, 2, &b, 2, &mut c, 2).unwrap();
//! assert!(c.iter().all(|&x| x == 128.0));
//! ```

pub mod bitpack;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gemm;
pub mod matrix;
pub mod naive;
pub mod panels;
pub mod simd;
pub mod workspace;

pub use config::{BlockConfig, KC, MC, PACK_CAPACITY};
pub use error::{BgemmError, Result};
pub use gemm::{bgemm, bgemm_with_workspace, par_bgemm};
pub use matrix::{MatMut, MatRef};
pub use naive::bgemm_naive;
pub use workspace::Workspace;
