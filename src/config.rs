//! Tile and cache blocking parameters.
//!
//! The tile shape is fixed by the micro-kernels' register layout. The depth (`KC`) and row
//! (`MC`) block sizes are generated by `build.rs` and can be overridden at build time through
//! the `BGEMM_KC` and `BGEMM_MC` environment variables. [`BlockConfig`] carries the same two
//! values at runtime so callers can tune them per call.

use crate::error::{config_error, Result};

include!(concat!(env!("OUT_DIR"), "/config.rs"));

/// Micro-kernel row dimension: rows of `A` (and `C`) per output tile.
pub const MR: usize = 8;

/// Micro-kernel column dimension: columns of `B` (and `C`) per output tile.
pub const NR: usize = 6;

/// Words a single packed panel may hold. Bounds `kc * MR` and `kc * NR`.
pub const PACK_CAPACITY: usize = 128_000;

/// Cache blocking parameters for the blocking driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockConfig {
    kc: usize,
    mc: usize,
}

impl BlockConfig {
    /// Creates a validated block configuration.
    ///
    /// `kc` is measured in 64-bit words and must be even (the micro-kernels consume words in
    /// pairs), non-zero, and small enough that an `MR`-row panel fits in [`PACK_CAPACITY`].
    /// `mc` must be non-zero.
    pub fn new(kc: usize, mc: usize) -> Result<Self> {
        if kc == 0 {
            return Err(config_error(kc, mc, "kc must be non-zero"));
        }
        if kc % 2 != 0 {
            return Err(config_error(kc, mc, "kc must be an even number of words"));
        }
        if kc * MR.max(NR) > PACK_CAPACITY {
            return Err(config_error(
                kc,
                mc,
                format!("kc overflows the packed panel capacity of {PACK_CAPACITY} words"),
            ));
        }
        if mc == 0 {
            return Err(config_error(kc, mc, "mc must be non-zero"));
        }

        Ok(BlockConfig { kc, mc })
    }

    /// Depth block size in words.
    #[inline(always)]
    pub fn kc(&self) -> usize {
        self.kc
    }

    /// Row block size.
    #[inline(always)]
    pub fn mc(&self) -> usize {
        self.mc
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        BlockConfig { kc: KC, mc: MC }
    }
}
