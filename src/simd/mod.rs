//! Binary micro-kernels.

#[cfg(target_arch = "x86_64")]
pub mod avx2;

#[cfg(target_arch = "aarch64")]
pub mod neon;

pub mod portable;
pub mod traits;

#[cfg(target_arch = "x86_64")]
pub use avx2::Avx2Kernel;
#[cfg(target_arch = "aarch64")]
pub use neon::NeonKernel;
pub use portable::Portable;
pub use traits::MicroKernel;
