//! Runtime selection of the micro-kernel.
//!
//! The best kernel the CPU supports is detected once per process. Setting `BGEMM_KERNEL` to
//! `portable`, `avx2` or `neon` before the first call forces a specific kernel; a request the
//! CPU cannot honor falls back to detection with a warning.

use std::env;
use std::sync::OnceLock;

use crate::config::{MR, NR};
#[cfg(target_arch = "x86_64")]
use crate::simd::Avx2Kernel;
#[cfg(target_arch = "aarch64")]
use crate::simd::NeonKernel;
use crate::simd::{MicroKernel, Portable};

/// Environment variable that overrides kernel detection.
pub const KERNEL_ENV: &str = "BGEMM_KERNEL";

static SELECTED: OnceLock<Kernel> = OnceLock::new();

/// A micro-kernel the current process can run.
#[derive(Debug, Clone, Copy)]
pub enum Kernel {
    Portable(Portable<MR, NR>),
    #[cfg(target_arch = "x86_64")]
    Avx2(Avx2Kernel),
    #[cfg(target_arch = "aarch64")]
    Neon(NeonKernel),
}

impl Kernel {
    /// The kernel selected for this process.
    pub fn selected() -> Kernel {
        *SELECTED.get_or_init(|| {
            let kernel = select();
            log::debug!("bgemm micro-kernel: {}", kernel.name());
            kernel
        })
    }

    /// Every kernel the running CPU supports, portable first.
    pub fn available() -> Vec<Kernel> {
        let mut kernels = vec![Kernel::Portable(Portable)];
        #[cfg(target_arch = "x86_64")]
        {
            if let Some(k) = Avx2Kernel::new() {
                kernels.push(Kernel::Avx2(k));
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if let Some(k) = NeonKernel::new() {
                kernels.push(Kernel::Neon(k));
            }
        }
        kernels
    }

    /// Short name of the kernel, the same string `BGEMM_KERNEL` accepts.
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Portable(_) => <Portable<MR, NR> as MicroKernel>::NAME,
            #[cfg(target_arch = "x86_64")]
            Kernel::Avx2(_) => Avx2Kernel::NAME,
            #[cfg(target_arch = "aarch64")]
            Kernel::Neon(_) => NeonKernel::NAME,
        }
    }

    /// Looks a kernel up by name among the available ones.
    pub fn by_name(name: &str) -> Option<Kernel> {
        let name = name.trim();
        Kernel::available()
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }
}

fn detect() -> Kernel {
    #[cfg(target_arch = "x86_64")]
    {
        if let Some(k) = Avx2Kernel::new() {
            return Kernel::Avx2(k);
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        if let Some(k) = NeonKernel::new() {
            return Kernel::Neon(k);
        }
    }
    Kernel::Portable(Portable)
}

fn select() -> Kernel {
    match env::var(KERNEL_ENV) {
        Ok(requested) => match Kernel::by_name(&requested) {
            Some(kernel) => kernel,
            None => {
                log::warn!("{KERNEL_ENV}={requested:?} is unavailable here, detecting instead");
                detect()
            }
        },
        Err(_) => detect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portable_always_available() {
        let kernels = Kernel::available();
        assert_eq!(kernels[0].name(), "portable");
    }

    #[test]
    fn test_by_name() {
        assert!(matches!(Kernel::by_name("Portable"), Some(Kernel::Portable(_))));
        assert!(Kernel::by_name("avx512").is_none());
    }

    #[test]
    fn test_every_name_finds_its_kernel() {
        for kernel in Kernel::available() {
            let found = Kernel::by_name(kernel.name()).unwrap();
            assert_eq!(found.name(), kernel.name());
        }
    }

    #[test]
    fn test_selected_is_available_and_stable() {
        let first = Kernel::selected();
        let names: Vec<_> = Kernel::available().iter().map(Kernel::name).collect();
        assert!(names.contains(&first.name()));
        assert_eq!(Kernel::selected().name(), first.name());
    }
}
