//! Host detection and the process-wide capability cache.
//!
//! - Compile-time detection via `cfg!(target_feature = "...")`
//! - Runtime detection via CPUID/XGETBV on x86_64 and the OS registry on aarch64 (`std` only)
//! - Caching via `OnceLock` (`std`) or an atomic state machine (no_std)
//! - A pre-initialization override for embedders and tests
//! - Miri fallback (only [`Tier::Base`](crate::Tier::Base))

use crate::probe::HostProbe;

mod cache_override;
mod compile_time;

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(target_arch = "x86_64")]
mod x86_64;

pub use cache_override::{OverrideError, capabilities, has_override, try_set_override};
pub use compile_time::caps_static;

/// Probe the host without caching.
#[must_use]
pub(crate) fn host() -> HostProbe {
  #[cfg(miri)]
  {
    HostProbe::PORTABLE
  }

  #[cfg(all(not(miri), target_arch = "x86_64"))]
  {
    x86_64::detect()
  }

  #[cfg(all(not(miri), target_arch = "aarch64"))]
  {
    aarch64::detect()
  }

  #[cfg(all(not(miri), not(any(target_arch = "x86_64", target_arch = "aarch64"))))]
  {
    HostProbe::PORTABLE
  }
}
