// ─────────────────────────────────────────────────────────────────────────────
// aarch64 Detection
// ─────────────────────────────────────────────────────────────────────────────

use super::compile_time::{caps_static, saved_static};
use crate::{caps::Arch, probe::HostProbe};

pub(super) fn detect() -> HostProbe {
  #[cfg(feature = "std")]
  let cpu = caps_static().union(runtime());
  #[cfg(not(feature = "std"))]
  let cpu = caps_static();

  // FP/SIMD state is part of the base AArch64 context switch.
  HostProbe::from_parts(Arch::Aarch64, cpu, saved_static())
}

#[cfg(feature = "std")]
fn runtime() -> crate::caps::Caps {
  use crate::caps::{Caps, aarch64};

  let mut caps = Caps::NONE;
  if std::arch::is_aarch64_feature_detected!("neon") {
    caps |= aarch64::NEON;
  }
  if std::arch::is_aarch64_feature_detected!("dotprod") {
    caps |= aarch64::DOTPROD;
  }
  caps
}

#[cfg(all(test, not(miri)))]
mod tests {
  use super::*;
  use crate::{Tier, probe::Probe};

  #[test]
  fn test_neon_baseline() {
    let probe = detect();
    assert!(probe.supported_by_cpu(Tier::Neon));
    assert!(probe.supported_by_os(Tier::Neon));
    assert!(!probe.supported_by_cpu(Tier::Sse2));
  }
}
