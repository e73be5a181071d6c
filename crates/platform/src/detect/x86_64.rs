// ─────────────────────────────────────────────────────────────────────────────
// x86_64 Detection
// ─────────────────────────────────────────────────────────────────────────────

use super::compile_time::{caps_static, saved_static};
use crate::{caps::Arch, probe::HostProbe};

pub(super) fn detect() -> HostProbe {
  #[cfg(feature = "std")]
  {
    let batch = cpuid_batch();
    let mut cpu = caps_static().union(batch.cpu);

    // Hybrid Intel parts expose AVX-512 on P-cores only. A thread migrating
    // to an E-core mid-kernel would fault, so the tier is never offered.
    if batch.hybrid {
      cpu = cpu.difference(crate::caps::x86::AVX512_ALL);
    }

    HostProbe::from_parts(Arch::X86_64, cpu, saved_static().union(batch.saved))
  }

  #[cfg(not(feature = "std"))]
  {
    HostProbe::from_parts(Arch::X86_64, caps_static(), saved_static())
  }
}

#[cfg(feature = "std")]
struct CpuidBatch {
  /// Feature bits as reported by CPUID, not gated on OS support.
  cpu: crate::caps::Caps,
  /// Register state enabled in XCR0.
  saved: crate::probe::SavedState,
  hybrid: bool,
}

/// Read the CPUID leaves and XCR0 the tiers depend on.
///
/// - Leaf 0: vendor, max leaf
/// - Leaf 1: family/model, SSE family, OSXSAVE, AVX, FMA
/// - Leaf 7.0: AVX2, BMI, AVX-512, hybrid flag
///
/// XCR0 is only read when OSXSAVE is set; without it XGETBV faults.
#[cfg(feature = "std")]
#[allow(unsafe_code)]
fn cpuid_batch() -> CpuidBatch {
  use core::arch::x86_64::{__cpuid, __cpuid_count, _xgetbv};

  use crate::{
    caps::{Caps, x86},
    probe::SavedState,
  };

  // SAFETY: CPUID is available on every x86_64 processor.
  #[allow(unused_unsafe)]
  let (cpuid0, cpuid1) = unsafe { (__cpuid(0), __cpuid(1)) };

  // "GenuineIntel" has ebx = 0x756E6547 ("Genu")
  let is_intel = cpuid0.ebx == 0x756E_6547;

  let base_family = (cpuid1.eax >> 8) & 0xF;
  let ext_family = (cpuid1.eax >> 20) & 0xFF;
  let family = base_family + ext_family;
  let base_model = (cpuid1.eax >> 4) & 0xF;
  let ext_model = (cpuid1.eax >> 16) & 0xF;
  let model = if base_family == 6 || base_family == 15 { base_model + (ext_model << 4) } else { base_model };

  let mut cpu = Caps::NONE;

  // ─── Leaf 1 ECX ───
  const LEAF1_ECX: [(u32, Caps); 8] = [
    (0, x86::SSE3),
    (9, x86::SSSE3),
    (12, x86::FMA),
    (19, x86::SSE41),
    (20, x86::SSE42),
    (23, x86::POPCNT),
    (27, x86::OSXSAVE),
    (28, x86::AVX),
  ];
  for (bit, cap) in LEAF1_ECX {
    if cpuid1.ecx & (1 << bit) != 0 {
      cpu |= cap;
    }
  }

  // ─── Leaf 7 ───
  let mut hybrid = false;
  if cpuid0.eax >= 7 {
    // SAFETY: leaf 7 is within the reported maximum leaf.
    #[allow(unused_unsafe)]
    let cpuid7 = unsafe { __cpuid_count(7, 0) };

    const LEAF7_EBX: [(u32, Caps); 7] = [
      (3, x86::BMI1),
      (5, x86::AVX2),
      (8, x86::BMI2),
      (16, x86::AVX512F),
      (17, x86::AVX512DQ),
      (30, x86::AVX512BW),
      (31, x86::AVX512VL),
    ];
    for (bit, cap) in LEAF7_EBX {
      if cpuid7.ebx & (1 << bit) != 0 {
        cpu |= cap;
      }
    }

    hybrid = is_intel && (cpuid7.edx & (1 << 15) != 0 || is_intel_hybrid_model(family, model));
  }

  // ─── XCR0 ───
  let saved = if cpu.has(x86::OSXSAVE) {
    // SAFETY: OSXSAVE is set, so the OS enabled XGETBV.
    SavedState::from_xcr0(unsafe { _xgetbv(0) })
  } else {
    SavedState::XMM
  };

  CpuidBatch { cpu, saved, hybrid }
}

/// Intel hybrid client parts (Alder Lake and later) that predate or hide the
/// CPUID hybrid flag in some virtualized environments.
#[cfg(feature = "std")]
fn is_intel_hybrid_model(family: u32, model: u32) -> bool {
  if family != 6 {
    return false;
  }

  matches!(
    model,
    0x97  // Alder Lake-S
    | 0x9A  // Alder Lake-P
    | 0x9C  // Alder Lake-N
    | 0xB7  // Raptor Lake-S
    | 0xBA  // Raptor Lake-P
    | 0xBF  // Raptor Lake-S refresh
    | 0xAA  // Meteor Lake-H
    | 0xAC  // Meteor Lake-U
    | 0xBD  // Lunar Lake
    | 0xC5  // Arrow Lake-S
    | 0xC6 // Arrow Lake-H
  )
}

#[cfg(all(test, feature = "std"))]
mod tests {
  use super::*;
  use crate::{Tier, probe::Probe};

  #[test]
  fn test_hybrid_model_table() {
    assert!(is_intel_hybrid_model(6, 0x97));
    assert!(!is_intel_hybrid_model(6, 0x55));
    assert!(!is_intel_hybrid_model(25, 0x97));
  }

  #[test]
  #[cfg(not(miri))]
  fn test_detect_includes_static() {
    let probe = detect();
    assert!(probe.cpu_caps().has(caps_static()));
    assert!(probe.supported_by_cpu(Tier::Sse2));
    assert!(probe.supported_by_os(Tier::Sse2));
  }

  #[test]
  #[cfg(not(miri))]
  fn test_avx_tiers_imply_osxsave() {
    let probe = detect();
    if probe.supported_by_cpu(Tier::Avx2) {
      assert!(probe.cpu_caps().has(crate::caps::x86::OSXSAVE));
    }
  }
}
