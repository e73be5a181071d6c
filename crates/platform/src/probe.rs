//! Capability probing.
//!
//! A tier is usable when two independent questions both answer yes:
//!
//! - [`Probe::supported_by_cpu`]: does the CPU report the tier's feature bits?
//! - [`Probe::supported_by_os`]: does the OS save and restore the tier's register state, and does a
//!   representative instruction execute?
//!
//! [`HostProbe`] answers both for the running machine. Tests and embedders can
//! implement [`Probe`] themselves to feed [`crate::CapabilitySet::from_probe`].
//!
//! # Instruction probing
//!
//! The last part of the OS question is meant to run one instruction of the
//! tier and treat an illegal-instruction fault as "unsupported". Rust offers no
//! synchronous recovery from `SIGILL`/`EXCEPTION_ILLEGAL_INSTRUCTION`, so
//! [`HostProbe`] assumes the instruction executes once the CPUID and XCR0
//! checks pass. On a platform that lies about both, the first vector kernel
//! call faults instead of falling back.

use crate::{
  caps::{Arch, Caps, x86},
  tier::{RegisterState, Tier},
};

/// Source of per-tier support answers.
pub trait Probe {
  /// Whether the CPU reports every feature bit of `tier`.
  fn supported_by_cpu(&self, tier: Tier) -> bool;

  /// Whether the OS preserves the register state `tier` needs.
  fn supported_by_os(&self, tier: Tier) -> bool;

  /// Raw feature bits usable on this machine, for diagnostics.
  fn features(&self) -> Caps {
    Caps::NONE
  }

  /// Architecture the answers describe.
  fn arch(&self) -> Arch {
    Arch::current()
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Saved register state
// ─────────────────────────────────────────────────────────────────────────────

/// Register state classes the OS saves across context switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SavedState(u8);

impl SavedState {
  pub const NONE: Self = Self(0);
  pub const XMM: Self = Self(1 << 0);
  pub const YMM: Self = Self(1 << 1);
  pub const ZMM: Self = Self(1 << 2);
  pub const NEON: Self = Self(1 << 3);

  // XCR0 bits 1-2: SSE and AVX state.
  const XCR0_AVX_MASK: u64 = 0x6;
  // XCR0 bits 5-7: opmask, ZMM_Hi256 and Hi16_ZMM state.
  const XCR0_AVX512_MASK: u64 = 0xE0;

  /// Decode an XCR0 value.
  ///
  /// XMM state is implied on x86_64. ZMM state counts only alongside YMM
  /// state, since AVX-512 instructions also touch the lower YMM halves.
  #[must_use]
  pub const fn from_xcr0(xcr0: u64) -> Self {
    let mut bits = Self::XMM.0;
    if xcr0 & Self::XCR0_AVX_MASK == Self::XCR0_AVX_MASK {
      bits |= Self::YMM.0;
      if xcr0 & Self::XCR0_AVX512_MASK == Self::XCR0_AVX512_MASK {
        bits |= Self::ZMM.0;
      }
    }
    Self(bits)
  }

  #[inline]
  #[must_use]
  pub const fn union(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }

  #[inline]
  #[must_use]
  pub const fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }

  /// Whether the state `register_state` depends on is saved.
  #[must_use]
  pub const fn covers(self, register_state: RegisterState) -> bool {
    match register_state {
      RegisterState::General => true,
      RegisterState::Xmm => self.contains(Self::XMM),
      RegisterState::Ymm => self.contains(Self::XMM.union(Self::YMM)),
      RegisterState::Zmm => self.contains(Self::XMM.union(Self::YMM).union(Self::ZMM)),
      RegisterState::Neon => self.contains(Self::NEON),
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Host probe
// ─────────────────────────────────────────────────────────────────────────────

/// Probe answers for the running machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostProbe {
  arch: Arch,
  cpu: Caps,
  saved: SavedState,
}

impl HostProbe {
  /// A probe that reports nothing beyond [`Tier::Base`].
  pub const PORTABLE: Self = Self { arch: Arch::current(), cpu: Caps::NONE, saved: SavedState::NONE };

  /// Query the running machine.
  ///
  /// With `std` this reads CPUID/XGETBV (x86_64) or the OS feature registry
  /// (aarch64). Without `std`, only features enabled at compile time are
  /// reported. Under Miri nothing is reported.
  #[must_use]
  pub fn detect() -> Self {
    crate::detect::host()
  }

  /// Assemble a probe from already-known answers.
  #[must_use]
  pub const fn from_parts(arch: Arch, cpu: Caps, saved: SavedState) -> Self {
    Self { arch, cpu, saved }
  }

  /// Feature bits the CPU reports, before OS gating.
  #[inline]
  #[must_use]
  pub const fn cpu_caps(&self) -> Caps {
    self.cpu
  }

  #[inline]
  #[must_use]
  pub const fn saved_state(&self) -> SavedState {
    self.saved
  }

  /// The instruction-execution part of the OS check. See the module docs.
  #[inline]
  const fn executes_probe_instruction(&self, _tier: Tier) -> bool {
    true
  }
}

impl Probe for HostProbe {
  fn supported_by_cpu(&self, tier: Tier) -> bool {
    match tier.arch() {
      None => true,
      Some(arch) => arch == self.arch && self.cpu.has(tier.requires()),
    }
  }

  fn supported_by_os(&self, tier: Tier) -> bool {
    self.saved.covers(tier.register_state()) && self.executes_probe_instruction(tier)
  }

  fn features(&self) -> Caps {
    let mut caps = self.cpu;
    if !self.saved.covers(RegisterState::Ymm) {
      caps = caps.difference(x86::AVX | x86::AVX2 | x86::FMA);
    }
    if !self.saved.covers(RegisterState::Zmm) {
      caps = caps.difference(x86::AVX512_ALL);
    }
    caps
  }

  fn arch(&self) -> Arch {
    self.arch
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::caps::aarch64;

  #[test]
  fn test_xcr0_decoding() {
    assert_eq!(SavedState::from_xcr0(0), SavedState::XMM);
    assert!(SavedState::from_xcr0(0x7).covers(RegisterState::Ymm));
    assert!(!SavedState::from_xcr0(0x7).covers(RegisterState::Zmm));
    assert!(SavedState::from_xcr0(0xE7).covers(RegisterState::Zmm));
    // AVX-512 state without AVX state is not usable.
    assert!(!SavedState::from_xcr0(0xE1).covers(RegisterState::Zmm));
    assert!(!SavedState::from_xcr0(0xE1).covers(RegisterState::Ymm));
  }

  #[test]
  fn test_cpu_without_os_state_is_not_usable() {
    let probe = HostProbe::from_parts(Arch::X86_64, x86::AVX512BW_READY, SavedState::from_xcr0(0x3));
    assert!(probe.supported_by_cpu(Tier::Avx2));
    assert!(!probe.supported_by_os(Tier::Avx2));
    assert!(probe.supported_by_os(Tier::Sse2));
    assert!(!probe.features().has(x86::AVX2));
  }

  #[test]
  fn test_missing_osxsave_fails_cpu_check() {
    let caps = x86::SSE2 | x86::AVX | x86::AVX2;
    let probe = HostProbe::from_parts(Arch::X86_64, caps, SavedState::from_xcr0(0xE7));
    assert!(!probe.supported_by_cpu(Tier::Avx2));
  }

  #[test]
  fn test_foreign_arch_tiers_unsupported() {
    let probe = HostProbe::from_parts(Arch::Aarch64, aarch64::NEON | x86::SSE2, SavedState::NEON);
    assert!(probe.supported_by_cpu(Tier::Neon));
    assert!(!probe.supported_by_cpu(Tier::Sse2));
  }

  #[test]
  fn test_portable_probe_reports_base_only() {
    let probe = HostProbe::PORTABLE;
    for tier in Tier::ALL {
      let usable = probe.supported_by_cpu(tier) && probe.supported_by_os(tier);
      assert_eq!(usable, tier == Tier::Base, "{tier}");
    }
  }
}
