//! Instruction-set tiers.
//!
//! A tier is one capability level a kernel variant can be written for. Tiers
//! are ordered weakest to strongest within an architecture; the ordering
//! between tiers of different architectures carries no meaning.
//!
//! | Tier | Arch | Vector bytes | Register state |
//! |------|------|--------------|----------------|
//! | `Base` | any | 1 | general purpose |
//! | `Sse2` | x86_64 | 16 | XMM |
//! | `Avx2` | x86_64 | 32 | XMM + YMM |
//! | `Avx512bw` | x86_64 | 64 | XMM + YMM + opmask + ZMM |
//! | `Neon` | aarch64 | 16 | V0-V31 |

use core::fmt;

use crate::caps::{Arch, Caps, aarch64, x86};

/// Instruction-set tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Tier {
  /// Portable scalar code. Always enabled.
  #[default]
  Base = 0,
  /// x86_64 SSE2 (128-bit).
  Sse2 = 1,
  /// x86_64 AVX2 (256-bit).
  Avx2 = 2,
  /// x86_64 AVX-512 with byte/word instructions (512-bit).
  Avx512bw = 3,
  /// aarch64 Advanced SIMD (128-bit).
  Neon = 4,
}

/// Register state the OS has to save and restore for a tier to be usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegisterState {
  /// General purpose registers only.
  General,
  /// x86 XMM state (XCR0 bit 1).
  Xmm,
  /// x86 XMM and YMM state (XCR0 bits 1-2).
  Ymm,
  /// x86 opmask, ZMM_Hi256 and Hi16_ZMM state (XCR0 bits 5-7) on top of YMM.
  Zmm,
  /// aarch64 FP/SIMD state.
  Neon,
}

impl Tier {
  /// Every tier, weakest first.
  pub const ALL: [Self; 5] = [Self::Base, Self::Sse2, Self::Avx2, Self::Avx512bw, Self::Neon];

  /// Number of tiers.
  pub const COUNT: usize = Self::ALL.len();

  /// Stable index, usable as a bit position.
  #[inline]
  #[must_use]
  pub const fn index(self) -> usize {
    self as usize
  }

  #[inline]
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Base => "base",
      Self::Sse2 => "sse2",
      Self::Avx2 => "avx2",
      Self::Avx512bw => "avx512bw",
      Self::Neon => "neon",
    }
  }

  /// Architecture the tier belongs to, or `None` for [`Tier::Base`].
  #[inline]
  #[must_use]
  pub const fn arch(self) -> Option<Arch> {
    match self {
      Self::Base => None,
      Self::Sse2 | Self::Avx2 | Self::Avx512bw => Some(Arch::X86_64),
      Self::Neon => Some(Arch::Aarch64),
    }
  }

  /// CPU feature bits that must all be reported for the tier.
  #[inline]
  #[must_use]
  pub const fn requires(self) -> Caps {
    match self {
      Self::Base => Caps::NONE,
      Self::Sse2 => x86::SSE2_READY,
      Self::Avx2 => x86::AVX2_READY,
      Self::Avx512bw => x86::AVX512BW_READY,
      Self::Neon => aarch64::NEON_READY,
    }
  }

  #[inline]
  #[must_use]
  pub const fn register_state(self) -> RegisterState {
    match self {
      Self::Base => RegisterState::General,
      Self::Sse2 => RegisterState::Xmm,
      Self::Avx2 => RegisterState::Ymm,
      Self::Avx512bw => RegisterState::Zmm,
      Self::Neon => RegisterState::Neon,
    }
  }

  /// Native vector width in bytes.
  ///
  /// This is the natural alignment of the tier's aligned load/store forms and
  /// the default minimum problem size in dispatch tables.
  #[inline]
  #[must_use]
  pub const fn vector_bytes(self) -> usize {
    match self {
      Self::Base => 1,
      Self::Sse2 | Self::Neon => 16,
      Self::Avx2 => 32,
      Self::Avx512bw => 64,
    }
  }

  /// Whether the tier was compiled into this build.
  ///
  /// A tier is compiled in when the target architecture matches and the
  /// corresponding cargo feature is enabled.
  #[inline]
  #[must_use]
  pub const fn compiled_in(self) -> bool {
    match self {
      Self::Base => true,
      Self::Sse2 => cfg!(all(target_arch = "x86_64", feature = "sse2")),
      Self::Avx2 => cfg!(all(target_arch = "x86_64", feature = "avx2")),
      Self::Avx512bw => cfg!(all(target_arch = "x86_64", feature = "avx512bw")),
      Self::Neon => cfg!(all(target_arch = "aarch64", feature = "neon")),
    }
  }

  #[inline]
  #[must_use]
  pub const fn from_index(index: usize) -> Option<Self> {
    match index {
      0 => Some(Self::Base),
      1 => Some(Self::Sse2),
      2 => Some(Self::Avx2),
      3 => Some(Self::Avx512bw),
      4 => Some(Self::Neon),
      _ => None,
    }
  }
}

impl fmt::Display for Tier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tier_ordering_within_x86() {
    assert!(Tier::Base < Tier::Sse2);
    assert!(Tier::Sse2 < Tier::Avx2);
    assert!(Tier::Avx2 < Tier::Avx512bw);
  }

  #[test]
  fn test_index_roundtrip() {
    for tier in Tier::ALL {
      assert_eq!(Tier::from_index(tier.index()), Some(tier));
    }
    assert_eq!(Tier::from_index(Tier::COUNT), None);
  }

  #[test]
  fn test_stronger_x86_tiers_require_weaker() {
    assert!(Tier::Avx512bw.requires().has(Tier::Avx2.requires()));
    assert!(Tier::Avx2.vector_bytes() < Tier::Avx512bw.vector_bytes());
  }

  #[test]
  fn test_base_always_compiled_in() {
    assert!(Tier::Base.compiled_in());
    assert!(Tier::Base.requires().is_empty());
    assert_eq!(Tier::Base.arch(), None);
  }

  #[test]
  fn test_compiled_in_matches_target() {
    for tier in Tier::ALL {
      if let Some(arch) = tier.arch()
        && tier.compiled_in()
      {
        assert_eq!(arch, Arch::current(), "{tier} compiled in on foreign arch");
      }
    }
  }
}
