//! Raw CPU feature bits.
//!
//! [`Caps`] is a 128-bit bitset of the ISA extensions the probe cares about.
//! Tiers are defined as masks over these bits (see [`crate::Tier::requires`]).
//!
//! # Bit Layout
//!
//! - Bits 0-63: x86_64 features
//! - Bits 64-127: aarch64 features

// ─────────────────────────────────────────────────────────────────────────────
// Core Capability Type
// ─────────────────────────────────────────────────────────────────────────────

/// CPU feature bitset.
///
/// `Caps` is `Copy`, `Send` and `Sync`, and every operation is `const`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Caps(pub(crate) [u64; 2]);

impl Caps {
  /// Empty capability set (no features).
  pub const NONE: Self = Self([0; 2]);

  /// Create a capability set from raw words.
  #[cfg(test)]
  #[inline]
  #[must_use]
  pub const fn from_raw(words: [u64; 2]) -> Self {
    Self(words)
  }

  /// Access the raw underlying words.
  #[inline]
  #[must_use]
  pub const fn as_raw(&self) -> &[u64; 2] {
    &self.0
  }

  /// Check if all features in `required` are present.
  #[inline(always)]
  #[must_use]
  pub const fn has(self, required: Self) -> bool {
    (self.0[0] & required.0[0]) == required.0[0] && (self.0[1] & required.0[1]) == required.0[1]
  }

  /// Union of two capability sets.
  #[inline]
  #[must_use]
  pub const fn union(self, other: Self) -> Self {
    Self([self.0[0] | other.0[0], self.0[1] | other.0[1]])
  }

  /// Intersection of two capability sets.
  #[inline]
  #[must_use]
  pub const fn intersection(self, other: Self) -> Self {
    Self([self.0[0] & other.0[0], self.0[1] & other.0[1]])
  }

  /// Features in `self` that are not in `other`.
  #[inline]
  #[must_use]
  pub const fn difference(self, other: Self) -> Self {
    Self([self.0[0] & !other.0[0], self.0[1] & !other.0[1]])
  }

  #[inline]
  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.0[0] == 0 && self.0[1] == 0
  }

  /// Number of features present.
  #[inline]
  #[must_use]
  pub const fn count(self) -> u32 {
    self.0[0].count_ones() + self.0[1].count_ones()
  }

  /// Create a capability set with a single bit set.
  ///
  /// # Panics
  ///
  /// Panics (at compile time when used in a constant) if `bit >= 128`.
  #[inline]
  #[must_use]
  pub const fn bit(bit: u8) -> Self {
    assert!(bit < 128, "capability bit out of range");
    if bit < 64 { Self([1u64 << bit, 0]) } else { Self([0, 1u64 << (bit - 64)]) }
  }

  /// Check if a specific bit is set.
  #[inline]
  #[must_use]
  pub const fn has_bit(self, bit: u8) -> bool {
    match bit {
      0..=63 => self.0[0] & (1u64 << bit) != 0,
      64..=127 => self.0[1] & (1u64 << (bit - 64)) != 0,
      _ => false,
    }
  }

  /// Iterate over the names of the features present.
  pub fn names(self) -> impl Iterator<Item = &'static str> {
    FEATURE_NAMES.iter().filter(move |&&(bit, _)| self.has_bit(bit)).map(|&(_, name)| name)
  }
}

impl core::ops::BitOr for Caps {
  type Output = Self;

  #[inline]
  fn bitor(self, rhs: Self) -> Self::Output {
    self.union(rhs)
  }
}

impl core::ops::BitAnd for Caps {
  type Output = Self;

  #[inline]
  fn bitand(self, rhs: Self) -> Self::Output {
    self.intersection(rhs)
  }
}

impl core::ops::BitOrAssign for Caps {
  #[inline]
  fn bitor_assign(&mut self, rhs: Self) {
    *self = self.union(rhs);
  }
}

impl core::fmt::Debug for Caps {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_set().entries(self.names()).finish()
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Architecture Identification
// ─────────────────────────────────────────────────────────────────────────────

/// Target architecture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Arch {
  X86_64,
  Aarch64,
  #[default]
  Other,
}

impl Arch {
  /// Architecture of the current compilation target.
  #[inline]
  #[must_use]
  pub const fn current() -> Self {
    #[cfg(target_arch = "x86_64")]
    {
      Self::X86_64
    }
    #[cfg(target_arch = "aarch64")]
    {
      Self::Aarch64
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
      Self::Other
    }
  }

  #[inline]
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
      Self::Other => "other",
    }
  }
}

impl core::fmt::Display for Arch {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(self.name())
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// x86_64 Features (bits 0-63)
// ─────────────────────────────────────────────────────────────────────────────

/// x86_64 CPU features.
pub mod x86 {
  use super::Caps;

  // ─── SSE Family ───
  pub const SSE2: Caps = Caps::bit(0);
  pub const SSE3: Caps = Caps::bit(1);
  pub const SSSE3: Caps = Caps::bit(2);
  pub const SSE41: Caps = Caps::bit(3);
  pub const SSE42: Caps = Caps::bit(4);
  pub const POPCNT: Caps = Caps::bit(5);

  // ─── AVX Family ───
  /// CPUID.1:ECX.OSXSAVE, prerequisite for reading XCR0.
  pub const OSXSAVE: Caps = Caps::bit(6);
  pub const AVX: Caps = Caps::bit(7);
  pub const AVX2: Caps = Caps::bit(8);
  pub const FMA: Caps = Caps::bit(9);
  pub const BMI1: Caps = Caps::bit(10);
  pub const BMI2: Caps = Caps::bit(11);

  // ─── AVX-512 ───
  pub const AVX512F: Caps = Caps::bit(12);
  pub const AVX512BW: Caps = Caps::bit(13);
  pub const AVX512VL: Caps = Caps::bit(14);
  pub const AVX512DQ: Caps = Caps::bit(15);

  /// Every AVX-512 bit, cleared together on hybrid parts.
  pub const AVX512_ALL: Caps = Caps([AVX512F.0[0] | AVX512BW.0[0] | AVX512VL.0[0] | AVX512DQ.0[0], 0]);

  // ─── Tier masks ───

  /// SSE2 is architectural on x86_64.
  pub const SSE2_READY: Caps = SSE2;

  /// AVX2 with its OSXSAVE prerequisite and the AVX base.
  pub const AVX2_READY: Caps = Caps([OSXSAVE.0[0] | AVX.0[0] | AVX2.0[0], 0]);

  /// AVX-512BW on top of the AVX2 tier.
  pub const AVX512BW_READY: Caps = Caps([AVX2_READY.0[0] | AVX512F.0[0] | AVX512BW.0[0], 0]);
}

// ─────────────────────────────────────────────────────────────────────────────
// aarch64 Features (bits 64-127)
// ─────────────────────────────────────────────────────────────────────────────

/// aarch64 CPU features.
pub mod aarch64 {
  use super::Caps;

  /// Advanced SIMD (ASIMD / NEON).
  pub const NEON: Caps = Caps::bit(64);
  pub const DOTPROD: Caps = Caps::bit(65);

  pub const NEON_READY: Caps = NEON;
}

// ─────────────────────────────────────────────────────────────────────────────
// Feature Name Lookup (for diagnostics)
// ─────────────────────────────────────────────────────────────────────────────

const FEATURE_NAMES: &[(u8, &str)] = &[
  (0, "sse2"),
  (1, "sse3"),
  (2, "ssse3"),
  (3, "sse4.1"),
  (4, "sse4.2"),
  (5, "popcnt"),
  (6, "osxsave"),
  (7, "avx"),
  (8, "avx2"),
  (9, "fma"),
  (10, "bmi1"),
  (11, "bmi2"),
  (12, "avx512f"),
  (13, "avx512bw"),
  (14, "avx512vl"),
  (15, "avx512dq"),
  (64, "neon"),
  (65, "dotprod"),
];

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::vec::Vec;

  use super::*;

  #[test]
  fn test_caps_basic() {
    let empty = Caps::NONE;
    assert!(empty.is_empty());
    assert_eq!(empty.count(), 0);

    let bit0 = Caps::bit(0);
    assert!(!bit0.is_empty());
    assert_eq!(bit0.count(), 1);
    assert!(bit0.has_bit(0));
    assert!(!bit0.has_bit(1));
    assert!(!bit0.has_bit(200));
  }

  #[test]
  fn test_caps_both_words() {
    let w0 = Caps::bit(0);
    let w1 = Caps::bit(64);
    assert_eq!(w0.0[0], 1);
    assert_eq!(w1.0[1], 1);

    let all = w0 | w1;
    assert!(all.has(w0));
    assert!(all.has(w1));
    assert_eq!(all.count(), 2);
    assert_eq!(all.difference(w1), w0);
  }

  #[test]
  fn test_tier_masks_are_nested() {
    assert!(x86::AVX512BW_READY.has(x86::AVX2_READY));
    assert!(x86::AVX2_READY.has(x86::OSXSAVE));
    assert!(!x86::AVX2_READY.has(x86::AVX512F));
    assert!(x86::AVX512_ALL.has(x86::AVX512BW));
  }

  #[test]
  fn test_names_follow_bits() {
    let caps = x86::SSE2 | x86::AVX2 | aarch64::NEON;
    let names: Vec<_> = caps.names().collect();
    assert_eq!(names, ["sse2", "avx2", "neon"]);
  }

  #[test]
  fn test_feature_names_unique() {
    for (i, &(bit, _)) in FEATURE_NAMES.iter().enumerate() {
      assert!(FEATURE_NAMES.iter().skip(i + 1).all(|&(b, _)| b != bit), "duplicate bit {bit}");
    }
  }
}
