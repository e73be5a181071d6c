//! The per-process set of usable tiers.

use core::fmt;

use crate::{
  caps::{Arch, Caps},
  probe::Probe,
  tier::Tier,
};

/// Immutable record of which tiers are usable.
///
/// `Enable(tier) = compiled_in(tier) && supported_by_cpu(tier) && supported_by_os(tier)`,
/// computed once per tier when the set is built. [`Tier::Base`] is always
/// enabled.
///
/// The process-wide instance comes from [`crate::capabilities`]. Tests build
/// their own with [`CapabilitySet::from_probe`], [`CapabilitySet::from_tiers`] or
/// [`CapabilitySet::without`] and pass it to the dispatcher explicitly.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilitySet {
  enabled: u8,
  arch: Arch,
  features: Caps,
}

impl CapabilitySet {
  /// Only [`Tier::Base`] enabled.
  pub const BASE_ONLY: Self = Self { enabled: 1 << Tier::Base as u8, arch: Arch::current(), features: Caps::NONE };

  /// Evaluate `probe` for every compiled-in tier.
  #[must_use]
  pub fn from_probe<P: Probe + ?Sized>(probe: &P) -> Self {
    let mut enabled = Self::BASE_ONLY.enabled;
    for tier in Tier::ALL {
      if tier != Tier::Base && tier.compiled_in() && probe.supported_by_cpu(tier) && probe.supported_by_os(tier) {
        enabled |= 1 << tier.index();
      }
    }
    Self { enabled, arch: probe.arch(), features: probe.features() }
  }

  /// Build a set that enables exactly `tiers` plus [`Tier::Base`].
  ///
  /// No hardware is consulted. Running a kernel selected through such a set
  /// is only sound when the host really supports the tiers named.
  #[must_use]
  #[allow(clippy::indexing_slicing)]
  pub const fn from_tiers(tiers: &[Tier]) -> Self {
    let mut enabled = Self::BASE_ONLY.enabled;
    let mut i = 0;
    while i < tiers.len() {
      enabled |= 1 << tiers[i] as u8;
      i += 1;
    }
    Self { enabled, arch: Arch::current(), features: Caps::NONE }
  }

  /// Whether `tier` is usable. O(1).
  #[inline(always)]
  #[must_use]
  pub const fn is_enabled(&self, tier: Tier) -> bool {
    self.enabled & (1 << tier as u8) != 0
  }

  /// Copy of `self` with `tier` disabled. [`Tier::Base`] cannot be disabled.
  #[inline]
  #[must_use]
  pub const fn without(self, tier: Tier) -> Self {
    if matches!(tier, Tier::Base) {
      return self;
    }
    Self { enabled: self.enabled & !(1 << tier as u8), ..self }
  }

  /// Intersection of two sets.
  #[inline]
  #[must_use]
  pub const fn intersection(self, other: Self) -> Self {
    Self {
      enabled: self.enabled & other.enabled,
      arch: self.arch,
      features: self.features.intersection(other.features),
    }
  }

  /// Strongest enabled tier.
  #[must_use]
  pub const fn best(&self) -> Tier {
    let mut i = Tier::COUNT;
    while i > 0 {
      i -= 1;
      if self.enabled & (1 << i) != 0 {
        return match Tier::from_index(i) {
          Some(tier) => tier,
          None => Tier::Base,
        };
      }
    }
    Tier::Base
  }

  /// Enabled tiers, weakest first.
  pub fn iter(&self) -> impl Iterator<Item = Tier> + '_ {
    Tier::ALL.into_iter().filter(|&tier| self.is_enabled(tier))
  }

  /// Raw tier bitmask, bit `n` for the tier with [`Tier::index`] `n`.
  #[inline]
  #[must_use]
  pub const fn bits(&self) -> u8 {
    self.enabled
  }

  #[inline]
  #[must_use]
  pub const fn arch(&self) -> Arch {
    self.arch
  }

  /// Usable raw feature bits, for diagnostics.
  #[inline]
  #[must_use]
  pub const fn features(&self) -> Caps {
    self.features
  }
}

impl Default for CapabilitySet {
  fn default() -> Self {
    Self::BASE_ONLY
  }
}

impl fmt::Debug for CapabilitySet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CapabilitySet")
      .field("arch", &self.arch)
      .field("tiers", &TierList(*self))
      .field("features", &self.features)
      .finish()
  }
}

impl fmt::Display for CapabilitySet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: ", self.arch)?;
    for (i, tier) in self.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      f.write_str(tier.name())?;
    }
    Ok(())
  }
}

struct TierList(CapabilitySet);

impl fmt::Debug for TierList {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.0.iter()).finish()
  }
}
