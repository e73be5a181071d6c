//! Kernel dispatch: tables, selection and caching.
//!
//! - [`Entry`]: one variant with its tier and minimum problem size
//! - [`Selected`]: the result of a selection
//! - [`select`]: choose a variant from a table for a given [`CapabilitySet`]
//! - [`Dispatcher`]: a static table bound to the process-wide capabilities
//!
//! # Selection
//!
//! Tables are ordered strongest tier first and end with a [`Tier::Base`]
//! entry. The first entry whose tier is enabled and whose `min_size` does not
//! exceed the problem size wins; the base entry always accepts.
//!
//! ```
//! use backend::{Dispatcher, Entry};
//! use platform::{CapabilitySet, Tier};
//!
//! type SumFn = fn(&[u8]) -> u64;
//!
//! fn sum_wide(data: &[u8]) -> u64 {
//!   data.iter().map(|&b| u64::from(b)).sum()
//! }
//!
//! fn sum_portable(data: &[u8]) -> u64 {
//!   data.iter().map(|&b| u64::from(b)).sum()
//! }
//!
//! const TABLE: &[Entry<SumFn>] = &[
//!   Entry::new("wide", Tier::Avx2, 32, sum_wide),
//!   Entry::base("portable", sum_portable),
//! ];
//! static SUM: Dispatcher<SumFn> = Dispatcher::new("sum", TABLE);
//!
//! let caps = CapabilitySet::from_tiers(&[Tier::Avx2]);
//! assert_eq!(SUM.select_with(&caps, 31).name, "portable");
//! assert_eq!(SUM.select_with(&caps, 32).name, "wide");
//! ```

use core::fmt;

use platform::{Arch, CapabilitySet, Tier};

use crate::cache::OnceCache;

/// Maximum entries per table (one bit each in the cached mask).
pub const MAX_ENTRIES: usize = 64;

// ─────────────────────────────────────────────────────────────────────────────
// Core Types
// ─────────────────────────────────────────────────────────────────────────────

/// A kernel variant with its dispatch requirements.
#[derive(Clone, Copy, Debug)]
pub struct Entry<F> {
  /// Human-readable name for diagnostics (e.g., "x86_64/avx2").
  pub name: &'static str,
  /// Tier the variant is written for.
  pub tier: Tier,
  /// Smallest problem size the variant is selected for.
  pub min_size: usize,
  /// The variant function.
  pub func: F,
}

impl<F> Entry<F> {
  #[inline]
  #[must_use]
  pub const fn new(name: &'static str, tier: Tier, min_size: usize, func: F) -> Self {
    Self { name, tier, min_size, func }
  }

  /// Entry gated on the tier's native vector width.
  #[inline]
  #[must_use]
  pub const fn vector(name: &'static str, tier: Tier, func: F) -> Self {
    Self::new(name, tier, tier.vector_bytes(), func)
  }

  /// The mandatory [`Tier::Base`] fallback.
  #[inline]
  #[must_use]
  pub const fn base(name: &'static str, func: F) -> Self {
    Self::new(name, Tier::Base, 0, func)
  }

  /// Whether this entry may run a problem of `size` under `caps`.
  #[inline]
  #[must_use]
  pub fn accepts(&self, caps: &CapabilitySet, size: usize) -> bool {
    self.tier == Tier::Base || (caps.is_enabled(self.tier) && size >= self.min_size)
  }
}

/// The result of kernel selection.
#[derive(Clone, Copy, Debug)]
pub struct Selected<F> {
  pub name: &'static str,
  pub tier: Tier,
  pub func: F,
}

impl<F: Copy> From<&Entry<F>> for Selected<F> {
  #[inline]
  fn from(entry: &Entry<F>) -> Self {
    Self { name: entry.name, tier: entry.tier, func: entry.func }
  }
}

/// Select the variant for a problem of `size` from `table`.
///
/// Scans strongest to weakest and returns the first entry that
/// [accepts](Entry::accepts). Tables built through [`Dispatcher::new`] are
/// validated at compile time and always end in a base entry.
///
/// # Panics
///
/// Panics if `table` has no [`Tier::Base`] entry.
#[inline]
#[must_use]
pub fn select<F: Copy>(caps: &CapabilitySet, size: usize, table: &[Entry<F>]) -> Selected<F> {
  for entry in table {
    if entry.accepts(caps, size) {
      return Selected::from(entry);
    }
  }

  panic!("dispatch table has no base entry");
}

/// Check a table's shape, panicking with a description if it is malformed.
///
/// - non-empty and at most [`MAX_ENTRIES`] long
/// - exactly one [`Tier::Base`] entry, last, with `min_size == 0`
/// - tiers of one architecture strictly descending
///
/// Called from [`Dispatcher::new`], so malformed `static` tables fail to compile.
#[allow(clippy::indexing_slicing)]
pub const fn validate<F>(table: &[Entry<F>]) {
  assert!(!table.is_empty(), "dispatch table is empty");
  assert!(table.len() <= MAX_ENTRIES, "dispatch table has too many entries");

  let last = &table[table.len() - 1];
  assert!(matches!(last.tier, Tier::Base), "dispatch table must end with a base entry");
  assert!(last.min_size == 0, "base entry must not have a size minimum");

  let mut i = 0;
  while i + 1 < table.len() {
    let tier = table[i].tier;
    assert!(!matches!(tier, Tier::Base), "base entry must be last");

    let mut j = i + 1;
    while j + 1 < table.len() {
      let later = table[j].tier;
      if same_arch(tier, later) {
        assert!((later as u8) < (tier as u8), "dispatch table tiers must be strongest first");
      }
      j += 1;
    }
    i += 1;
  }
}

const fn same_arch(a: Tier, b: Tier) -> bool {
  matches!(
    (a.arch(), b.arch()),
    (Some(Arch::X86_64), Some(Arch::X86_64)) | (Some(Arch::Aarch64), Some(Arch::Aarch64))
  )
}

/// Bitmask of entries whose tier `caps` enables. Bit `i` is entry `i`.
#[must_use]
pub fn enabled_mask<F>(caps: &CapabilitySet, table: &[Entry<F>]) -> u64 {
  table
    .iter()
    .take(MAX_ENTRIES)
    .enumerate()
    .filter(|(_, entry)| entry.tier == Tier::Base || caps.is_enabled(entry.tier))
    .fold(0, |mask, (i, _)| mask | (1 << i))
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────────────────

/// A static dispatch table bound to [`platform::capabilities`].
///
/// The first [`select`](Self::select) computes which entries the process may
/// run and caches the mask; later calls are a short scan of `min_size`
/// comparisons. [`select_with`](Self::select_with) bypasses the cache and uses
/// an explicit [`CapabilitySet`].
pub struct Dispatcher<F: 'static> {
  algorithm: &'static str,
  table: &'static [Entry<F>],
  enabled: OnceCache<u64>,
}

impl<F: Copy> Dispatcher<F> {
  /// Bind `table` to `algorithm`.
  ///
  /// # Panics
  ///
  /// Panics (a compile error in `static` context) if the table is malformed;
  /// see [`validate`].
  #[must_use]
  pub const fn new(algorithm: &'static str, table: &'static [Entry<F>]) -> Self {
    validate(table);
    Self { algorithm, table, enabled: OnceCache::new() }
  }

  /// Select the variant for a problem of `size` on this process.
  #[inline]
  #[must_use]
  pub fn select(&self, size: usize) -> Selected<F> {
    let mask = self.enabled.get_or_init(|| {
      let mask = enabled_mask(&platform::capabilities(), self.table);
      #[cfg(feature = "log")]
      log::trace!("{}: enabled entries {mask:#b}", self.algorithm);
      mask
    });

    for (i, entry) in self.table.iter().enumerate() {
      if mask & (1 << i) != 0 && size >= entry.min_size {
        return Selected::from(entry);
      }
    }

    select(&CapabilitySet::BASE_ONLY, size, self.table)
  }

  /// Select against an explicit capability set.
  #[inline]
  #[must_use]
  pub fn select_with(&self, caps: &CapabilitySet, size: usize) -> Selected<F> {
    select(caps, size, self.table)
  }

  /// Name of the selected variant for `size`.
  #[inline]
  #[must_use]
  pub fn kernel_name(&self, size: usize) -> &'static str {
    self.select(size).name
  }

  #[inline]
  #[must_use]
  pub const fn algorithm(&self) -> &'static str {
    self.algorithm
  }

  /// Every compiled-in entry, strongest first.
  #[inline]
  #[must_use]
  pub const fn entries(&self) -> &'static [Entry<F>] {
    self.table
  }

  /// Entries this process may run, strongest first.
  pub fn available(&self) -> impl Iterator<Item = &'static Entry<F>> {
    let caps = platform::capabilities();
    self.table.iter().filter(move |entry| entry.tier == Tier::Base || caps.is_enabled(entry.tier))
  }

  /// The entry written for `tier`, if compiled in.
  #[must_use]
  pub fn entry(&self, tier: Tier) -> Option<&'static Entry<F>> {
    self.table.iter().find(|entry| entry.tier == tier)
  }
}

impl<F> fmt::Debug for Dispatcher<F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Dispatcher")
      .field("algorithm", &self.algorithm)
      .field("entries", &EntryNames(self.table))
      .finish()
  }
}

struct EntryNames<F: 'static>(&'static [Entry<F>]);

impl<F> fmt::Debug for EntryNames<F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.0.iter().map(|entry| entry.name)).finish()
  }
}

#[cfg(test)]
mod tests {
  use core::sync::atomic::{AtomicUsize, Ordering};

  use super::*;

  type ProbeFn = fn(usize) -> &'static str;

  static WIDE_CALLS: AtomicUsize = AtomicUsize::new(0);
  static NARROW_CALLS: AtomicUsize = AtomicUsize::new(0);
  static BASE_CALLS: AtomicUsize = AtomicUsize::new(0);

  fn wide(_: usize) -> &'static str {
    WIDE_CALLS.fetch_add(1, Ordering::Relaxed);
    "wide"
  }

  fn narrow(_: usize) -> &'static str {
    NARROW_CALLS.fetch_add(1, Ordering::Relaxed);
    "narrow"
  }

  fn base(_: usize) -> &'static str {
    BASE_CALLS.fetch_add(1, Ordering::Relaxed);
    "base"
  }

  const TABLE: &[Entry<ProbeFn>] = &[
    Entry::new("x86_64/avx2", Tier::Avx2, 32, wide),
    Entry::new("x86_64/sse2", Tier::Sse2, 16, narrow),
    Entry::base("portable", base),
  ];

  static DISPATCH: Dispatcher<ProbeFn> = Dispatcher::new("probe", TABLE);

  fn run(caps: &CapabilitySet, size: usize) -> &'static str {
    (DISPATCH.select_with(caps, size).func)(size)
  }

  #[test]
  fn test_base_accepts_everything() {
    let caps = CapabilitySet::BASE_ONLY;
    for size in [0, 1, 16, 1 << 20] {
      assert_eq!(select(&caps, size, TABLE).name, "portable");
    }
  }

  #[test]
  fn test_strongest_enabled_tier_wins() {
    let caps = CapabilitySet::from_tiers(&[Tier::Sse2, Tier::Avx2]);
    let selected = DISPATCH.select_with(&caps, 64);
    assert_eq!(selected.tier, Tier::Avx2);
    assert_eq!(selected.name, "x86_64/avx2");
  }

  #[test]
  fn test_size_gate_thresholds() {
    let caps = CapabilitySet::from_tiers(&[Tier::Sse2, Tier::Avx2]);
    assert_eq!(DISPATCH.select_with(&caps, 15).tier, Tier::Base);
    assert_eq!(DISPATCH.select_with(&caps, 16).tier, Tier::Sse2);
    assert_eq!(DISPATCH.select_with(&caps, 31).tier, Tier::Sse2);
    assert_eq!(DISPATCH.select_with(&caps, 32).tier, Tier::Avx2);
  }

  #[test]
  fn test_size_gate_is_monotonic() {
    let caps = CapabilitySet::from_tiers(&[Tier::Sse2, Tier::Avx2]);
    let mut previous = Tier::Base;
    for size in 0..=128 {
      let tier = DISPATCH.select_with(&caps, size).tier;
      assert!(tier >= previous, "size {size} went from {previous} to {tier}");
      previous = tier;
    }
  }

  #[test]
  fn test_disabled_tier_falls_back_with_call_counts() {
    let all = CapabilitySet::from_tiers(&[Tier::Sse2, Tier::Avx2]);
    let narrow_before = NARROW_CALLS.load(Ordering::Relaxed);
    let base_before = BASE_CALLS.load(Ordering::Relaxed);

    assert_eq!(run(&all.without(Tier::Avx2), 64), "narrow");
    assert_eq!(run(&all.without(Tier::Avx2).without(Tier::Sse2), 64), "base");
    assert_eq!(run(&all.without(Tier::Sse2), 20), "base");

    // Counters are shared with other tests running in parallel, so only
    // lower bounds are exact.
    assert!(NARROW_CALLS.load(Ordering::Relaxed) > narrow_before);
    assert!(BASE_CALLS.load(Ordering::Relaxed) >= base_before + 2);
    assert_eq!(run(&all, 64), "wide");
    assert!(WIDE_CALLS.load(Ordering::Relaxed) > 0);
  }

  #[test]
  fn test_cached_select_matches_explicit() {
    let caps = platform::capabilities();
    for size in [0, 15, 16, 31, 32, 100] {
      assert_eq!(DISPATCH.select(size).name, DISPATCH.select_with(&caps, size).name);
    }
  }

  #[test]
  fn test_enabled_mask_always_has_base() {
    let mask = enabled_mask(&CapabilitySet::BASE_ONLY, TABLE);
    assert_eq!(mask, 1 << (TABLE.len() - 1));
  }

  #[test]
  fn test_entry_lookup() {
    assert_eq!(DISPATCH.entry(Tier::Sse2).map(|e| e.min_size), Some(16));
    assert!(DISPATCH.entry(Tier::Neon).is_none());
    assert_eq!(DISPATCH.algorithm(), "probe");
  }

  #[test]
  #[should_panic(expected = "dispatch table has no base entry")]
  fn test_select_without_base_panics() {
    let table: &[Entry<ProbeFn>] = &[Entry::new("narrow", Tier::Sse2, 16, narrow)];
    let _ = select(&CapabilitySet::BASE_ONLY, 0, table);
  }

  #[test]
  #[should_panic(expected = "strongest first")]
  fn test_validate_rejects_ascending_tiers() {
    let table: &[Entry<ProbeFn>] =
      &[Entry::new("narrow", Tier::Sse2, 16, narrow), Entry::new("wide", Tier::Avx2, 32, wide), Entry::base("b", base)];
    validate(table);
  }

  #[test]
  #[should_panic(expected = "must end with a base entry")]
  fn test_validate_rejects_missing_base() {
    let table: &[Entry<ProbeFn>] = &[Entry::new("wide", Tier::Avx2, 32, wide)];
    validate(table);
  }
}
