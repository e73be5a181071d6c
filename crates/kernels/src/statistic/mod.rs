//! Whole-image statistics and absolute difference sums.
//!
//! | Function | Output |
//! |----------|--------|
//! | [`abs_difference_sum`] | `sum |a - b|` over every byte |
//! | [`abs_difference_sum_masked`] | the same, restricted to bytes where `mask == index` |
//! | [`get_statistic`] | minimum, maximum and rounded mean of every byte |
//!
//! Each function dispatches on the row width in bytes. Vector variants
//! accumulate, so they finish each row with a scalar tail (AVX-512BW uses a
//! masked load instead) and never revisit a byte.

#![allow(unsafe_code)]

#[cfg(target_arch = "aarch64")]
mod aarch64;
pub(crate) mod portable;
#[cfg(target_arch = "x86_64")]
mod x86_64;

#[cfg(all(test, not(miri)))]
mod proptests;

use backend::{Dispatcher, Entry};
#[allow(unused_imports)]
use platform::Tier;

/// Minimum, maximum and mean of an 8-bit image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Statistic {
  pub min: u8,
  pub max: u8,
  /// `(sum + area / 2) / area`.
  pub average: u8,
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch Tables
// ─────────────────────────────────────────────────────────────────────────────

/// `(a, a_stride, b, b_stride, width, height) -> sum`
pub type AbsDifferenceSumFn = unsafe fn(*const u8, usize, *const u8, usize, usize, usize) -> u64;

/// `(a, a_stride, b, b_stride, mask, mask_stride, index, width, height) -> sum`
pub type AbsDifferenceSumMaskedFn =
  unsafe fn(*const u8, usize, *const u8, usize, *const u8, usize, u8, usize, usize) -> u64;

/// `(src, stride, width, height) -> statistic`
pub type GetStatisticFn = unsafe fn(*const u8, usize, usize, usize) -> Statistic;

const ABS_DIFFERENCE_SUM_TABLE: &[Entry<AbsDifferenceSumFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx512bw"))]
  Entry::vector("x86_64/avx512bw", Tier::Avx512bw, x86_64::abs_difference_sum_avx512bw),
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::abs_difference_sum_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::abs_difference_sum_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::abs_difference_sum_neon),
  Entry::base("portable", portable::abs_difference_sum),
];

const ABS_DIFFERENCE_SUM_MASKED_TABLE: &[Entry<AbsDifferenceSumMaskedFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx512bw"))]
  Entry::vector("x86_64/avx512bw", Tier::Avx512bw, x86_64::abs_difference_sum_masked_avx512bw),
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::abs_difference_sum_masked_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::abs_difference_sum_masked_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::abs_difference_sum_masked_neon),
  Entry::base("portable", portable::abs_difference_sum_masked),
];

const GET_STATISTIC_TABLE: &[Entry<GetStatisticFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::get_statistic_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::get_statistic_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::get_statistic_neon),
  Entry::base("portable", portable::get_statistic),
];

pub static ABS_DIFFERENCE_SUM: Dispatcher<AbsDifferenceSumFn> =
  Dispatcher::new("abs_difference_sum", ABS_DIFFERENCE_SUM_TABLE);

pub static ABS_DIFFERENCE_SUM_MASKED: Dispatcher<AbsDifferenceSumMaskedFn> =
  Dispatcher::new("abs_difference_sum_masked", ABS_DIFFERENCE_SUM_MASKED_TABLE);

pub static GET_STATISTIC: Dispatcher<GetStatisticFn> = Dispatcher::new("get_statistic", GET_STATISTIC_TABLE);

// ─────────────────────────────────────────────────────────────────────────────
// Entry Points
// ─────────────────────────────────────────────────────────────────────────────

/// Sum of absolute differences between two 8-bit images.
///
/// # Safety
///
/// For every `y < height`, `a + y * a_stride` and `b + y * b_stride` must be
/// valid for reads of `width` bytes.
#[inline]
#[must_use]
pub unsafe fn abs_difference_sum(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
) -> u64 {
  debug_assert!(a_stride >= width && b_stride >= width);
  if width == 0 || height == 0 {
    return 0;
  }
  debug_assert!(!a.is_null() && !b.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe { (ABS_DIFFERENCE_SUM.select(width).func)(a, a_stride, b, b_stride, width, height) }
}

/// Sum of absolute differences over the bytes where `mask == index`.
///
/// # Safety
///
/// As [`abs_difference_sum`], and `mask + y * mask_stride` must be valid for
/// reads of `width` bytes.
#[inline]
#[must_use]
#[allow(clippy::too_many_arguments)]
pub unsafe fn abs_difference_sum_masked(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  mask: *const u8,
  mask_stride: usize,
  index: u8,
  width: usize,
  height: usize,
) -> u64 {
  debug_assert!(a_stride >= width && b_stride >= width && mask_stride >= width);
  if width == 0 || height == 0 {
    return 0;
  }
  debug_assert!(!a.is_null() && !b.is_null() && !mask.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe {
    (ABS_DIFFERENCE_SUM_MASKED.select(width).func)(a, a_stride, b, b_stride, mask, mask_stride, index, width, height)
  }
}

/// Minimum, maximum and rounded mean of an 8-bit image.
///
/// An empty image yields [`Statistic::default`].
///
/// # Safety
///
/// For every `y < height`, `src + y * stride` must be valid for reads of
/// `width` bytes.
#[inline]
#[must_use]
pub unsafe fn get_statistic(src: *const u8, stride: usize, width: usize, height: usize) -> Statistic {
  debug_assert!(stride >= width);
  if width == 0 || height == 0 {
    return Statistic::default();
  }
  debug_assert!(!src.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe { (GET_STATISTIC.select(width).func)(src, stride, width, height) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tables_end_with_portable() {
    for name in [
      ABS_DIFFERENCE_SUM.entries().last().map(|e| e.name),
      ABS_DIFFERENCE_SUM_MASKED.entries().last().map(|e| e.name),
      GET_STATISTIC.entries().last().map(|e| e.name),
    ] {
      assert_eq!(name, Some("portable"));
    }
  }

  #[test]
  fn test_vector_entries_gate_on_vector_width() {
    for entry in ABS_DIFFERENCE_SUM.entries() {
      assert_eq!(entry.min_size, if entry.tier == Tier::Base { 0 } else { entry.tier.vector_bytes() });
    }
  }

  #[test]
  fn test_abs_difference_sum_small() {
    let a = [10u8, 20, 30, 40, 50, 60];
    let b = [12u8, 18, 30, 0, 255, 61];
    // SAFETY: 2 rows of 3 bytes with stride 3 fit both arrays.
    let sum = unsafe { abs_difference_sum(a.as_ptr(), 3, b.as_ptr(), 3, 3, 2) };
    assert_eq!(sum, 2 + 2 + 0 + 40 + 205 + 1);
  }

  #[test]
  fn test_abs_difference_sum_masked_selects_index() {
    let a = [0u8; 8];
    let b = [1u8, 2, 3, 4, 5, 6, 7, 8];
    let mask = [1u8, 0, 1, 0, 1, 0, 1, 0];
    // SAFETY: one row of 8 bytes.
    let sum = unsafe { abs_difference_sum_masked(a.as_ptr(), 8, b.as_ptr(), 8, mask.as_ptr(), 8, 1, 8, 1) };
    assert_eq!(sum, 1 + 3 + 5 + 7);
  }

  #[test]
  fn test_get_statistic_rounds_average() {
    let src = [0u8, 1, 2, 3, 0xAA, 0xBB, 4, 5, 6, 7, 0xCC, 0xDD];
    // SAFETY: 2 rows of 4 bytes with stride 6.
    let stat = unsafe { get_statistic(src.as_ptr(), 6, 4, 2) };
    // sum = 28, area = 8, (28 + 4) / 8 = 4
    assert_eq!(stat, Statistic { min: 0, max: 7, average: 4 });
  }

  #[test]
  fn test_empty_inputs() {
    // SAFETY: zero-sized calls never dereference.
    unsafe {
      assert_eq!(abs_difference_sum(core::ptr::null(), 0, core::ptr::null(), 0, 0, 0), 0);
      assert_eq!(get_statistic(core::ptr::null(), 16, 16, 0), Statistic::default());
    }
  }
}
