//! Edge background maintenance for motion detection.
//!
//! | Function | Update per byte |
//! |----------|-----------------|
//! | [`grow_range_slow`] | `background += value > background` |
//! | [`grow_range_fast`] | `background = max(background, value)` |
//! | [`increment_count`] | `count += value > background_value` (saturating) |
//! | [`adjust_range`] | step `background_value` toward `count` vs `threshold`, clear `count` |
//! | [`adjust_range_masked`] | as above where `mask != 0`; `count` is cleared everywhere |
//! | [`shift_range`] | `background = value` |
//! | [`shift_range_masked`] | `background = value` where `mask != 0` |
//!
//! `grow_range_fast` and `shift_range` give the same result when applied
//! twice, so their vector variants finish a row with one unaligned vector
//! ending at the row end. The other updates finish with a scalar tail.
//! Updated planes must not overlap any other plane of the same call.

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

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch Tables
// ─────────────────────────────────────────────────────────────────────────────

/// `(value, value_stride, width, height, background, background_stride)`
///
/// Shared by [`grow_range_slow`], [`grow_range_fast`] and [`shift_range`].
pub type RangeFn = unsafe fn(*const u8, usize, usize, usize, *mut u8, usize);

/// `(value, value_stride, width, height, background_value, background_value_stride,
/// background_count, background_count_stride)`
pub type IncrementCountFn = unsafe fn(*const u8, usize, usize, usize, *const u8, usize, *mut u8, usize);

/// `(background_count, count_stride, width, height, background_value, value_stride, threshold)`
pub type AdjustRangeFn = unsafe fn(*mut u8, usize, usize, usize, *mut u8, usize, u8);

/// [`AdjustRangeFn`] followed by `(mask, mask_stride)`.
pub type AdjustRangeMaskedFn = unsafe fn(*mut u8, usize, usize, usize, *mut u8, usize, u8, *const u8, usize);

/// [`RangeFn`] followed by `(mask, mask_stride)`.
pub type ShiftRangeMaskedFn = unsafe fn(*const u8, usize, usize, usize, *mut u8, usize, *const u8, usize);

const GROW_RANGE_SLOW_TABLE: &[Entry<RangeFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::grow_range_slow_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::grow_range_slow_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::grow_range_slow_neon),
  Entry::base("portable", portable::grow_range_slow),
];

const GROW_RANGE_FAST_TABLE: &[Entry<RangeFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::grow_range_fast_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::grow_range_fast_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::grow_range_fast_neon),
  Entry::base("portable", portable::grow_range_fast),
];

const INCREMENT_COUNT_TABLE: &[Entry<IncrementCountFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::increment_count_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::increment_count_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::increment_count_neon),
  Entry::base("portable", portable::increment_count),
];

const ADJUST_RANGE_TABLE: &[Entry<AdjustRangeFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::adjust_range_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::adjust_range_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::adjust_range_neon),
  Entry::base("portable", portable::adjust_range),
];

const ADJUST_RANGE_MASKED_TABLE: &[Entry<AdjustRangeMaskedFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::adjust_range_masked_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::adjust_range_masked_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::adjust_range_masked_neon),
  Entry::base("portable", portable::adjust_range_masked),
];

const SHIFT_RANGE_TABLE: &[Entry<RangeFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::shift_range_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::shift_range_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::shift_range_neon),
  Entry::base("portable", portable::shift_range),
];

const SHIFT_RANGE_MASKED_TABLE: &[Entry<ShiftRangeMaskedFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::shift_range_masked_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::shift_range_masked_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::shift_range_masked_neon),
  Entry::base("portable", portable::shift_range_masked),
];

pub static GROW_RANGE_SLOW: Dispatcher<RangeFn> =
  Dispatcher::new("edge_background_grow_range_slow", GROW_RANGE_SLOW_TABLE);

pub static GROW_RANGE_FAST: Dispatcher<RangeFn> =
  Dispatcher::new("edge_background_grow_range_fast", GROW_RANGE_FAST_TABLE);

pub static INCREMENT_COUNT: Dispatcher<IncrementCountFn> =
  Dispatcher::new("edge_background_increment_count", INCREMENT_COUNT_TABLE);

pub static ADJUST_RANGE: Dispatcher<AdjustRangeFn> =
  Dispatcher::new("edge_background_adjust_range", ADJUST_RANGE_TABLE);

pub static ADJUST_RANGE_MASKED: Dispatcher<AdjustRangeMaskedFn> =
  Dispatcher::new("edge_background_adjust_range_masked", ADJUST_RANGE_MASKED_TABLE);

pub static SHIFT_RANGE: Dispatcher<RangeFn> = Dispatcher::new("edge_background_shift_range", SHIFT_RANGE_TABLE);

pub static SHIFT_RANGE_MASKED: Dispatcher<ShiftRangeMaskedFn> =
  Dispatcher::new("edge_background_shift_range_masked", SHIFT_RANGE_MASKED_TABLE);

// ─────────────────────────────────────────────────────────────────────────────
// Entry Points
// ─────────────────────────────────────────────────────────────────────────────

/// `background += 1` where `value > background`.
///
/// # Safety
///
/// For every `y < height`, `value + y * value_stride` must be valid for reads
/// and `background + y * background_stride` for reads and writes of `width`
/// bytes, and the two planes must not overlap.
#[inline]
pub unsafe fn grow_range_slow(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  debug_assert!(value_stride >= width && background_stride >= width);
  if width == 0 || height == 0 {
    return;
  }
  debug_assert!(!value.is_null() && !background.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe { (GROW_RANGE_SLOW.select(width).func)(value, value_stride, width, height, background, background_stride) }
}

/// `background = max(background, value)`.
///
/// # Safety
///
/// As [`grow_range_slow`].
#[inline]
pub unsafe fn grow_range_fast(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  debug_assert!(value_stride >= width && background_stride >= width);
  if width == 0 || height == 0 {
    return;
  }
  debug_assert!(!value.is_null() && !background.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe { (GROW_RANGE_FAST.select(width).func)(value, value_stride, width, height, background, background_stride) }
}

/// `background_count += 1` (saturating) where `value > background_value`.
///
/// # Safety
///
/// For every `y < height`, the `value` and `background_value` rows must be
/// valid for reads and the `background_count` row for reads and writes of
/// `width` bytes. `background_count` must not overlap the other planes.
#[inline]
#[allow(clippy::too_many_arguments)]
pub unsafe fn increment_count(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background_value: *const u8,
  background_value_stride: usize,
  background_count: *mut u8,
  background_count_stride: usize,
) {
  debug_assert!(value_stride >= width && background_value_stride >= width && background_count_stride >= width);
  if width == 0 || height == 0 {
    return;
  }
  debug_assert!(!value.is_null() && !background_value.is_null() && !background_count.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe {
    (INCREMENT_COUNT.select(width).func)(
      value,
      value_stride,
      width,
      height,
      background_value,
      background_value_stride,
      background_count,
      background_count_stride,
    )
  }
}

/// Step `background_value` by one toward the side of `threshold` that
/// `background_count` is on (saturating), then clear `background_count`.
///
/// # Safety
///
/// For every `y < height`, both rows must be valid for reads and writes of
/// `width` bytes, and the planes must not overlap.
#[inline]
pub unsafe fn adjust_range(
  background_count: *mut u8,
  background_count_stride: usize,
  width: usize,
  height: usize,
  background_value: *mut u8,
  background_value_stride: usize,
  threshold: u8,
) {
  debug_assert!(background_count_stride >= width && background_value_stride >= width);
  if width == 0 || height == 0 {
    return;
  }
  debug_assert!(!background_count.is_null() && !background_value.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe {
    (ADJUST_RANGE.select(width).func)(
      background_count,
      background_count_stride,
      width,
      height,
      background_value,
      background_value_stride,
      threshold,
    )
  }
}

/// [`adjust_range`] restricted to bytes where `mask != 0`. Every count is
/// cleared regardless of the mask.
///
/// # Safety
///
/// As [`adjust_range`], and the `mask` rows must be valid for reads of
/// `width` bytes.
#[inline]
#[allow(clippy::too_many_arguments)]
pub unsafe fn adjust_range_masked(
  background_count: *mut u8,
  background_count_stride: usize,
  width: usize,
  height: usize,
  background_value: *mut u8,
  background_value_stride: usize,
  threshold: u8,
  mask: *const u8,
  mask_stride: usize,
) {
  debug_assert!(background_count_stride >= width && background_value_stride >= width && mask_stride >= width);
  if width == 0 || height == 0 {
    return;
  }
  debug_assert!(!background_count.is_null() && !background_value.is_null() && !mask.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe {
    (ADJUST_RANGE_MASKED.select(width).func)(
      background_count,
      background_count_stride,
      width,
      height,
      background_value,
      background_value_stride,
      threshold,
      mask,
      mask_stride,
    )
  }
}

/// `background = value`.
///
/// # Safety
///
/// As [`grow_range_slow`].
#[inline]
pub unsafe fn shift_range(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  debug_assert!(value_stride >= width && background_stride >= width);
  if width == 0 || height == 0 {
    return;
  }
  debug_assert!(!value.is_null() && !background.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe { (SHIFT_RANGE.select(width).func)(value, value_stride, width, height, background, background_stride) }
}

/// `background = value` where `mask != 0`.
///
/// # Safety
///
/// As [`grow_range_slow`], and the `mask` rows must be valid for reads of
/// `width` bytes.
#[inline]
#[allow(clippy::too_many_arguments)]
pub unsafe fn shift_range_masked(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
  mask: *const u8,
  mask_stride: usize,
) {
  debug_assert!(value_stride >= width && background_stride >= width && mask_stride >= width);
  if width == 0 || height == 0 {
    return;
  }
  debug_assert!(!value.is_null() && !background.is_null() && !mask.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe {
    (SHIFT_RANGE_MASKED.select(width).func)(
      value,
      value_stride,
      width,
      height,
      background,
      background_stride,
      mask,
      mask_stride,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const W: usize = 37;

  fn ramp(step: u8) -> [u8; W] {
    core::array::from_fn(|i| (i as u8).wrapping_mul(step))
  }

  #[test]
  fn test_grow_range_slow() {
    let value = ramp(7);
    let mut background = [100u8; W];
    // SAFETY: one row of W bytes in each buffer.
    unsafe { grow_range_slow(value.as_ptr(), W, W, 1, background.as_mut_ptr(), W) };
    for (&v, &b) in value.iter().zip(&background) {
      assert_eq!(b, if v > 100 { 101 } else { 100 });
    }
  }

  #[test]
  fn test_grow_range_fast() {
    let value = ramp(7);
    let mut background = [100u8; W];
    // SAFETY: one row of W bytes in each buffer.
    unsafe { grow_range_fast(value.as_ptr(), W, W, 1, background.as_mut_ptr(), W) };
    for (&v, &b) in value.iter().zip(&background) {
      assert_eq!(b, v.max(100));
    }
  }

  #[test]
  fn test_increment_count() {
    let value = ramp(3);
    let background_value = [50u8; W];
    let mut count = [254u8; W];
    // SAFETY: one row of W bytes in each buffer.
    unsafe {
      increment_count(value.as_ptr(), W, W, 1, background_value.as_ptr(), W, count.as_mut_ptr(), W);
      increment_count(value.as_ptr(), W, W, 1, background_value.as_ptr(), W, count.as_mut_ptr(), W);
    }
    for (&v, &c) in value.iter().zip(&count) {
      assert_eq!(c, if v > 50 { 255 } else { 254 });
    }
  }

  #[test]
  fn test_adjust_range() {
    let mut count = ramp(1);
    let mut value: [u8; W] = core::array::from_fn(|i| if i % 5 == 0 { 0 } else { 128 });
    let before = value;
    // SAFETY: one row of W bytes in each buffer.
    unsafe { adjust_range(count.as_mut_ptr(), W, W, 1, value.as_mut_ptr(), W, 10) };
    for (i, (&b, &a)) in before.iter().zip(&value).enumerate() {
      let expected = match (i as u8).cmp(&10) {
        core::cmp::Ordering::Greater => b.saturating_add(1),
        core::cmp::Ordering::Less => b.saturating_sub(1),
        core::cmp::Ordering::Equal => b,
      };
      assert_eq!(a, expected, "byte {i}");
    }
    assert_eq!(count, [0u8; W]);
  }

  #[test]
  fn test_adjust_range_masked() {
    let mut count = [200u8; W];
    let mut value = [10u8; W];
    let mask: [u8; W] = core::array::from_fn(|i| (i % 3) as u8);
    // SAFETY: one row of W bytes in each buffer.
    unsafe { adjust_range_masked(count.as_mut_ptr(), W, W, 1, value.as_mut_ptr(), W, 100, mask.as_ptr(), W) };
    for (&m, &v) in mask.iter().zip(&value) {
      assert_eq!(v, if m != 0 { 11 } else { 10 });
    }
    assert_eq!(count, [0u8; W]);
  }

  #[test]
  fn test_shift_range() {
    let value = ramp(5);
    let mut background = [0u8; W + 3];
    // SAFETY: one row of W bytes; the buffer has 3 spare bytes.
    unsafe { shift_range(value.as_ptr(), W, W, 1, background.as_mut_ptr(), W + 3) };
    assert_eq!(&background[..W], &value[..]);
    assert_eq!(&background[W..], &[0, 0, 0]);
  }

  #[test]
  fn test_shift_range_masked() {
    let value = ramp(5);
    let mut background = [9u8; W];
    let mask: [u8; W] = core::array::from_fn(|i| if i % 2 == 0 { 0xFF } else { 0 });
    // SAFETY: one row of W bytes in each buffer.
    unsafe { shift_range_masked(value.as_ptr(), W, W, 1, background.as_mut_ptr(), W, mask.as_ptr(), W) };
    for (i, &b) in background.iter().enumerate() {
      assert_eq!(b, if i % 2 == 0 { value[i] } else { 9 });
    }
  }
}
