//! Scalar statistics.
//!
//! The row helpers double as the tail path of the vector variants.

use super::Statistic;
use crate::simd::row;

#[inline]
pub(crate) fn abs_difference_sum_row(a: &[u8], b: &[u8]) -> u64 {
  a.iter().zip(b).map(|(&x, &y)| u64::from(x.abs_diff(y))).sum()
}

#[inline]
pub(crate) fn abs_difference_sum_masked_row(a: &[u8], b: &[u8], mask: &[u8], index: u8) -> u64 {
  a.iter().zip(b).zip(mask).filter(|&(_, &m)| m == index).map(|((&x, &y), _)| u64::from(x.abs_diff(y))).sum()
}

/// Fold `src` into a running minimum and maximum; returns the byte sum.
#[inline]
pub(crate) fn statistic_row(src: &[u8], min: &mut u8, max: &mut u8) -> u64 {
  let mut sum = 0u64;
  for &value in src {
    *min = (*min).min(value);
    *max = (*max).max(value);
    sum += u64::from(value);
  }
  sum
}

#[inline]
pub(crate) fn finish_statistic(min: u8, max: u8, sum: u64, area: usize) -> Statistic {
  if area == 0 {
    return Statistic::default();
  }
  let area = area as u64;
  let average = u8::try_from((sum + area / 2) / area).unwrap_or(u8::MAX);
  Statistic { min, max, average }
}

/// # Safety
///
/// See [`super::abs_difference_sum`].
pub(crate) unsafe fn abs_difference_sum(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
) -> u64 {
  if width == 0 {
    return 0;
  }
  (0..height)
    .map(|y| {
      // SAFETY: Row validity is the caller's contract.
      let (ra, rb) = unsafe { (row(a, a_stride, y, width), row(b, b_stride, y, width)) };
      abs_difference_sum_row(ra, rb)
    })
    .sum()
}

/// # Safety
///
/// See [`super::abs_difference_sum_masked`].
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn abs_difference_sum_masked(
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
  if width == 0 {
    return 0;
  }
  (0..height)
    .map(|y| {
      // SAFETY: Row validity is the caller's contract.
      let (ra, rb, rm) =
        unsafe { (row(a, a_stride, y, width), row(b, b_stride, y, width), row(mask, mask_stride, y, width)) };
      abs_difference_sum_masked_row(ra, rb, rm, index)
    })
    .sum()
}

/// # Safety
///
/// See [`super::get_statistic`].
pub(crate) unsafe fn get_statistic(src: *const u8, stride: usize, width: usize, height: usize) -> Statistic {
  if width == 0 || height == 0 {
    return Statistic::default();
  }
  let (mut min, mut max, mut sum) = (u8::MAX, 0u8, 0u64);
  for y in 0..height {
    // SAFETY: Row validity is the caller's contract.
    sum += statistic_row(unsafe { row(src, stride, y, width) }, &mut min, &mut max);
  }
  finish_statistic(min, max, sum, width * height)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_masked_row_ignores_other_indices() {
    assert_eq!(abs_difference_sum_masked_row(&[0, 0, 0], &[9, 9, 9], &[2, 3, 2], 2), 18);
    assert_eq!(abs_difference_sum_masked_row(&[0, 0, 0], &[9, 9, 9], &[2, 3, 2], 4), 0);
  }

  #[test]
  fn test_finish_statistic_rounds_half_up() {
    assert_eq!(finish_statistic(0, 1, 1, 2).average, 1);
    assert_eq!(finish_statistic(0, 1, 1, 3).average, 0);
    assert_eq!(finish_statistic(255, 255, 255 * 7, 7).average, 255);
  }
}
