//! Scalar edge background updates.
//!
//! The row helpers double as the tail path of the vector variants.

use crate::simd::{row, row_mut};

#[inline]
pub(crate) fn grow_range_slow_row(value: &[u8], background: &mut [u8]) {
  for (b, &v) in background.iter_mut().zip(value) {
    if v > *b {
      *b += 1;
    }
  }
}

#[inline]
pub(crate) fn grow_range_fast_row(value: &[u8], background: &mut [u8]) {
  for (b, &v) in background.iter_mut().zip(value) {
    *b = (*b).max(v);
  }
}

#[inline]
pub(crate) fn increment_count_row(value: &[u8], background_value: &[u8], background_count: &mut [u8]) {
  for ((c, &v), &bv) in background_count.iter_mut().zip(value).zip(background_value) {
    if v > bv {
      *c = c.saturating_add(1);
    }
  }
}

#[inline]
fn adjust(count: u8, value: u8, threshold: u8) -> u8 {
  if count > threshold {
    value.saturating_add(1)
  } else if count < threshold {
    value.saturating_sub(1)
  } else {
    value
  }
}

#[inline]
pub(crate) fn adjust_range_row(background_count: &mut [u8], background_value: &mut [u8], threshold: u8) {
  for (c, v) in background_count.iter_mut().zip(background_value.iter_mut()) {
    *v = adjust(*c, *v, threshold);
    *c = 0;
  }
}

/// Counts are cleared everywhere; values move only where `mask != 0`.
#[inline]
pub(crate) fn adjust_range_masked_row(
  background_count: &mut [u8],
  background_value: &mut [u8],
  threshold: u8,
  mask: &[u8],
) {
  for ((c, v), &m) in background_count.iter_mut().zip(background_value.iter_mut()).zip(mask) {
    if m != 0 {
      *v = adjust(*c, *v, threshold);
    }
    *c = 0;
  }
}

#[inline]
pub(crate) fn shift_range_row(value: &[u8], background: &mut [u8]) {
  for (b, &v) in background.iter_mut().zip(value) {
    *b = v;
  }
}

#[inline]
pub(crate) fn shift_range_masked_row(value: &[u8], mask: &[u8], background: &mut [u8]) {
  for ((b, &v), &m) in background.iter_mut().zip(value).zip(mask) {
    if m != 0 {
      *b = v;
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw variants
// ─────────────────────────────────────────────────────────────────────────────

/// Apply `f` to each row of a read plane and a written plane.
///
/// # Safety
///
/// Row validity and disjointness are the caller's contract.
#[inline]
unsafe fn rows2(
  src: *const u8,
  src_stride: usize,
  width: usize,
  height: usize,
  dst: *mut u8,
  dst_stride: usize,
  f: impl Fn(&[u8], &mut [u8]),
) {
  if width == 0 {
    return;
  }
  for y in 0..height {
    // SAFETY: Forwarded from the caller.
    let (rs, rd) = unsafe { (row(src, src_stride, y, width), row_mut(dst, dst_stride, y, width)) };
    f(rs, rd);
  }
}

/// # Safety
///
/// See [`super::grow_range_slow`].
pub(crate) unsafe fn grow_range_slow(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  // SAFETY: Forwarded from the caller.
  unsafe { rows2(value, value_stride, width, height, background, background_stride, grow_range_slow_row) }
}

/// # Safety
///
/// See [`super::grow_range_fast`].
pub(crate) unsafe fn grow_range_fast(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  // SAFETY: Forwarded from the caller.
  unsafe { rows2(value, value_stride, width, height, background, background_stride, grow_range_fast_row) }
}

/// # Safety
///
/// See [`super::shift_range`].
pub(crate) unsafe fn shift_range(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  // SAFETY: Forwarded from the caller.
  unsafe { rows2(value, value_stride, width, height, background, background_stride, shift_range_row) }
}

/// # Safety
///
/// See [`super::increment_count`].
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn increment_count(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background_value: *const u8,
  background_value_stride: usize,
  background_count: *mut u8,
  background_count_stride: usize,
) {
  if width == 0 {
    return;
  }
  for y in 0..height {
    // SAFETY: Row validity and disjointness are the caller's contract.
    let (rv, rbv, rbc) = unsafe {
      (
        row(value, value_stride, y, width),
        row(background_value, background_value_stride, y, width),
        row_mut(background_count, background_count_stride, y, width),
      )
    };
    increment_count_row(rv, rbv, rbc);
  }
}

/// # Safety
///
/// See [`super::adjust_range`].
pub(crate) unsafe fn adjust_range(
  background_count: *mut u8,
  background_count_stride: usize,
  width: usize,
  height: usize,
  background_value: *mut u8,
  background_value_stride: usize,
  threshold: u8,
) {
  if width == 0 {
    return;
  }
  for y in 0..height {
    // SAFETY: Row validity and disjointness are the caller's contract.
    let (rc, rv) = unsafe {
      (
        row_mut(background_count, background_count_stride, y, width),
        row_mut(background_value, background_value_stride, y, width),
      )
    };
    adjust_range_row(rc, rv, threshold);
  }
}

/// # Safety
///
/// See [`super::adjust_range_masked`].
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn adjust_range_masked(
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
  if width == 0 {
    return;
  }
  for y in 0..height {
    // SAFETY: Row validity and disjointness are the caller's contract.
    let (rc, rv, rm) = unsafe {
      (
        row_mut(background_count, background_count_stride, y, width),
        row_mut(background_value, background_value_stride, y, width),
        row(mask, mask_stride, y, width),
      )
    };
    adjust_range_masked_row(rc, rv, threshold, rm);
  }
}

/// # Safety
///
/// See [`super::shift_range_masked`].
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn shift_range_masked(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
  mask: *const u8,
  mask_stride: usize,
) {
  if width == 0 {
    return;
  }
  for y in 0..height {
    // SAFETY: Row validity and disjointness are the caller's contract.
    let (rv, rm, rb) = unsafe {
      (
        row(value, value_stride, y, width),
        row(mask, mask_stride, y, width),
        row_mut(background, background_stride, y, width),
      )
    };
    shift_range_masked_row(rv, rm, rb);
  }
}
