//! Scalar binarization.

use super::CompareType;
use crate::simd::{row, row_mut};

#[inline]
pub(crate) fn binarization_row(
  src: &[u8],
  value: u8,
  positive: u8,
  negative: u8,
  dst: &mut [u8],
  compare: CompareType,
) {
  for (d, &s) in dst.iter_mut().zip(src) {
    *d = if compare.compare(s, value) { positive } else { negative };
  }
}

/// # Safety
///
/// See [`super::binarization`].
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn binarization(
  src: *const u8,
  src_stride: usize,
  width: usize,
  height: usize,
  value: u8,
  positive: u8,
  negative: u8,
  dst: *mut u8,
  dst_stride: usize,
  compare: CompareType,
) {
  if width == 0 {
    return;
  }
  for y in 0..height {
    // SAFETY: Row validity and disjointness are the caller's contract.
    let (rs, rd) = unsafe { (row(src, src_stride, y, width), row_mut(dst, dst_stride, y, width)) };
    binarization_row(rs, value, positive, negative, rd, compare);
  }
}
