//! Scalar binary operations.

use super::OperationBinary8u;
use crate::simd::{row, row_mut};

#[inline]
pub(crate) fn operation_binary8u_row(a: &[u8], b: &[u8], dst: &mut [u8], op: OperationBinary8u) {
  for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
    *d = op.apply(x, y);
  }
}

/// # Safety
///
/// See [`super::operation_binary8u`]; `width` is in bytes.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn operation_binary8u(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
  dst: *mut u8,
  dst_stride: usize,
  op: OperationBinary8u,
) {
  if width == 0 {
    return;
  }
  for y in 0..height {
    // SAFETY: Row validity and disjointness are the caller's contract.
    let (ra, rb, rd) =
      unsafe { (row(a, a_stride, y, width), row(b, b_stride, y, width), row_mut(dst, dst_stride, y, width)) };
    operation_binary8u_row(ra, rb, rd, op);
  }
}
