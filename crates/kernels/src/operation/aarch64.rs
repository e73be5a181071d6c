//! aarch64 binary operation variant (NEON).
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::too_many_arguments)]

use core::arch::aarch64::*;

use super::{OperationBinary8u, portable};
use crate::simd;

const A: usize = 16;

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn operation_binary8u_neon(
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
  if width < A {
    return portable::operation_binary8u(a, a_stride, b, b_stride, width, height, dst, dst_stride, op);
  }
  match op {
    OperationBinary8u::Average => {
      binary_neon(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| vrhaddq_u8(x, y));
    }
    OperationBinary8u::And => {
      binary_neon(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| vandq_u8(x, y));
    }
    OperationBinary8u::Or => {
      binary_neon(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| vorrq_u8(x, y));
    }
    OperationBinary8u::Maximum => {
      binary_neon(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| vmaxq_u8(x, y));
    }
    OperationBinary8u::Minimum => {
      binary_neon(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| vminq_u8(x, y));
    }
    OperationBinary8u::SaturatedSubtraction => {
      binary_neon(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| vqsubq_u8(x, y));
    }
    OperationBinary8u::SaturatedAddition => {
      binary_neon(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| vqaddq_u8(x, y));
    }
  }
}

/// Requires `width >= 16`. The last vector of a row overlaps the body.
#[cfg(feature = "neon")]
#[inline]
#[target_feature(enable = "neon")]
unsafe fn binary_neon(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
  dst: *mut u8,
  dst_stride: usize,
  f: impl Fn(uint8x16_t, uint8x16_t) -> uint8x16_t,
) {
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (ra, rb, rd) = (a.add(y * a_stride), b.add(y * b_stride), dst.add(y * dst_stride));
    let mut col = 0;
    while col < body {
      vst1q_u8(rd.add(col), f(vld1q_u8(ra.add(col)), vld1q_u8(rb.add(col))));
      col += A;
    }
    if body != width {
      let last = width - A;
      vst1q_u8(rd.add(last), f(vld1q_u8(ra.add(last)), vld1q_u8(rb.add(last))));
    }
  }
}
