//! aarch64 binarization variant (NEON).
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::too_many_arguments)]

use core::arch::aarch64::*;

use super::{CompareType, portable};
use crate::simd;

const A: usize = 16;

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn binarization_neon(
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
  if width < A {
    return portable::binarization(src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare);
  }
  let v = vdupq_n_u8(value);
  let (pos, neg) = (vdupq_n_u8(positive), vdupq_n_u8(negative));
  let (s, ss, w, h, d, ds) = (src, src_stride, width, height, dst, dst_stride);
  match compare {
    CompareType::Equal => binarize_neon(s, ss, w, h, pos, neg, d, ds, |x| vceqq_u8(x, v)),
    CompareType::NotEqual => binarize_neon(s, ss, w, h, pos, neg, d, ds, |x| vmvnq_u8(vceqq_u8(x, v))),
    CompareType::Greater => binarize_neon(s, ss, w, h, pos, neg, d, ds, |x| vcgtq_u8(x, v)),
    CompareType::GreaterOrEqual => binarize_neon(s, ss, w, h, pos, neg, d, ds, |x| vcgeq_u8(x, v)),
    CompareType::Lesser => binarize_neon(s, ss, w, h, pos, neg, d, ds, |x| vcltq_u8(x, v)),
    CompareType::LesserOrEqual => binarize_neon(s, ss, w, h, pos, neg, d, ds, |x| vcleq_u8(x, v)),
  }
}

/// Requires `width >= 16`. The last vector of a row overlaps the body.
#[cfg(feature = "neon")]
#[inline]
#[target_feature(enable = "neon")]
unsafe fn binarize_neon(
  src: *const u8,
  src_stride: usize,
  width: usize,
  height: usize,
  positive: uint8x16_t,
  negative: uint8x16_t,
  dst: *mut u8,
  dst_stride: usize,
  mask: impl Fn(uint8x16_t) -> uint8x16_t,
) {
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (rs, rd) = (src.add(y * src_stride), dst.add(y * dst_stride));
    let mut col = 0;
    while col < body {
      vst1q_u8(rd.add(col), vbslq_u8(mask(vld1q_u8(rs.add(col))), positive, negative));
      col += A;
    }
    if body != width {
      let last = width - A;
      vst1q_u8(rd.add(last), vbslq_u8(mask(vld1q_u8(rs.add(last))), positive, negative));
    }
  }
}
