//! aarch64 statistic variants (NEON).
//!
//! NEON loads have no aligned form, so each variant has one instantiation.
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::too_many_arguments)]

use core::{arch::aarch64::*, slice};

use super::{Statistic, portable};
use crate::simd;

const A: usize = 16;

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn abs_difference_sum_neon(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
) -> u64 {
  if width < A {
    return portable::abs_difference_sum(a, a_stride, b, b_stride, width, height);
  }
  let body = simd::align_lo(width, A);
  let mut total = 0u64;

  for y in 0..height {
    let (ra, rb) = (a.add(y * a_stride), b.add(y * b_stride));
    let mut acc = vdupq_n_u32(0);
    let mut col = 0;
    while col < body {
      let diff = vabdq_u8(vld1q_u8(ra.add(col)), vld1q_u8(rb.add(col)));
      acc = vpadalq_u16(acc, vpaddlq_u8(diff));
      col += A;
    }
    total += vaddlvq_u32(acc);
    if body != width {
      let len = width - body;
      total += portable::abs_difference_sum_row(
        slice::from_raw_parts(ra.add(body), len),
        slice::from_raw_parts(rb.add(body), len),
      );
    }
  }

  total
}

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn abs_difference_sum_masked_neon(
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
  if width < A {
    return portable::abs_difference_sum_masked(a, a_stride, b, b_stride, mask, mask_stride, index, width, height);
  }
  let body = simd::align_lo(width, A);
  let vindex = vdupq_n_u8(index);
  let mut total = 0u64;

  for y in 0..height {
    let (ra, rb, rm) = (a.add(y * a_stride), b.add(y * b_stride), mask.add(y * mask_stride));
    let mut acc = vdupq_n_u32(0);
    let mut col = 0;
    while col < body {
      let selected = vceqq_u8(vld1q_u8(rm.add(col)), vindex);
      let diff = vandq_u8(vabdq_u8(vld1q_u8(ra.add(col)), vld1q_u8(rb.add(col))), selected);
      acc = vpadalq_u16(acc, vpaddlq_u8(diff));
      col += A;
    }
    total += vaddlvq_u32(acc);
    if body != width {
      let len = width - body;
      total += portable::abs_difference_sum_masked_row(
        slice::from_raw_parts(ra.add(body), len),
        slice::from_raw_parts(rb.add(body), len),
        slice::from_raw_parts(rm.add(body), len),
        index,
      );
    }
  }

  total
}

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn get_statistic_neon(src: *const u8, stride: usize, width: usize, height: usize) -> Statistic {
  if width < A || height == 0 {
    return portable::get_statistic(src, stride, width, height);
  }
  let body = simd::align_lo(width, A);
  let mut vmin = vdupq_n_u8(u8::MAX);
  let mut vmax = vdupq_n_u8(0);
  let (mut min, mut max, mut sum) = (u8::MAX, 0u8, 0u64);

  for y in 0..height {
    let row = src.add(y * stride);
    let mut acc = vdupq_n_u32(0);
    let mut col = 0;
    while col < body {
      let value = vld1q_u8(row.add(col));
      vmin = vminq_u8(vmin, value);
      vmax = vmaxq_u8(vmax, value);
      acc = vpadalq_u16(acc, vpaddlq_u8(value));
      col += A;
    }
    sum += vaddlvq_u32(acc);
    if body != width {
      sum += portable::statistic_row(slice::from_raw_parts(row.add(body), width - body), &mut min, &mut max);
    }
  }

  min = min.min(vminvq_u8(vmin));
  max = max.max(vmaxvq_u8(vmax));
  portable::finish_statistic(min, max, sum, width * height)
}
