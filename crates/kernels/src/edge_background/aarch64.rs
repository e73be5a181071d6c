//! aarch64 edge background variants (NEON).
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::too_many_arguments)]

use core::{arch::aarch64::*, slice};

use super::portable;
use crate::simd;

const A: usize = 16;

/// `background = f(value, background)`; see the x86_64 `update_sse2`.
/// Requires `width >= 16`.
#[cfg(feature = "neon")]
#[inline]
#[target_feature(enable = "neon")]
unsafe fn update_neon<const OVERLAP: bool>(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
  f: impl Fn(uint8x16_t, uint8x16_t) -> uint8x16_t,
  tail: fn(&[u8], &mut [u8]),
) {
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (rv, rb) = (value.add(y * value_stride), background.add(y * background_stride));
    let mut col = 0;
    while col < body {
      vst1q_u8(rb.add(col), f(vld1q_u8(rv.add(col)), vld1q_u8(rb.add(col))));
      col += A;
    }
    if body == width {
      continue;
    }
    if OVERLAP {
      let last = width - A;
      vst1q_u8(rb.add(last), f(vld1q_u8(rv.add(last)), vld1q_u8(rb.add(last))));
    } else {
      let len = width - body;
      tail(slice::from_raw_parts(rv.add(body), len), slice::from_raw_parts_mut(rb.add(body), len));
    }
  }
}

/// `target = f(a, b, target)` with a scalar `tail`. Requires `width >= 16`.
#[cfg(feature = "neon")]
#[inline]
#[target_feature(enable = "neon")]
unsafe fn update3_neon(
  a: *const u8,
  a_stride: usize,
  width: usize,
  height: usize,
  b: *const u8,
  b_stride: usize,
  target: *mut u8,
  target_stride: usize,
  f: impl Fn(uint8x16_t, uint8x16_t, uint8x16_t) -> uint8x16_t,
  tail: fn(&[u8], &[u8], &mut [u8]),
) {
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (ra, rb, rt) = (a.add(y * a_stride), b.add(y * b_stride), target.add(y * target_stride));
    let mut col = 0;
    while col < body {
      vst1q_u8(rt.add(col), f(vld1q_u8(ra.add(col)), vld1q_u8(rb.add(col)), vld1q_u8(rt.add(col))));
      col += A;
    }
    if body != width {
      let len = width - body;
      tail(
        slice::from_raw_parts(ra.add(body), len),
        slice::from_raw_parts(rb.add(body), len),
        slice::from_raw_parts_mut(rt.add(body), len),
      );
    }
  }
}

/// Requires `width >= 16`. `mask` is only read when `MASKED`.
#[cfg(feature = "neon")]
#[inline]
#[target_feature(enable = "neon")]
unsafe fn adjust_neon<const MASKED: bool>(
  count: *mut u8,
  count_stride: usize,
  width: usize,
  height: usize,
  value: *mut u8,
  value_stride: usize,
  threshold: u8,
  mask: *const u8,
  mask_stride: usize,
) {
  let body = simd::align_lo(width, A);
  let t = vdupq_n_u8(threshold);
  let one = vdupq_n_u8(1);
  let zero = vdupq_n_u8(0);
  for y in 0..height {
    let (rc, rv) = (count.add(y * count_stride), value.add(y * value_stride));
    let rm = if MASKED { mask.add(y * mask_stride) } else { mask };
    let mut col = 0;
    while col < body {
      let c = vld1q_u8(rc.add(col));
      let mut inc = vandq_u8(vcgtq_u8(c, t), one);
      let mut dec = vandq_u8(vcltq_u8(c, t), one);
      if MASKED {
        let selected = vtstq_u8(vld1q_u8(rm.add(col)), vdupq_n_u8(0xFF));
        inc = vandq_u8(inc, selected);
        dec = vandq_u8(dec, selected);
      }
      let v = vld1q_u8(rv.add(col));
      vst1q_u8(rv.add(col), vqsubq_u8(vqaddq_u8(v, inc), dec));
      vst1q_u8(rc.add(col), zero);
      col += A;
    }
    if body != width {
      let len = width - body;
      let (tc, tv) = (slice::from_raw_parts_mut(rc.add(body), len), slice::from_raw_parts_mut(rv.add(body), len));
      if MASKED {
        portable::adjust_range_masked_row(tc, tv, threshold, slice::from_raw_parts(rm.add(body), len));
      } else {
        portable::adjust_range_row(tc, tv, threshold);
      }
    }
  }
}

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn grow_range_slow_neon(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  if width < A {
    return portable::grow_range_slow(value, value_stride, width, height, background, background_stride);
  }
  let one = vdupq_n_u8(1);
  update_neon::<false>(
    value,
    value_stride,
    width,
    height,
    background,
    background_stride,
    |v, b| vqaddq_u8(b, vandq_u8(vcgtq_u8(v, b), one)),
    portable::grow_range_slow_row,
  );
}

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn grow_range_fast_neon(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  if width < A {
    return portable::grow_range_fast(value, value_stride, width, height, background, background_stride);
  }
  update_neon::<true>(
    value,
    value_stride,
    width,
    height,
    background,
    background_stride,
    |v, b| vmaxq_u8(b, v),
    portable::grow_range_fast_row,
  );
}

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn shift_range_neon(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  if width < A {
    return portable::shift_range(value, value_stride, width, height, background, background_stride);
  }
  update_neon::<true>(
    value,
    value_stride,
    width,
    height,
    background,
    background_stride,
    |v, _| v,
    portable::shift_range_row,
  );
}

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn increment_count_neon(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background_value: *const u8,
  background_value_stride: usize,
  background_count: *mut u8,
  background_count_stride: usize,
) {
  let (v, vs, bv, bvs, bc, bcs) =
    (value, value_stride, background_value, background_value_stride, background_count, background_count_stride);
  if width < A {
    return portable::increment_count(v, vs, width, height, bv, bvs, bc, bcs);
  }
  let one = vdupq_n_u8(1);
  update3_neon(
    v,
    vs,
    width,
    height,
    bv,
    bvs,
    bc,
    bcs,
    |v, bv, c| vqaddq_u8(c, vandq_u8(vcgtq_u8(v, bv), one)),
    portable::increment_count_row,
  );
}

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn adjust_range_neon(
  background_count: *mut u8,
  background_count_stride: usize,
  width: usize,
  height: usize,
  background_value: *mut u8,
  background_value_stride: usize,
  threshold: u8,
) {
  let (c, cs, v, vs) = (background_count, background_count_stride, background_value, background_value_stride);
  if width < A {
    return portable::adjust_range(c, cs, width, height, v, vs, threshold);
  }
  adjust_neon::<false>(c, cs, width, height, v, vs, threshold, core::ptr::null(), 0);
}

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn adjust_range_masked_neon(
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
  let (c, cs, v, vs) = (background_count, background_count_stride, background_value, background_value_stride);
  if width < A {
    return portable::adjust_range_masked(c, cs, width, height, v, vs, threshold, mask, mask_stride);
  }
  adjust_neon::<true>(c, cs, width, height, v, vs, threshold, mask, mask_stride);
}

#[cfg(feature = "neon")]
#[target_feature(enable = "neon")]
pub(super) unsafe fn shift_range_masked_neon(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
  mask: *const u8,
  mask_stride: usize,
) {
  let (vs, bs, ms) = (value_stride, background_stride, mask_stride);
  if width < A {
    return portable::shift_range_masked(value, vs, width, height, background, bs, mask, ms);
  }
  update3_neon(
    value,
    vs,
    width,
    height,
    mask,
    ms,
    background,
    bs,
    |v, m, b| vbslq_u8(vtstq_u8(m, vdupq_n_u8(0xFF)), v, b),
    portable::shift_range_masked_row,
  );
}
