//! x86_64 edge background variants (SSE2, AVX2).
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::too_many_arguments)]

use core::{arch::x86_64::*, slice};

use super::portable;
use crate::simd::{self, x86_64::*};

// ─────────────────────────────────────────────────────────────────────────────
// SSE2
// ─────────────────────────────────────────────────────────────────────────────

/// `background = f(value, background)` over every row. With `OVERLAP` the
/// tail is one unaligned vector ending at the row end, otherwise `tail` runs
/// on the remaining bytes. Requires `width >= 16`.
#[cfg(feature = "sse2")]
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn update_sse2<const ALIGN: bool, const OVERLAP: bool>(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
  f: impl Fn(__m128i, __m128i) -> __m128i,
  tail: fn(&[u8], &mut [u8]),
) {
  const A: usize = 16;
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (rv, rb) = (value.add(y * value_stride), background.add(y * background_stride));
    let mut col = 0;
    while col < body {
      let b = load_sse2::<ALIGN>(rb.add(col));
      store_sse2::<ALIGN>(rb.add(col), f(load_sse2::<ALIGN>(rv.add(col)), b));
      col += A;
    }
    if body == width {
      continue;
    }
    if OVERLAP {
      let last = width - A;
      let b = load_sse2::<false>(rb.add(last));
      store_sse2::<false>(rb.add(last), f(load_sse2::<false>(rv.add(last)), b));
    } else {
      let len = width - body;
      tail(slice::from_raw_parts(rv.add(body), len), slice::from_raw_parts_mut(rb.add(body), len));
    }
  }
}

/// `target = f(a, b, target)` over every row with a scalar `tail`.
/// Requires `width >= 16`.
#[cfg(feature = "sse2")]
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn update3_sse2<const ALIGN: bool>(
  a: *const u8,
  a_stride: usize,
  width: usize,
  height: usize,
  b: *const u8,
  b_stride: usize,
  target: *mut u8,
  target_stride: usize,
  f: impl Fn(__m128i, __m128i, __m128i) -> __m128i,
  tail: fn(&[u8], &[u8], &mut [u8]),
) {
  const A: usize = 16;
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (ra, rb, rt) = (a.add(y * a_stride), b.add(y * b_stride), target.add(y * target_stride));
    let mut col = 0;
    while col < body {
      let t = load_sse2::<ALIGN>(rt.add(col));
      store_sse2::<ALIGN>(rt.add(col), f(load_sse2::<ALIGN>(ra.add(col)), load_sse2::<ALIGN>(rb.add(col)), t));
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

/// Shared body of the plain and masked range adjustment. `mask` is only read
/// when `MASKED`. Requires `width >= 16`.
#[cfg(feature = "sse2")]
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn adjust_sse2<const ALIGN: bool, const MASKED: bool>(
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
  const A: usize = 16;
  let body = simd::align_lo(width, A);
  let t = _mm_set1_epi8(threshold as i8);
  let one = _mm_set1_epi8(1);
  let zero = _mm_setzero_si128();
  for y in 0..height {
    let (rc, rv) = (count.add(y * count_stride), value.add(y * value_stride));
    let rm = if MASKED { mask.add(y * mask_stride) } else { mask };
    let mut col = 0;
    while col < body {
      let c = load_sse2::<ALIGN>(rc.add(col));
      let mut inc = _mm_andnot_si128(le_u8_sse2(c, t), one);
      let mut dec = _mm_andnot_si128(ge_u8_sse2(c, t), one);
      if MASKED {
        let selected = not_sse2(_mm_cmpeq_epi8(load_sse2::<ALIGN>(rm.add(col)), zero));
        inc = _mm_and_si128(inc, selected);
        dec = _mm_and_si128(dec, selected);
      }
      let v = load_sse2::<ALIGN>(rv.add(col));
      store_sse2::<ALIGN>(rv.add(col), _mm_subs_epu8(_mm_adds_epu8(v, inc), dec));
      store_sse2::<ALIGN>(rc.add(col), zero);
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

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn grow_range_slow_sse2(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  const A: usize = 16;
  if width < A {
    return portable::grow_range_slow(value, value_stride, width, height, background, background_stride);
  }
  let one = _mm_set1_epi8(1);
  let f = |v: __m128i, b: __m128i| _mm_adds_epu8(b, _mm_andnot_si128(le_u8_sse2(v, b), one));
  let row = portable::grow_range_slow_row;
  if simd::all_aligned(A, &[(value, value_stride), (background.cast_const(), background_stride)]) {
    update_sse2::<true, false>(value, value_stride, width, height, background, background_stride, f, row);
  } else {
    update_sse2::<false, false>(value, value_stride, width, height, background, background_stride, f, row);
  }
}

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn grow_range_fast_sse2(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  const A: usize = 16;
  if width < A {
    return portable::grow_range_fast(value, value_stride, width, height, background, background_stride);
  }
  let f = |v: __m128i, b: __m128i| _mm_max_epu8(b, v);
  let row = portable::grow_range_fast_row;
  if simd::all_aligned(A, &[(value, value_stride), (background.cast_const(), background_stride)]) {
    update_sse2::<true, true>(value, value_stride, width, height, background, background_stride, f, row);
  } else {
    update_sse2::<false, true>(value, value_stride, width, height, background, background_stride, f, row);
  }
}

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn shift_range_sse2(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  const A: usize = 16;
  if width < A {
    return portable::shift_range(value, value_stride, width, height, background, background_stride);
  }
  let f = |v: __m128i, _: __m128i| v;
  let row = portable::shift_range_row;
  if simd::all_aligned(A, &[(value, value_stride), (background.cast_const(), background_stride)]) {
    update_sse2::<true, true>(value, value_stride, width, height, background, background_stride, f, row);
  } else {
    update_sse2::<false, true>(value, value_stride, width, height, background, background_stride, f, row);
  }
}

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn increment_count_sse2(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background_value: *const u8,
  background_value_stride: usize,
  background_count: *mut u8,
  background_count_stride: usize,
) {
  const A: usize = 16;
  let (v, vs, bv, bvs, bc, bcs) =
    (value, value_stride, background_value, background_value_stride, background_count, background_count_stride);
  if width < A {
    return portable::increment_count(v, vs, width, height, bv, bvs, bc, bcs);
  }
  let one = _mm_set1_epi8(1);
  let f = |v: __m128i, bv: __m128i, c: __m128i| _mm_adds_epu8(c, _mm_andnot_si128(le_u8_sse2(v, bv), one));
  let row = portable::increment_count_row;
  if simd::all_aligned(A, &[(v, vs), (bv, bvs), (bc.cast_const(), bcs)]) {
    update3_sse2::<true>(v, vs, width, height, bv, bvs, bc, bcs, f, row);
  } else {
    update3_sse2::<false>(v, vs, width, height, bv, bvs, bc, bcs, f, row);
  }
}

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn adjust_range_sse2(
  background_count: *mut u8,
  background_count_stride: usize,
  width: usize,
  height: usize,
  background_value: *mut u8,
  background_value_stride: usize,
  threshold: u8,
) {
  const A: usize = 16;
  let (c, cs, v, vs) = (background_count, background_count_stride, background_value, background_value_stride);
  if width < A {
    return portable::adjust_range(c, cs, width, height, v, vs, threshold);
  }
  if simd::all_aligned(A, &[(c.cast_const(), cs), (v.cast_const(), vs)]) {
    adjust_sse2::<true, false>(c, cs, width, height, v, vs, threshold, core::ptr::null(), 0);
  } else {
    adjust_sse2::<false, false>(c, cs, width, height, v, vs, threshold, core::ptr::null(), 0);
  }
}

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn adjust_range_masked_sse2(
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
  const A: usize = 16;
  let (c, cs, v, vs) = (background_count, background_count_stride, background_value, background_value_stride);
  if width < A {
    return portable::adjust_range_masked(c, cs, width, height, v, vs, threshold, mask, mask_stride);
  }
  if simd::all_aligned(A, &[(c.cast_const(), cs), (v.cast_const(), vs), (mask, mask_stride)]) {
    adjust_sse2::<true, true>(c, cs, width, height, v, vs, threshold, mask, mask_stride);
  } else {
    adjust_sse2::<false, true>(c, cs, width, height, v, vs, threshold, mask, mask_stride);
  }
}

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn shift_range_masked_sse2(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
  mask: *const u8,
  mask_stride: usize,
) {
  const A: usize = 16;
  if width < A {
    let (vs, bs, ms) = (value_stride, background_stride, mask_stride);
    return portable::shift_range_masked(value, vs, width, height, background, bs, mask, ms);
  }
  let zero = _mm_setzero_si128();
  let f = |v: __m128i, m: __m128i, b: __m128i| blend_sse2(not_sse2(_mm_cmpeq_epi8(m, zero)), v, b);
  let row = portable::shift_range_masked_row;
  let (vs, bs, ms) = (value_stride, background_stride, mask_stride);
  if simd::all_aligned(A, &[(value, vs), (background.cast_const(), bs), (mask, ms)]) {
    update3_sse2::<true>(value, vs, width, height, mask, ms, background, bs, f, row);
  } else {
    update3_sse2::<false>(value, vs, width, height, mask, ms, background, bs, f, row);
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// AVX2
// ─────────────────────────────────────────────────────────────────────────────

/// 256-bit form of [`update_sse2`]. Requires `width >= 32`.
#[cfg(feature = "avx2")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn update_avx2<const ALIGN: bool, const OVERLAP: bool>(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
  f: impl Fn(__m256i, __m256i) -> __m256i,
  tail: fn(&[u8], &mut [u8]),
) {
  const A: usize = 32;
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (rv, rb) = (value.add(y * value_stride), background.add(y * background_stride));
    let mut col = 0;
    while col < body {
      let b = load_avx2::<ALIGN>(rb.add(col));
      store_avx2::<ALIGN>(rb.add(col), f(load_avx2::<ALIGN>(rv.add(col)), b));
      col += A;
    }
    if body == width {
      continue;
    }
    if OVERLAP {
      let last = width - A;
      let b = load_avx2::<false>(rb.add(last));
      store_avx2::<false>(rb.add(last), f(load_avx2::<false>(rv.add(last)), b));
    } else {
      let len = width - body;
      tail(slice::from_raw_parts(rv.add(body), len), slice::from_raw_parts_mut(rb.add(body), len));
    }
  }
}

/// 256-bit form of [`update3_sse2`]. Requires `width >= 32`.
#[cfg(feature = "avx2")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn update3_avx2<const ALIGN: bool>(
  a: *const u8,
  a_stride: usize,
  width: usize,
  height: usize,
  b: *const u8,
  b_stride: usize,
  target: *mut u8,
  target_stride: usize,
  f: impl Fn(__m256i, __m256i, __m256i) -> __m256i,
  tail: fn(&[u8], &[u8], &mut [u8]),
) {
  const A: usize = 32;
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (ra, rb, rt) = (a.add(y * a_stride), b.add(y * b_stride), target.add(y * target_stride));
    let mut col = 0;
    while col < body {
      let t = load_avx2::<ALIGN>(rt.add(col));
      store_avx2::<ALIGN>(rt.add(col), f(load_avx2::<ALIGN>(ra.add(col)), load_avx2::<ALIGN>(rb.add(col)), t));
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

/// 256-bit form of [`adjust_sse2`]. Requires `width >= 32`.
#[cfg(feature = "avx2")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn adjust_avx2<const ALIGN: bool, const MASKED: bool>(
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
  const A: usize = 32;
  let body = simd::align_lo(width, A);
  let t = _mm256_set1_epi8(threshold as i8);
  let one = _mm256_set1_epi8(1);
  let zero = _mm256_setzero_si256();
  for y in 0..height {
    let (rc, rv) = (count.add(y * count_stride), value.add(y * value_stride));
    let rm = if MASKED { mask.add(y * mask_stride) } else { mask };
    let mut col = 0;
    while col < body {
      let c = load_avx2::<ALIGN>(rc.add(col));
      let mut inc = _mm256_andnot_si256(le_u8_avx2(c, t), one);
      let mut dec = _mm256_andnot_si256(ge_u8_avx2(c, t), one);
      if MASKED {
        let selected = not_avx2(_mm256_cmpeq_epi8(load_avx2::<ALIGN>(rm.add(col)), zero));
        inc = _mm256_and_si256(inc, selected);
        dec = _mm256_and_si256(dec, selected);
      }
      let v = load_avx2::<ALIGN>(rv.add(col));
      store_avx2::<ALIGN>(rv.add(col), _mm256_subs_epu8(_mm256_adds_epu8(v, inc), dec));
      store_avx2::<ALIGN>(rc.add(col), zero);
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

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn grow_range_slow_avx2(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  const A: usize = 32;
  if width < A {
    return portable::grow_range_slow(value, value_stride, width, height, background, background_stride);
  }
  let one = _mm256_set1_epi8(1);
  let f = |v: __m256i, b: __m256i| _mm256_adds_epu8(b, _mm256_andnot_si256(le_u8_avx2(v, b), one));
  let row = portable::grow_range_slow_row;
  if simd::all_aligned(A, &[(value, value_stride), (background.cast_const(), background_stride)]) {
    update_avx2::<true, false>(value, value_stride, width, height, background, background_stride, f, row);
  } else {
    update_avx2::<false, false>(value, value_stride, width, height, background, background_stride, f, row);
  }
}

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn grow_range_fast_avx2(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  const A: usize = 32;
  if width < A {
    return portable::grow_range_fast(value, value_stride, width, height, background, background_stride);
  }
  let f = |v: __m256i, b: __m256i| _mm256_max_epu8(b, v);
  let row = portable::grow_range_fast_row;
  if simd::all_aligned(A, &[(value, value_stride), (background.cast_const(), background_stride)]) {
    update_avx2::<true, true>(value, value_stride, width, height, background, background_stride, f, row);
  } else {
    update_avx2::<false, true>(value, value_stride, width, height, background, background_stride, f, row);
  }
}

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn shift_range_avx2(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  const A: usize = 32;
  if width < A {
    return portable::shift_range(value, value_stride, width, height, background, background_stride);
  }
  let f = |v: __m256i, _: __m256i| v;
  let row = portable::shift_range_row;
  if simd::all_aligned(A, &[(value, value_stride), (background.cast_const(), background_stride)]) {
    update_avx2::<true, true>(value, value_stride, width, height, background, background_stride, f, row);
  } else {
    update_avx2::<false, true>(value, value_stride, width, height, background, background_stride, f, row);
  }
}

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn increment_count_avx2(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background_value: *const u8,
  background_value_stride: usize,
  background_count: *mut u8,
  background_count_stride: usize,
) {
  const A: usize = 32;
  let (v, vs, bv, bvs, bc, bcs) =
    (value, value_stride, background_value, background_value_stride, background_count, background_count_stride);
  if width < A {
    return portable::increment_count(v, vs, width, height, bv, bvs, bc, bcs);
  }
  let one = _mm256_set1_epi8(1);
  let f = |v: __m256i, bv: __m256i, c: __m256i| _mm256_adds_epu8(c, _mm256_andnot_si256(le_u8_avx2(v, bv), one));
  let row = portable::increment_count_row;
  if simd::all_aligned(A, &[(v, vs), (bv, bvs), (bc.cast_const(), bcs)]) {
    update3_avx2::<true>(v, vs, width, height, bv, bvs, bc, bcs, f, row);
  } else {
    update3_avx2::<false>(v, vs, width, height, bv, bvs, bc, bcs, f, row);
  }
}

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn adjust_range_avx2(
  background_count: *mut u8,
  background_count_stride: usize,
  width: usize,
  height: usize,
  background_value: *mut u8,
  background_value_stride: usize,
  threshold: u8,
) {
  const A: usize = 32;
  let (c, cs, v, vs) = (background_count, background_count_stride, background_value, background_value_stride);
  if width < A {
    return portable::adjust_range(c, cs, width, height, v, vs, threshold);
  }
  if simd::all_aligned(A, &[(c.cast_const(), cs), (v.cast_const(), vs)]) {
    adjust_avx2::<true, false>(c, cs, width, height, v, vs, threshold, core::ptr::null(), 0);
  } else {
    adjust_avx2::<false, false>(c, cs, width, height, v, vs, threshold, core::ptr::null(), 0);
  }
}

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn adjust_range_masked_avx2(
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
  const A: usize = 32;
  let (c, cs, v, vs) = (background_count, background_count_stride, background_value, background_value_stride);
  if width < A {
    return portable::adjust_range_masked(c, cs, width, height, v, vs, threshold, mask, mask_stride);
  }
  if simd::all_aligned(A, &[(c.cast_const(), cs), (v.cast_const(), vs), (mask, mask_stride)]) {
    adjust_avx2::<true, true>(c, cs, width, height, v, vs, threshold, mask, mask_stride);
  } else {
    adjust_avx2::<false, true>(c, cs, width, height, v, vs, threshold, mask, mask_stride);
  }
}

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn shift_range_masked_avx2(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
  mask: *const u8,
  mask_stride: usize,
) {
  const A: usize = 32;
  if width < A {
    let (vs, bs, ms) = (value_stride, background_stride, mask_stride);
    return portable::shift_range_masked(value, vs, width, height, background, bs, mask, ms);
  }
  let zero = _mm256_setzero_si256();
  let f = |v: __m256i, m: __m256i, b: __m256i| blend_avx2(not_avx2(_mm256_cmpeq_epi8(m, zero)), v, b);
  let row = portable::shift_range_masked_row;
  let (vs, bs, ms) = (value_stride, background_stride, mask_stride);
  if simd::all_aligned(A, &[(value, vs), (background.cast_const(), bs), (mask, ms)]) {
    update3_avx2::<true>(value, vs, width, height, mask, ms, background, bs, f, row);
  } else {
    update3_avx2::<false>(value, vs, width, height, mask, ms, background, bs, f, row);
  }
}
