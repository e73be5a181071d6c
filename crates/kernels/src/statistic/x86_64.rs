//! x86_64 statistic variants (SSE2, AVX2, AVX-512BW).
//!
//! # Safety
//!
//! Callers must ensure the tier's features are available (the dispatcher does
//! this) and uphold the row contracts of the entry points in `super`.
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::too_many_arguments)]

use core::{arch::x86_64::*, slice};

use super::{Statistic, portable};
use crate::simd::{self, x86_64::*};

// ─────────────────────────────────────────────────────────────────────────────
// SSE2
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn abs_difference_sum_sse2(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
) -> u64 {
  const A: usize = 16;
  if width < A {
    return portable::abs_difference_sum(a, a_stride, b, b_stride, width, height);
  }
  if simd::all_aligned(A, &[(a, a_stride), (b, b_stride)]) {
    abs_difference_sum_sse2_impl::<true>(a, a_stride, b, b_stride, width, height)
  } else {
    abs_difference_sum_sse2_impl::<false>(a, a_stride, b, b_stride, width, height)
  }
}

#[cfg(feature = "sse2")]
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn abs_difference_sum_sse2_impl<const ALIGN: bool>(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
) -> u64 {
  const A: usize = 16;
  let body = simd::align_lo(width, A);
  let mut sum = _mm_setzero_si128();
  let mut tail = 0u64;

  for y in 0..height {
    let (ra, rb) = (a.add(y * a_stride), b.add(y * b_stride));
    let mut col = 0;
    while col < body {
      let va = load_sse2::<ALIGN>(ra.add(col));
      let vb = load_sse2::<ALIGN>(rb.add(col));
      sum = _mm_add_epi64(sum, _mm_sad_epu8(va, vb));
      col += A;
    }
    if body != width {
      let len = width - body;
      tail += portable::abs_difference_sum_row(
        slice::from_raw_parts(ra.add(body), len),
        slice::from_raw_parts(rb.add(body), len),
      );
    }
  }

  sum_u64x2(sum) + tail
}

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn abs_difference_sum_masked_sse2(
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
  const A: usize = 16;
  if width < A {
    return portable::abs_difference_sum_masked(a, a_stride, b, b_stride, mask, mask_stride, index, width, height);
  }
  if simd::all_aligned(A, &[(a, a_stride), (b, b_stride), (mask, mask_stride)]) {
    abs_difference_sum_masked_sse2_impl::<true>(a, a_stride, b, b_stride, mask, mask_stride, index, width, height)
  } else {
    abs_difference_sum_masked_sse2_impl::<false>(a, a_stride, b, b_stride, mask, mask_stride, index, width, height)
  }
}

#[cfg(feature = "sse2")]
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn abs_difference_sum_masked_sse2_impl<const ALIGN: bool>(
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
  const A: usize = 16;
  let body = simd::align_lo(width, A);
  let zero = _mm_setzero_si128();
  let vindex = _mm_set1_epi8(index as i8);
  let mut sum = _mm_setzero_si128();
  let mut tail = 0u64;

  for y in 0..height {
    let (ra, rb, rm) = (a.add(y * a_stride), b.add(y * b_stride), mask.add(y * mask_stride));
    let mut col = 0;
    while col < body {
      let selected = _mm_cmpeq_epi8(load_sse2::<ALIGN>(rm.add(col)), vindex);
      let diff = abs_diff_u8_sse2(load_sse2::<ALIGN>(ra.add(col)), load_sse2::<ALIGN>(rb.add(col)));
      sum = _mm_add_epi64(sum, _mm_sad_epu8(_mm_and_si128(selected, diff), zero));
      col += A;
    }
    if body != width {
      let len = width - body;
      tail += portable::abs_difference_sum_masked_row(
        slice::from_raw_parts(ra.add(body), len),
        slice::from_raw_parts(rb.add(body), len),
        slice::from_raw_parts(rm.add(body), len),
        index,
      );
    }
  }

  sum_u64x2(sum) + tail
}

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn get_statistic_sse2(src: *const u8, stride: usize, width: usize, height: usize) -> Statistic {
  const A: usize = 16;
  if width < A || height == 0 {
    return portable::get_statistic(src, stride, width, height);
  }
  if simd::all_aligned(A, &[(src, stride)]) {
    get_statistic_sse2_impl::<true>(src, stride, width, height)
  } else {
    get_statistic_sse2_impl::<false>(src, stride, width, height)
  }
}

#[cfg(feature = "sse2")]
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn get_statistic_sse2_impl<const ALIGN: bool>(
  src: *const u8,
  stride: usize,
  width: usize,
  height: usize,
) -> Statistic {
  const A: usize = 16;
  let body = simd::align_lo(width, A);
  let zero = _mm_setzero_si128();
  let mut vmin = _mm_set1_epi8(-1);
  let mut vmax = zero;
  let mut vsum = zero;
  let (mut min, mut max, mut sum) = (u8::MAX, 0u8, 0u64);

  for y in 0..height {
    let row = src.add(y * stride);
    let mut col = 0;
    while col < body {
      let value = load_sse2::<ALIGN>(row.add(col));
      vmin = _mm_min_epu8(vmin, value);
      vmax = _mm_max_epu8(vmax, value);
      vsum = _mm_add_epi64(vsum, _mm_sad_epu8(value, zero));
      col += A;
    }
    if body != width {
      sum += portable::statistic_row(slice::from_raw_parts(row.add(body), width - body), &mut min, &mut max);
    }
  }

  min = to_bytes_sse2(vmin).into_iter().fold(min, u8::min);
  max = to_bytes_sse2(vmax).into_iter().fold(max, u8::max);
  portable::finish_statistic(min, max, sum + sum_u64x2(vsum), width * height)
}

// ─────────────────────────────────────────────────────────────────────────────
// AVX2
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn abs_difference_sum_avx2(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
) -> u64 {
  const A: usize = 32;
  if width < A {
    return portable::abs_difference_sum(a, a_stride, b, b_stride, width, height);
  }
  if simd::all_aligned(A, &[(a, a_stride), (b, b_stride)]) {
    abs_difference_sum_avx2_impl::<true>(a, a_stride, b, b_stride, width, height)
  } else {
    abs_difference_sum_avx2_impl::<false>(a, a_stride, b, b_stride, width, height)
  }
}

#[cfg(feature = "avx2")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn abs_difference_sum_avx2_impl<const ALIGN: bool>(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
) -> u64 {
  const A: usize = 32;
  let body = simd::align_lo(width, A);
  let mut sum = _mm256_setzero_si256();
  let mut tail = 0u64;

  for y in 0..height {
    let (ra, rb) = (a.add(y * a_stride), b.add(y * b_stride));
    let mut col = 0;
    while col < body {
      let va = load_avx2::<ALIGN>(ra.add(col));
      let vb = load_avx2::<ALIGN>(rb.add(col));
      sum = _mm256_add_epi64(sum, _mm256_sad_epu8(va, vb));
      col += A;
    }
    if body != width {
      let len = width - body;
      tail += portable::abs_difference_sum_row(
        slice::from_raw_parts(ra.add(body), len),
        slice::from_raw_parts(rb.add(body), len),
      );
    }
  }

  sum_u64x4(sum) + tail
}

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn abs_difference_sum_masked_avx2(
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
  const A: usize = 32;
  if width < A {
    return portable::abs_difference_sum_masked(a, a_stride, b, b_stride, mask, mask_stride, index, width, height);
  }
  if simd::all_aligned(A, &[(a, a_stride), (b, b_stride), (mask, mask_stride)]) {
    abs_difference_sum_masked_avx2_impl::<true>(a, a_stride, b, b_stride, mask, mask_stride, index, width, height)
  } else {
    abs_difference_sum_masked_avx2_impl::<false>(a, a_stride, b, b_stride, mask, mask_stride, index, width, height)
  }
}

#[cfg(feature = "avx2")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn abs_difference_sum_masked_avx2_impl<const ALIGN: bool>(
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
  const A: usize = 32;
  let body = simd::align_lo(width, A);
  let zero = _mm256_setzero_si256();
  let vindex = _mm256_set1_epi8(index as i8);
  let mut sum = _mm256_setzero_si256();
  let mut tail = 0u64;

  for y in 0..height {
    let (ra, rb, rm) = (a.add(y * a_stride), b.add(y * b_stride), mask.add(y * mask_stride));
    let mut col = 0;
    while col < body {
      let selected = _mm256_cmpeq_epi8(load_avx2::<ALIGN>(rm.add(col)), vindex);
      let diff = abs_diff_u8_avx2(load_avx2::<ALIGN>(ra.add(col)), load_avx2::<ALIGN>(rb.add(col)));
      sum = _mm256_add_epi64(sum, _mm256_sad_epu8(_mm256_and_si256(selected, diff), zero));
      col += A;
    }
    if body != width {
      let len = width - body;
      tail += portable::abs_difference_sum_masked_row(
        slice::from_raw_parts(ra.add(body), len),
        slice::from_raw_parts(rb.add(body), len),
        slice::from_raw_parts(rm.add(body), len),
        index,
      );
    }
  }

  sum_u64x4(sum) + tail
}

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn get_statistic_avx2(src: *const u8, stride: usize, width: usize, height: usize) -> Statistic {
  const A: usize = 32;
  if width < A || height == 0 {
    return portable::get_statistic(src, stride, width, height);
  }
  if simd::all_aligned(A, &[(src, stride)]) {
    get_statistic_avx2_impl::<true>(src, stride, width, height)
  } else {
    get_statistic_avx2_impl::<false>(src, stride, width, height)
  }
}

#[cfg(feature = "avx2")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn get_statistic_avx2_impl<const ALIGN: bool>(
  src: *const u8,
  stride: usize,
  width: usize,
  height: usize,
) -> Statistic {
  const A: usize = 32;
  let body = simd::align_lo(width, A);
  let zero = _mm256_setzero_si256();
  let mut vmin = _mm256_set1_epi8(-1);
  let mut vmax = zero;
  let mut vsum = zero;
  let (mut min, mut max, mut sum) = (u8::MAX, 0u8, 0u64);

  for y in 0..height {
    let row = src.add(y * stride);
    let mut col = 0;
    while col < body {
      let value = load_avx2::<ALIGN>(row.add(col));
      vmin = _mm256_min_epu8(vmin, value);
      vmax = _mm256_max_epu8(vmax, value);
      vsum = _mm256_add_epi64(vsum, _mm256_sad_epu8(value, zero));
      col += A;
    }
    if body != width {
      sum += portable::statistic_row(slice::from_raw_parts(row.add(body), width - body), &mut min, &mut max);
    }
  }

  min = to_bytes_avx2(vmin).into_iter().fold(min, u8::min);
  max = to_bytes_avx2(vmax).into_iter().fold(max, u8::max);
  portable::finish_statistic(min, max, sum + sum_u64x4(vsum), width * height)
}

// ─────────────────────────────────────────────────────────────────────────────
// AVX-512BW
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "avx512bw")]
#[target_feature(enable = "avx512f,avx512bw")]
pub(super) unsafe fn abs_difference_sum_avx512bw(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
) -> u64 {
  const A: usize = 64;
  if simd::all_aligned(A, &[(a, a_stride), (b, b_stride)]) {
    abs_difference_sum_avx512bw_impl::<true>(a, a_stride, b, b_stride, width, height)
  } else {
    abs_difference_sum_avx512bw_impl::<false>(a, a_stride, b, b_stride, width, height)
  }
}

#[cfg(feature = "avx512bw")]
#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn abs_difference_sum_avx512bw_impl<const ALIGN: bool>(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
) -> u64 {
  const A: usize = 64;
  let body = simd::align_lo(width, A);
  let tail = tail_mask(width - body);
  let mut sum = _mm512_setzero_si512();

  for y in 0..height {
    let (ra, rb) = (a.add(y * a_stride), b.add(y * b_stride));
    let mut col = 0;
    while col < body {
      let va = load_avx512::<ALIGN>(ra.add(col));
      let vb = load_avx512::<ALIGN>(rb.add(col));
      sum = _mm512_add_epi64(sum, _mm512_sad_epu8(va, vb));
      col += A;
    }
    if body != width {
      let va = load_avx512_masked(ra.add(body), tail);
      let vb = load_avx512_masked(rb.add(body), tail);
      sum = _mm512_add_epi64(sum, _mm512_sad_epu8(va, vb));
    }
  }

  _mm512_reduce_add_epi64(sum) as u64
}

#[cfg(feature = "avx512bw")]
#[target_feature(enable = "avx512f,avx512bw")]
pub(super) unsafe fn abs_difference_sum_masked_avx512bw(
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
  const A: usize = 64;
  if simd::all_aligned(A, &[(a, a_stride), (b, b_stride), (mask, mask_stride)]) {
    abs_difference_sum_masked_avx512bw_impl::<true>(a, a_stride, b, b_stride, mask, mask_stride, index, width, height)
  } else {
    abs_difference_sum_masked_avx512bw_impl::<false>(a, a_stride, b, b_stride, mask, mask_stride, index, width, height)
  }
}

#[cfg(feature = "avx512bw")]
#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn abs_difference_sum_masked_avx512bw_impl<const ALIGN: bool>(
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
  const A: usize = 64;
  let body = simd::align_lo(width, A);
  let tail = tail_mask(width - body);
  let zero = _mm512_setzero_si512();
  let vindex = _mm512_set1_epi8(index as i8);
  let mut sum = _mm512_setzero_si512();

  for y in 0..height {
    let (ra, rb, rm) = (a.add(y * a_stride), b.add(y * b_stride), mask.add(y * mask_stride));
    let mut col = 0;
    while col < body {
      let selected = _mm512_cmpeq_epi8_mask(load_avx512::<ALIGN>(rm.add(col)), vindex);
      let diff = abs_diff_u8_avx512(load_avx512::<ALIGN>(ra.add(col)), load_avx512::<ALIGN>(rb.add(col)));
      sum = _mm512_add_epi64(sum, _mm512_sad_epu8(_mm512_maskz_mov_epi8(selected, diff), zero));
      col += A;
    }
    if body != width {
      // Masked-off lanes load as zero in both images, so their difference is zero.
      let selected = _mm512_cmpeq_epi8_mask(load_avx512_masked(rm.add(body), tail), vindex) & tail;
      let diff = abs_diff_u8_avx512(load_avx512_masked(ra.add(body), tail), load_avx512_masked(rb.add(body), tail));
      sum = _mm512_add_epi64(sum, _mm512_sad_epu8(_mm512_maskz_mov_epi8(selected, diff), zero));
    }
  }

  _mm512_reduce_add_epi64(sum) as u64
}
