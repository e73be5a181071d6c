//! x86_64 binarization variants (SSE2, AVX2, AVX-512BW).
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::too_many_arguments)]

use core::arch::x86_64::*;

use super::{CompareType, portable};
use crate::simd::{self, x86_64::*};

// ─────────────────────────────────────────────────────────────────────────────
// SSE2
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn binarization_sse2(
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
  const A: usize = 16;
  if width < A {
    return portable::binarization(src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare);
  }
  if simd::all_aligned(A, &[(src, src_stride), (dst.cast_const(), dst_stride)]) {
    binarization_sse2_impl::<true>(
      src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare,
    );
  } else {
    binarization_sse2_impl::<false>(
      src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare,
    );
  }
}

#[cfg(feature = "sse2")]
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn binarization_sse2_impl<const ALIGN: bool>(
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
  let v = _mm_set1_epi8(value as i8);
  let (pos, neg) = (_mm_set1_epi8(positive as i8), _mm_set1_epi8(negative as i8));
  match compare {
    CompareType::Equal => {
      binarize_sse2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| _mm_cmpeq_epi8(s, v));
    }
    CompareType::NotEqual => {
      binarize_sse2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| {
        not_sse2(_mm_cmpeq_epi8(s, v))
      });
    }
    CompareType::Greater => {
      binarize_sse2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| not_sse2(le_u8_sse2(s, v)));
    }
    CompareType::GreaterOrEqual => {
      binarize_sse2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| ge_u8_sse2(s, v));
    }
    CompareType::Lesser => {
      binarize_sse2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| not_sse2(ge_u8_sse2(s, v)));
    }
    CompareType::LesserOrEqual => {
      binarize_sse2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| le_u8_sse2(s, v));
    }
  }
}

/// Requires `width >= 16`. The last vector of a row overlaps the body.
#[cfg(feature = "sse2")]
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn binarize_sse2<const ALIGN: bool>(
  src: *const u8,
  src_stride: usize,
  width: usize,
  height: usize,
  positive: __m128i,
  negative: __m128i,
  dst: *mut u8,
  dst_stride: usize,
  mask: impl Fn(__m128i) -> __m128i,
) {
  const A: usize = 16;
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (rs, rd) = (src.add(y * src_stride), dst.add(y * dst_stride));
    let mut col = 0;
    while col < body {
      store_sse2::<ALIGN>(rd.add(col), blend_sse2(mask(load_sse2::<ALIGN>(rs.add(col))), positive, negative));
      col += A;
    }
    if body != width {
      let last = width - A;
      store_sse2::<false>(rd.add(last), blend_sse2(mask(load_sse2::<false>(rs.add(last))), positive, negative));
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// AVX2
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn binarization_avx2(
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
  const A: usize = 32;
  if width < A {
    return portable::binarization(src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare);
  }
  if simd::all_aligned(A, &[(src, src_stride), (dst.cast_const(), dst_stride)]) {
    binarization_avx2_impl::<true>(
      src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare,
    );
  } else {
    binarization_avx2_impl::<false>(
      src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare,
    );
  }
}

#[cfg(feature = "avx2")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn binarization_avx2_impl<const ALIGN: bool>(
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
  let v = _mm256_set1_epi8(value as i8);
  let (pos, neg) = (_mm256_set1_epi8(positive as i8), _mm256_set1_epi8(negative as i8));
  match compare {
    CompareType::Equal => {
      binarize_avx2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| _mm256_cmpeq_epi8(s, v));
    }
    CompareType::NotEqual => {
      binarize_avx2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| {
        not_avx2(_mm256_cmpeq_epi8(s, v))
      });
    }
    CompareType::Greater => {
      binarize_avx2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| not_avx2(le_u8_avx2(s, v)));
    }
    CompareType::GreaterOrEqual => {
      binarize_avx2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| ge_u8_avx2(s, v));
    }
    CompareType::Lesser => {
      binarize_avx2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| not_avx2(ge_u8_avx2(s, v)));
    }
    CompareType::LesserOrEqual => {
      binarize_avx2::<ALIGN>(src, src_stride, width, height, pos, neg, dst, dst_stride, |s| le_u8_avx2(s, v));
    }
  }
}

/// Requires `width >= 32`. The last vector of a row overlaps the body.
#[cfg(feature = "avx2")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn binarize_avx2<const ALIGN: bool>(
  src: *const u8,
  src_stride: usize,
  width: usize,
  height: usize,
  positive: __m256i,
  negative: __m256i,
  dst: *mut u8,
  dst_stride: usize,
  mask: impl Fn(__m256i) -> __m256i,
) {
  const A: usize = 32;
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (rs, rd) = (src.add(y * src_stride), dst.add(y * dst_stride));
    let mut col = 0;
    while col < body {
      store_avx2::<ALIGN>(rd.add(col), blend_avx2(mask(load_avx2::<ALIGN>(rs.add(col))), positive, negative));
      col += A;
    }
    if body != width {
      let last = width - A;
      store_avx2::<false>(rd.add(last), blend_avx2(mask(load_avx2::<false>(rs.add(last))), positive, negative));
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// AVX-512BW
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "avx512bw")]
#[target_feature(enable = "avx512f,avx512bw")]
pub(super) unsafe fn binarization_avx512bw(
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
  const A: usize = 64;
  if simd::all_aligned(A, &[(src, src_stride), (dst.cast_const(), dst_stride)]) {
    binarization_avx512bw_impl::<true>(
      src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare,
    );
  } else {
    binarization_avx512bw_impl::<false>(
      src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare,
    );
  }
}

#[cfg(feature = "avx512bw")]
#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn binarization_avx512bw_impl<const ALIGN: bool>(
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
  let v = _mm512_set1_epi8(value as i8);
  let (pos, neg) = (_mm512_set1_epi8(positive as i8), _mm512_set1_epi8(negative as i8));
  let (s, ss, w, h, d, ds) = (src, src_stride, width, height, dst, dst_stride);
  match compare {
    CompareType::Equal => binarize_avx512bw::<ALIGN>(s, ss, w, h, pos, neg, d, ds, |x| _mm512_cmpeq_epu8_mask(x, v)),
    CompareType::NotEqual => {
      binarize_avx512bw::<ALIGN>(s, ss, w, h, pos, neg, d, ds, |x| _mm512_cmpneq_epu8_mask(x, v));
    }
    CompareType::Greater => binarize_avx512bw::<ALIGN>(s, ss, w, h, pos, neg, d, ds, |x| _mm512_cmpgt_epu8_mask(x, v)),
    CompareType::GreaterOrEqual => {
      binarize_avx512bw::<ALIGN>(s, ss, w, h, pos, neg, d, ds, |x| _mm512_cmpge_epu8_mask(x, v));
    }
    CompareType::Lesser => binarize_avx512bw::<ALIGN>(s, ss, w, h, pos, neg, d, ds, |x| _mm512_cmplt_epu8_mask(x, v)),
    CompareType::LesserOrEqual => {
      binarize_avx512bw::<ALIGN>(s, ss, w, h, pos, neg, d, ds, |x| _mm512_cmple_epu8_mask(x, v));
    }
  }
}

/// The compare yields a lane mask directly, so the tail is a masked
/// load/blend/store over the remaining bytes. Any width is accepted.
#[cfg(feature = "avx512bw")]
#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn binarize_avx512bw<const ALIGN: bool>(
  src: *const u8,
  src_stride: usize,
  width: usize,
  height: usize,
  positive: __m512i,
  negative: __m512i,
  dst: *mut u8,
  dst_stride: usize,
  mask: impl Fn(__m512i) -> __mmask64,
) {
  const A: usize = 64;
  let body = simd::align_lo(width, A);
  let tail = tail_mask(width - body);
  for y in 0..height {
    let (rs, rd) = (src.add(y * src_stride), dst.add(y * dst_stride));
    let mut col = 0;
    while col < body {
      let k = mask(load_avx512::<ALIGN>(rs.add(col)));
      store_avx512::<ALIGN>(rd.add(col), _mm512_mask_blend_epi8(k, negative, positive));
      col += A;
    }
    if body != width {
      let k = mask(load_avx512_masked(rs.add(body), tail));
      store_avx512_masked(rd.add(body), tail, _mm512_mask_blend_epi8(k, negative, positive));
    }
  }
}
