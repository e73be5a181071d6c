//! x86_64 binary operation variants (SSE2, AVX2, AVX-512BW).
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::too_many_arguments)]

use core::arch::x86_64::*;

use super::{OperationBinary8u, portable};
use crate::simd::{self, x86_64::*};

// ─────────────────────────────────────────────────────────────────────────────
// SSE2
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sse2")]
#[target_feature(enable = "sse2")]
pub(super) unsafe fn operation_binary8u_sse2(
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
  const A: usize = 16;
  if width < A {
    return portable::operation_binary8u(a, a_stride, b, b_stride, width, height, dst, dst_stride, op);
  }
  if simd::all_aligned(A, &[(a, a_stride), (b, b_stride), (dst.cast_const(), dst_stride)]) {
    operation_sse2::<true>(a, a_stride, b, b_stride, width, height, dst, dst_stride, op);
  } else {
    operation_sse2::<false>(a, a_stride, b, b_stride, width, height, dst, dst_stride, op);
  }
}

#[cfg(feature = "sse2")]
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn operation_sse2<const ALIGN: bool>(
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
  match op {
    OperationBinary8u::Average => {
      binary_sse2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm_avg_epu8(x, y));
    }
    OperationBinary8u::And => {
      binary_sse2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm_and_si128(x, y));
    }
    OperationBinary8u::Or => {
      binary_sse2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm_or_si128(x, y));
    }
    OperationBinary8u::Maximum => {
      binary_sse2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm_max_epu8(x, y));
    }
    OperationBinary8u::Minimum => {
      binary_sse2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm_min_epu8(x, y));
    }
    OperationBinary8u::SaturatedSubtraction => {
      binary_sse2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm_subs_epu8(x, y));
    }
    OperationBinary8u::SaturatedAddition => {
      binary_sse2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm_adds_epu8(x, y));
    }
  }
}

/// Bulk vectors at `ALIGN`, then one unaligned vector ending at the row end.
/// Requires `width >= 16`.
#[cfg(feature = "sse2")]
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn binary_sse2<const ALIGN: bool>(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
  dst: *mut u8,
  dst_stride: usize,
  f: impl Fn(__m128i, __m128i) -> __m128i,
) {
  const A: usize = 16;
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (ra, rb, rd) = (a.add(y * a_stride), b.add(y * b_stride), dst.add(y * dst_stride));
    let mut col = 0;
    while col < body {
      store_sse2::<ALIGN>(rd.add(col), f(load_sse2::<ALIGN>(ra.add(col)), load_sse2::<ALIGN>(rb.add(col))));
      col += A;
    }
    if body != width {
      let last = width - A;
      store_sse2::<false>(rd.add(last), f(load_sse2::<false>(ra.add(last)), load_sse2::<false>(rb.add(last))));
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// AVX2
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "avx2")]
#[target_feature(enable = "avx2")]
pub(super) unsafe fn operation_binary8u_avx2(
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
  const A: usize = 32;
  if width < A {
    return portable::operation_binary8u(a, a_stride, b, b_stride, width, height, dst, dst_stride, op);
  }
  if simd::all_aligned(A, &[(a, a_stride), (b, b_stride), (dst.cast_const(), dst_stride)]) {
    operation_avx2::<true>(a, a_stride, b, b_stride, width, height, dst, dst_stride, op);
  } else {
    operation_avx2::<false>(a, a_stride, b, b_stride, width, height, dst, dst_stride, op);
  }
}

#[cfg(feature = "avx2")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn operation_avx2<const ALIGN: bool>(
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
  match op {
    OperationBinary8u::Average => {
      binary_avx2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm256_avg_epu8(x, y));
    }
    OperationBinary8u::And => {
      binary_avx2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm256_and_si256(x, y));
    }
    OperationBinary8u::Or => {
      binary_avx2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm256_or_si256(x, y));
    }
    OperationBinary8u::Maximum => {
      binary_avx2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm256_max_epu8(x, y));
    }
    OperationBinary8u::Minimum => {
      binary_avx2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm256_min_epu8(x, y));
    }
    OperationBinary8u::SaturatedSubtraction => {
      binary_avx2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm256_subs_epu8(x, y));
    }
    OperationBinary8u::SaturatedAddition => {
      binary_avx2::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm256_adds_epu8(x, y));
    }
  }
}

/// Bulk vectors at `ALIGN`, then one unaligned vector ending at the row end.
/// Requires `width >= 32`.
#[cfg(feature = "avx2")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn binary_avx2<const ALIGN: bool>(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
  dst: *mut u8,
  dst_stride: usize,
  f: impl Fn(__m256i, __m256i) -> __m256i,
) {
  const A: usize = 32;
  let body = simd::align_lo(width, A);
  for y in 0..height {
    let (ra, rb, rd) = (a.add(y * a_stride), b.add(y * b_stride), dst.add(y * dst_stride));
    let mut col = 0;
    while col < body {
      store_avx2::<ALIGN>(rd.add(col), f(load_avx2::<ALIGN>(ra.add(col)), load_avx2::<ALIGN>(rb.add(col))));
      col += A;
    }
    if body != width {
      let last = width - A;
      store_avx2::<false>(rd.add(last), f(load_avx2::<false>(ra.add(last)), load_avx2::<false>(rb.add(last))));
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// AVX-512BW
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "avx512bw")]
#[target_feature(enable = "avx512f,avx512bw")]
pub(super) unsafe fn operation_binary8u_avx512bw(
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
  const A: usize = 64;
  if simd::all_aligned(A, &[(a, a_stride), (b, b_stride), (dst.cast_const(), dst_stride)]) {
    operation_avx512bw::<true>(a, a_stride, b, b_stride, width, height, dst, dst_stride, op);
  } else {
    operation_avx512bw::<false>(a, a_stride, b, b_stride, width, height, dst, dst_stride, op);
  }
}

#[cfg(feature = "avx512bw")]
#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn operation_avx512bw<const ALIGN: bool>(
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
  match op {
    OperationBinary8u::Average => {
      binary_avx512bw::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm512_avg_epu8(x, y));
    }
    OperationBinary8u::And => {
      binary_avx512bw::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm512_and_si512(x, y));
    }
    OperationBinary8u::Or => {
      binary_avx512bw::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm512_or_si512(x, y));
    }
    OperationBinary8u::Maximum => {
      binary_avx512bw::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm512_max_epu8(x, y));
    }
    OperationBinary8u::Minimum => {
      binary_avx512bw::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| _mm512_min_epu8(x, y));
    }
    OperationBinary8u::SaturatedSubtraction => {
      binary_avx512bw::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| {
        _mm512_subs_epu8(x, y)
      });
    }
    OperationBinary8u::SaturatedAddition => {
      binary_avx512bw::<ALIGN>(a, a_stride, b, b_stride, width, height, dst, dst_stride, |x, y| {
        _mm512_adds_epu8(x, y)
      });
    }
  }
}

/// Bulk vectors at `ALIGN`, then one masked vector covering the tail. Any
/// width is accepted.
#[cfg(feature = "avx512bw")]
#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn binary_avx512bw<const ALIGN: bool>(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
  dst: *mut u8,
  dst_stride: usize,
  f: impl Fn(__m512i, __m512i) -> __m512i,
) {
  const A: usize = 64;
  let body = simd::align_lo(width, A);
  let tail = tail_mask(width - body);
  for y in 0..height {
    let (ra, rb, rd) = (a.add(y * a_stride), b.add(y * b_stride), dst.add(y * dst_stride));
    let mut col = 0;
    while col < body {
      store_avx512::<ALIGN>(rd.add(col), f(load_avx512::<ALIGN>(ra.add(col)), load_avx512::<ALIGN>(rb.add(col))));
      col += A;
    }
    if body != width {
      let value = f(load_avx512_masked(ra.add(body), tail), load_avx512_masked(rb.add(body), tail));
      store_avx512_masked(rd.add(body), tail, value);
    }
  }
}
