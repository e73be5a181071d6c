//! x86_64 load/store and unsigned-compare helpers.
//!
//! Loads and stores take `const ALIGN: bool`: `true` uses the aligned
//! instruction form and requires the pointer to be a multiple of the vector
//! width, `false` accepts any address. Results are identical.
//!
//! SSE2 is part of the x86_64 baseline, so the 128-bit helpers carry no
//! `target_feature` attribute.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use core::{arch::x86_64::*, ptr};

// ─────────────────────────────────────────────────────────────────────────────
// SSE2 (128-bit)
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
pub(crate) unsafe fn load_sse2<const ALIGN: bool>(src: *const u8) -> __m128i {
  if ALIGN { _mm_load_si128(src.cast()) } else { _mm_loadu_si128(src.cast()) }
}

#[inline]
pub(crate) unsafe fn store_sse2<const ALIGN: bool>(dst: *mut u8, value: __m128i) {
  if ALIGN { _mm_store_si128(dst.cast(), value) } else { _mm_storeu_si128(dst.cast(), value) }
}

/// `0xFF` where `a >= b` (unsigned), `0x00` elsewhere.
#[inline]
pub(crate) unsafe fn ge_u8_sse2(a: __m128i, b: __m128i) -> __m128i {
  _mm_cmpeq_epi8(_mm_max_epu8(a, b), a)
}

/// `0xFF` where `a <= b` (unsigned), `0x00` elsewhere.
#[inline]
pub(crate) unsafe fn le_u8_sse2(a: __m128i, b: __m128i) -> __m128i {
  _mm_cmpeq_epi8(_mm_min_epu8(a, b), a)
}

#[inline]
pub(crate) unsafe fn not_sse2(a: __m128i) -> __m128i {
  _mm_xor_si128(a, _mm_set1_epi8(-1))
}

/// Bytewise `mask ? positive : negative`.
#[inline]
pub(crate) unsafe fn blend_sse2(mask: __m128i, positive: __m128i, negative: __m128i) -> __m128i {
  _mm_or_si128(_mm_and_si128(mask, positive), _mm_andnot_si128(mask, negative))
}

/// `|a - b|` per unsigned byte.
#[inline]
pub(crate) unsafe fn abs_diff_u8_sse2(a: __m128i, b: __m128i) -> __m128i {
  _mm_or_si128(_mm_subs_epu8(a, b), _mm_subs_epu8(b, a))
}

/// Sum of both 64-bit lanes.
#[inline]
pub(crate) unsafe fn sum_u64x2(v: __m128i) -> u64 {
  let lo = _mm_cvtsi128_si64(v) as u64;
  let hi = _mm_cvtsi128_si64(_mm_unpackhi_epi64(v, v)) as u64;
  lo.wrapping_add(hi)
}

/// Spill a vector to bytes.
#[inline]
pub(crate) unsafe fn to_bytes_sse2(v: __m128i) -> [u8; 16] {
  let mut out = [0u8; 16];
  _mm_storeu_si128(out.as_mut_ptr().cast(), v);
  out
}

// ─────────────────────────────────────────────────────────────────────────────
// AVX2 (256-bit)
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn load_avx2<const ALIGN: bool>(src: *const u8) -> __m256i {
  if ALIGN { _mm256_load_si256(src.cast()) } else { _mm256_loadu_si256(src.cast()) }
}

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn store_avx2<const ALIGN: bool>(dst: *mut u8, value: __m256i) {
  if ALIGN { _mm256_store_si256(dst.cast(), value) } else { _mm256_storeu_si256(dst.cast(), value) }
}

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn ge_u8_avx2(a: __m256i, b: __m256i) -> __m256i {
  _mm256_cmpeq_epi8(_mm256_max_epu8(a, b), a)
}

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn le_u8_avx2(a: __m256i, b: __m256i) -> __m256i {
  _mm256_cmpeq_epi8(_mm256_min_epu8(a, b), a)
}

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn not_avx2(a: __m256i) -> __m256i {
  _mm256_xor_si256(a, _mm256_set1_epi8(-1))
}

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn blend_avx2(mask: __m256i, positive: __m256i, negative: __m256i) -> __m256i {
  _mm256_blendv_epi8(negative, positive, mask)
}

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn abs_diff_u8_avx2(a: __m256i, b: __m256i) -> __m256i {
  _mm256_or_si256(_mm256_subs_epu8(a, b), _mm256_subs_epu8(b, a))
}

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn sum_u64x4(v: __m256i) -> u64 {
  let lanes = _mm_add_epi64(_mm256_castsi256_si128(v), _mm256_extracti128_si256::<1>(v));
  sum_u64x2(lanes)
}

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn to_bytes_avx2(v: __m256i) -> [u8; 32] {
  let mut out = [0u8; 32];
  _mm256_storeu_si256(out.as_mut_ptr().cast(), v);
  out
}

// ─────────────────────────────────────────────────────────────────────────────
// AVX-512BW (512-bit)
// ─────────────────────────────────────────────────────────────────────────────

/// Load mask covering the first `len` bytes of a 64-byte vector.
#[inline]
#[must_use]
pub(crate) const fn tail_mask(len: usize) -> __mmask64 {
  if len >= 64 { u64::MAX } else { (1u64 << len) - 1 }
}

#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
pub(crate) unsafe fn load_avx512<const ALIGN: bool>(src: *const u8) -> __m512i {
  if ALIGN { ptr::read(src.cast::<__m512i>()) } else { ptr::read_unaligned(src.cast::<__m512i>()) }
}

#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
pub(crate) unsafe fn store_avx512<const ALIGN: bool>(dst: *mut u8, value: __m512i) {
  if ALIGN { ptr::write(dst.cast::<__m512i>(), value) } else { ptr::write_unaligned(dst.cast::<__m512i>(), value) }
}

/// Load the bytes selected by `mask`, zeroing the rest. Unselected bytes are
/// never read.
#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
pub(crate) unsafe fn load_avx512_masked(src: *const u8, mask: __mmask64) -> __m512i {
  _mm512_maskz_loadu_epi8(mask, src.cast())
}

/// Store the bytes selected by `mask`. Unselected bytes are never written.
#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
pub(crate) unsafe fn store_avx512_masked(dst: *mut u8, mask: __mmask64, value: __m512i) {
  _mm512_mask_storeu_epi8(dst.cast(), mask, value)
}

#[inline]
#[target_feature(enable = "avx512f,avx512bw")]
pub(crate) unsafe fn abs_diff_u8_avx512(a: __m512i, b: __m512i) -> __m512i {
  _mm512_or_si512(_mm512_subs_epu8(a, b), _mm512_subs_epu8(b, a))
}
