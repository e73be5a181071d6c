//! Threshold an 8-bit image into two output levels.
//!
//! `dst = compare(src, value) ? positive : negative` for every byte. The
//! result depends only on the source byte, so vector variants finish a row
//! with one unaligned vector ending at the row end.

#![allow(unsafe_code)]

#[cfg(target_arch = "aarch64")]
mod aarch64;
pub(crate) mod portable;
#[cfg(target_arch = "x86_64")]
mod x86_64;

#[cfg(all(test, not(miri)))]
mod proptests;

use backend::{Dispatcher, Entry};
#[allow(unused_imports)]
use platform::Tier;

/// Comparison between a source byte and the threshold value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CompareType {
  /// `src == value`
  Equal = 0,
  /// `src != value`
  NotEqual = 1,
  /// `src > value`
  Greater = 2,
  /// `src >= value`
  GreaterOrEqual = 3,
  /// `src < value`
  Lesser = 4,
  /// `src <= value`
  LesserOrEqual = 5,
}

impl CompareType {
  pub const ALL: [Self; 6] = [
    Self::Equal,
    Self::NotEqual,
    Self::Greater,
    Self::GreaterOrEqual,
    Self::Lesser,
    Self::LesserOrEqual,
  ];

  /// Decode the C ABI value.
  #[inline]
  #[must_use]
  pub const fn from_raw(raw: u32) -> Option<Self> {
    match raw {
      0 => Some(Self::Equal),
      1 => Some(Self::NotEqual),
      2 => Some(Self::Greater),
      3 => Some(Self::GreaterOrEqual),
      4 => Some(Self::Lesser),
      5 => Some(Self::LesserOrEqual),
      _ => None,
    }
  }

  #[inline]
  #[must_use]
  pub const fn compare(self, src: u8, value: u8) -> bool {
    match self {
      Self::Equal => src == value,
      Self::NotEqual => src != value,
      Self::Greater => src > value,
      Self::GreaterOrEqual => src >= value,
      Self::Lesser => src < value,
      Self::LesserOrEqual => src <= value,
    }
  }
}

/// `(src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare)`
pub type BinarizationFn = unsafe fn(*const u8, usize, usize, usize, u8, u8, u8, *mut u8, usize, CompareType);

const BINARIZATION_TABLE: &[Entry<BinarizationFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx512bw"))]
  Entry::vector("x86_64/avx512bw", Tier::Avx512bw, x86_64::binarization_avx512bw),
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::binarization_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::binarization_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::binarization_neon),
  Entry::base("portable", portable::binarization),
];

pub static BINARIZATION: Dispatcher<BinarizationFn> = Dispatcher::new("binarization", BINARIZATION_TABLE);

/// `dst = compare(src, value) ? positive : negative` for every byte.
///
/// # Safety
///
/// For every `y < height`, `src + y * src_stride` must be valid for reads and
/// `dst + y * dst_stride` for writes of `width` bytes, and `dst` must not
/// overlap `src`.
#[inline]
#[allow(clippy::too_many_arguments)]
pub unsafe fn binarization(
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
  debug_assert!(src_stride >= width && dst_stride >= width);
  if width == 0 || height == 0 {
    return;
  }
  debug_assert!(!src.is_null() && !dst.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe {
    let func = BINARIZATION.select(width).func;
    func(src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_compare() {
    let cases = [
      (CompareType::Equal, [false, true, false]),
      (CompareType::NotEqual, [true, false, true]),
      (CompareType::Greater, [false, false, true]),
      (CompareType::GreaterOrEqual, [false, true, true]),
      (CompareType::Lesser, [true, false, false]),
      (CompareType::LesserOrEqual, [true, true, false]),
    ];
    for (compare, expected) in cases {
      for (src, want) in [9u8, 10, 11].into_iter().zip(expected) {
        assert_eq!(compare.compare(src, 10), want, "{compare:?} {src}");
      }
    }
  }

  #[test]
  fn test_from_raw() {
    for compare in CompareType::ALL {
      assert_eq!(CompareType::from_raw(compare as u32), Some(compare));
    }
    assert_eq!(CompareType::from_raw(6), None);
  }

  #[test]
  fn test_binarization_across_tiers() {
    let src: [u8; 40] = core::array::from_fn(|i| (i * 7) as u8);
    let mut dst = [0u8; 40];
    // SAFETY: one row of 40 bytes.
    unsafe {
      binarization(src.as_ptr(), 40, 40, 1, 100, 255, 0, dst.as_mut_ptr(), 40, CompareType::Greater);
    }
    for (&s, &d) in src.iter().zip(&dst) {
      assert_eq!(d, if s > 100 { 255 } else { 0 });
    }
  }
}
