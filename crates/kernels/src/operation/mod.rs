//! Per-byte binary operations between two 8-bit images.
//!
//! Every channel of every pixel is combined independently, so the kernels
//! work on rows of `width * channel_count` bytes and dispatch on that size.
//! The operations are idempotent for a fixed input, so vector variants finish
//! a row with one unaligned vector ending at the row end. The destination
//! must not overlap either input.

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

/// Operation applied by [`operation_binary8u`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum OperationBinary8u {
  /// `(a + b + 1) / 2`
  Average = 0,
  /// `a & b`
  And = 1,
  /// `a | b`
  Or = 2,
  /// `max(a, b)`
  Maximum = 3,
  /// `min(a, b)`
  Minimum = 4,
  /// `a - b`, saturating at 0
  SaturatedSubtraction = 5,
  /// `a + b`, saturating at 255
  SaturatedAddition = 6,
}

impl OperationBinary8u {
  pub const ALL: [Self; 7] = [
    Self::Average,
    Self::And,
    Self::Or,
    Self::Maximum,
    Self::Minimum,
    Self::SaturatedSubtraction,
    Self::SaturatedAddition,
  ];

  /// Decode the C ABI value.
  #[inline]
  #[must_use]
  pub const fn from_raw(raw: u32) -> Option<Self> {
    match raw {
      0 => Some(Self::Average),
      1 => Some(Self::And),
      2 => Some(Self::Or),
      3 => Some(Self::Maximum),
      4 => Some(Self::Minimum),
      5 => Some(Self::SaturatedSubtraction),
      6 => Some(Self::SaturatedAddition),
      _ => None,
    }
  }

  /// Apply to one byte pair.
  #[inline]
  #[must_use]
  pub const fn apply(self, a: u8, b: u8) -> u8 {
    match self {
      Self::Average => ((a as u16 + b as u16 + 1) >> 1) as u8,
      Self::And => a & b,
      Self::Or => a | b,
      Self::Maximum => {
        if a > b {
          a
        } else {
          b
        }
      }
      Self::Minimum => {
        if a < b {
          a
        } else {
          b
        }
      }
      Self::SaturatedSubtraction => a.saturating_sub(b),
      Self::SaturatedAddition => a.saturating_add(b),
    }
  }
}

/// `(a, a_stride, b, b_stride, row_bytes, height, dst, dst_stride, op)`
pub type OperationBinary8uFn =
  unsafe fn(*const u8, usize, *const u8, usize, usize, usize, *mut u8, usize, OperationBinary8u);

const OPERATION_BINARY_8U_TABLE: &[Entry<OperationBinary8uFn>] = &[
  #[cfg(all(target_arch = "x86_64", feature = "avx512bw"))]
  Entry::vector("x86_64/avx512bw", Tier::Avx512bw, x86_64::operation_binary8u_avx512bw),
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  Entry::vector("x86_64/avx2", Tier::Avx2, x86_64::operation_binary8u_avx2),
  #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
  Entry::vector("x86_64/sse2", Tier::Sse2, x86_64::operation_binary8u_sse2),
  #[cfg(all(target_arch = "aarch64", feature = "neon"))]
  Entry::vector("aarch64/neon", Tier::Neon, aarch64::operation_binary8u_neon),
  Entry::base("portable", portable::operation_binary8u),
];

pub static OPERATION_BINARY_8U: Dispatcher<OperationBinary8uFn> =
  Dispatcher::new("operation_binary8u", OPERATION_BINARY_8U_TABLE);

/// `dst = op(a, b)` for every channel of every pixel.
///
/// The problem size for dispatch is `width * channel_count` bytes per row.
///
/// # Safety
///
/// For every `y < height`, `a + y * a_stride` and `b + y * b_stride` must be
/// valid for reads and `dst + y * dst_stride` for writes of
/// `width * channel_count` bytes, and `dst` must not overlap `a` or `b`.
#[inline]
#[allow(clippy::too_many_arguments)]
pub unsafe fn operation_binary8u(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
  channel_count: usize,
  dst: *mut u8,
  dst_stride: usize,
  op: OperationBinary8u,
) {
  debug_assert!((1..=4).contains(&channel_count));
  // No buffer can hold a row this long.
  let Some(row_bytes) = width.checked_mul(channel_count) else {
    return;
  };
  debug_assert!(a_stride >= row_bytes && b_stride >= row_bytes && dst_stride >= row_bytes);
  if row_bytes == 0 || height == 0 {
    return;
  }
  debug_assert!(!a.is_null() && !b.is_null() && !dst.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe {
    (OPERATION_BINARY_8U.select(row_bytes).func)(a, a_stride, b, b_stride, row_bytes, height, dst, dst_stride, op);
  }
}
