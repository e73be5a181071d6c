//! View-based kernel calls.
//!
//! Every function checks that its views agree in size and carry a format the
//! kernel accepts, then calls the dispatching entry point with the views'
//! pointers and strides. Views cannot alias (each one holds an exclusive
//! borrow or owns its memory), so the raw entry points' no-overlap contracts
//! hold by construction.
//!
//! ```
//! use kernels::{PixelFormat, View, ops};
//!
//! let mut a = View::new(40, 3, PixelFormat::Gray8)?;
//! let b = View::new(40, 3, PixelFormat::Gray8)?;
//! a.fill(9);
//! assert_eq!(ops::abs_difference_sum(&a, &b)?, 9 * 40 * 3);
//! # Ok::<(), kernels::Error>(())
//! ```

#![allow(unsafe_code)]

use crate::{
  Error, View,
  binarization::{self, CompareType},
  edge_background,
  operation::{self, OperationBinary8u},
  statistic::{self, Statistic},
  view::PixelFormat,
};

/// All views share `first`'s size and are [`PixelFormat::Gray8`].
fn check_gray8(first: &View<'_>, rest: &[&View<'_>]) -> Result<(), Error> {
  if first.format() != PixelFormat::Gray8 || rest.iter().any(|v| v.format() != PixelFormat::Gray8) {
    return Err(Error::FormatMismatch);
  }
  if rest.iter().any(|v| !first.equal_size(v)) {
    return Err(Error::SizeMismatch);
  }
  Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Statistic
// ─────────────────────────────────────────────────────────────────────────────

/// Sum of `|a - b|` over every pixel.
///
/// # Errors
///
/// [`Error::FormatMismatch`] unless both views are Gray8,
/// [`Error::SizeMismatch`] if their sizes differ.
pub fn abs_difference_sum(a: &View<'_>, b: &View<'_>) -> Result<u64, Error> {
  check_gray8(a, &[b])?;
  // SAFETY: Both views are valid for `height` rows of `width` bytes.
  Ok(unsafe { statistic::abs_difference_sum(a.as_ptr(), a.stride(), b.as_ptr(), b.stride(), a.width(), a.height()) })
}

/// Sum of `|a - b|` over the pixels where `mask == index`.
///
/// # Errors
///
/// As [`abs_difference_sum`], including `mask`.
pub fn abs_difference_sum_masked(a: &View<'_>, b: &View<'_>, mask: &View<'_>, index: u8) -> Result<u64, Error> {
  check_gray8(a, &[b, mask])?;
  // SAFETY: As above.
  Ok(unsafe {
    statistic::abs_difference_sum_masked(
      a.as_ptr(),
      a.stride(),
      b.as_ptr(),
      b.stride(),
      mask.as_ptr(),
      mask.stride(),
      index,
      a.width(),
      a.height(),
    )
  })
}

/// Minimum, maximum and rounded mean of a Gray8 view.
///
/// # Errors
///
/// [`Error::FormatMismatch`] unless `src` is Gray8.
pub fn get_statistic(src: &View<'_>) -> Result<Statistic, Error> {
  check_gray8(src, &[])?;
  // SAFETY: As above.
  Ok(unsafe { statistic::get_statistic(src.as_ptr(), src.stride(), src.width(), src.height()) })
}

// ─────────────────────────────────────────────────────────────────────────────
// Operation / Binarization
// ─────────────────────────────────────────────────────────────────────────────

/// `dst = op(a, b)` for every channel of every pixel.
///
/// # Errors
///
/// - [`Error::FormatMismatch`] if the formats differ
/// - [`Error::InvalidChannelCount`] if the shared format's channels are not
///   single bytes, or it has more than four of them
/// - [`Error::SizeMismatch`] if the sizes differ
pub fn operation_binary8u(a: &View<'_>, b: &View<'_>, dst: &mut View<'_>, op: OperationBinary8u) -> Result<(), Error> {
  let format = a.format();
  if b.format() != format || dst.format() != format {
    return Err(Error::FormatMismatch);
  }
  if !format.is_byte_channel() || !(1..=4).contains(&format.channel_count()) {
    return Err(Error::InvalidChannelCount);
  }
  if !a.equal_size(b) || !a.equal_size(dst) {
    return Err(Error::SizeMismatch);
  }
  let (dst_stride, dst_ptr) = (dst.stride(), dst.as_mut_ptr());
  // SAFETY: All three views hold `height` rows of `width * channel_count`
  // bytes and `dst` is exclusively borrowed.
  unsafe {
    operation::operation_binary8u(
      a.as_ptr(),
      a.stride(),
      b.as_ptr(),
      b.stride(),
      a.width(),
      a.height(),
      format.channel_count(),
      dst_ptr,
      dst_stride,
      op,
    );
  }
  Ok(())
}

/// `dst = compare(src, value) ? positive : negative`.
///
/// # Errors
///
/// [`Error::FormatMismatch`] unless both views are Gray8,
/// [`Error::SizeMismatch`] if their sizes differ.
pub fn binarization(
  src: &View<'_>,
  value: u8,
  positive: u8,
  negative: u8,
  dst: &mut View<'_>,
  compare: CompareType,
) -> Result<(), Error> {
  check_gray8(src, &[dst])?;
  let (dst_stride, dst_ptr) = (dst.stride(), dst.as_mut_ptr());
  // SAFETY: As above.
  unsafe {
    binarization::binarization(
      src.as_ptr(),
      src.stride(),
      src.width(),
      src.height(),
      value,
      positive,
      negative,
      dst_ptr,
      dst_stride,
      compare,
    );
  }
  Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Edge Background
// ─────────────────────────────────────────────────────────────────────────────

/// `background += 1` where `value > background`.
///
/// # Errors
///
/// [`Error::FormatMismatch`] unless both views are Gray8,
/// [`Error::SizeMismatch`] if their sizes differ.
pub fn edge_background_grow_range_slow(value: &View<'_>, background: &mut View<'_>) -> Result<(), Error> {
  check_gray8(value, &[background])?;
  let (stride, ptr) = (background.stride(), background.as_mut_ptr());
  // SAFETY: As above.
  unsafe {
    edge_background::grow_range_slow(value.as_ptr(), value.stride(), value.width(), value.height(), ptr, stride);
  }
  Ok(())
}

/// `background = max(background, value)`.
///
/// # Errors
///
/// As [`edge_background_grow_range_slow`].
pub fn edge_background_grow_range_fast(value: &View<'_>, background: &mut View<'_>) -> Result<(), Error> {
  check_gray8(value, &[background])?;
  let (stride, ptr) = (background.stride(), background.as_mut_ptr());
  // SAFETY: As above.
  unsafe {
    edge_background::grow_range_fast(value.as_ptr(), value.stride(), value.width(), value.height(), ptr, stride);
  }
  Ok(())
}

/// `background_count += 1` (saturating) where `value > background_value`.
///
/// # Errors
///
/// [`Error::FormatMismatch`] unless all views are Gray8,
/// [`Error::SizeMismatch`] if their sizes differ.
pub fn edge_background_increment_count(
  value: &View<'_>,
  background_value: &View<'_>,
  background_count: &mut View<'_>,
) -> Result<(), Error> {
  check_gray8(value, &[background_value, background_count])?;
  let (stride, ptr) = (background_count.stride(), background_count.as_mut_ptr());
  // SAFETY: As above.
  unsafe {
    edge_background::increment_count(
      value.as_ptr(),
      value.stride(),
      value.width(),
      value.height(),
      background_value.as_ptr(),
      background_value.stride(),
      ptr,
      stride,
    );
  }
  Ok(())
}

/// Step `background_value` toward `background_count` vs `threshold`, then
/// clear `background_count`.
///
/// # Errors
///
/// As [`edge_background_increment_count`].
pub fn edge_background_adjust_range(
  background_count: &mut View<'_>,
  background_value: &mut View<'_>,
  threshold: u8,
) -> Result<(), Error> {
  check_gray8(background_count, &[background_value])?;
  let (width, height) = (background_count.width(), background_count.height());
  let (count_stride, count) = (background_count.stride(), background_count.as_mut_ptr());
  let (value_stride, value) = (background_value.stride(), background_value.as_mut_ptr());
  // SAFETY: As above; the two views are distinct exclusive borrows.
  unsafe { edge_background::adjust_range(count, count_stride, width, height, value, value_stride, threshold) };
  Ok(())
}

/// [`edge_background_adjust_range`] restricted to pixels where `mask != 0`;
/// every count is cleared.
///
/// # Errors
///
/// As [`edge_background_increment_count`].
pub fn edge_background_adjust_range_masked(
  background_count: &mut View<'_>,
  background_value: &mut View<'_>,
  threshold: u8,
  mask: &View<'_>,
) -> Result<(), Error> {
  check_gray8(mask, &[background_count, background_value])?;
  let (width, height) = (mask.width(), mask.height());
  let (count_stride, count) = (background_count.stride(), background_count.as_mut_ptr());
  let (value_stride, value) = (background_value.stride(), background_value.as_mut_ptr());
  // SAFETY: As above.
  unsafe {
    edge_background::adjust_range_masked(
      count,
      count_stride,
      width,
      height,
      value,
      value_stride,
      threshold,
      mask.as_ptr(),
      mask.stride(),
    );
  }
  Ok(())
}

/// `background = value`.
///
/// # Errors
///
/// As [`edge_background_grow_range_slow`].
pub fn edge_background_shift_range(value: &View<'_>, background: &mut View<'_>) -> Result<(), Error> {
  check_gray8(value, &[background])?;
  let (stride, ptr) = (background.stride(), background.as_mut_ptr());
  // SAFETY: As above.
  unsafe { edge_background::shift_range(value.as_ptr(), value.stride(), value.width(), value.height(), ptr, stride) };
  Ok(())
}

/// `background = value` where `mask != 0`.
///
/// # Errors
///
/// As [`edge_background_increment_count`].
pub fn edge_background_shift_range_masked(
  value: &View<'_>,
  background: &mut View<'_>,
  mask: &View<'_>,
) -> Result<(), Error> {
  check_gray8(value, &[background, mask])?;
  let (stride, ptr) = (background.stride(), background.as_mut_ptr());
  // SAFETY: As above.
  unsafe {
    edge_background::shift_range_masked(
      value.as_ptr(),
      value.stride(),
      value.width(),
      value.height(),
      ptr,
      stride,
      mask.as_ptr(),
      mask.stride(),
    );
  }
  Ok(())
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
  use super::*;

  fn gray(width: usize, height: usize, fill: u8) -> View<'static> {
    let mut view = View::new(width, height, PixelFormat::Gray8).unwrap();
    view.fill(fill);
    view
  }

  #[test]
  fn test_rejects_size_mismatch() {
    let (a, b) = (gray(8, 2, 0), gray(9, 2, 0));
    assert_eq!(abs_difference_sum(&a, &b), Err(Error::SizeMismatch));
  }

  #[test]
  fn test_rejects_non_gray() {
    let a = gray(8, 2, 0);
    let b = View::new(8, 2, PixelFormat::Bgr24).unwrap();
    assert_eq!(abs_difference_sum(&a, &b), Err(Error::FormatMismatch));
    assert_eq!(get_statistic(&b), Err(Error::FormatMismatch));
  }

  #[test]
  fn test_operation_accepts_multichannel() {
    let mut a = View::new(6, 2, PixelFormat::Bgra32).unwrap();
    let mut b = View::new(6, 2, PixelFormat::Bgra32).unwrap();
    let mut dst = View::new(6, 2, PixelFormat::Bgra32).unwrap();
    a.fill(200);
    b.fill(100);
    operation_binary8u(&a, &b, &mut dst, OperationBinary8u::SaturatedAddition).unwrap();
    for y in 0..2 {
      assert!(dst.row(y).iter().all(|&v| v == 255));
    }
  }

  #[test]
  fn test_operation_rejects_wide_channels() {
    let a = View::new(4, 1, PixelFormat::Int16).unwrap();
    let b = View::new(4, 1, PixelFormat::Int16).unwrap();
    let mut dst = View::new(4, 1, PixelFormat::Int16).unwrap();
    assert_eq!(operation_binary8u(&a, &b, &mut dst, OperationBinary8u::And), Err(Error::InvalidChannelCount));
  }

  #[test]
  fn test_motion_detection_cycle() {
    let (width, height) = (50, 3);
    let value = gray(width, height, 120);
    let mut background_value = gray(width, height, 100);
    let mut background_count = gray(width, height, 0);

    for _ in 0..10 {
      edge_background_increment_count(&value, &background_value, &mut background_count).unwrap();
    }
    assert!(background_count.row(0).iter().all(|&c| c == 10));

    edge_background_adjust_range(&mut background_count, &mut background_value, 5).unwrap();
    assert!(background_value.row(2).iter().all(|&v| v == 101));
    assert!(background_count.row(1).iter().all(|&c| c == 0));

    edge_background_shift_range(&value, &mut background_value).unwrap();
    assert_eq!(get_statistic(&background_value).unwrap(), Statistic { min: 120, max: 120, average: 120 });
  }
}
