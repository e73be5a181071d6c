//! Error types for the View API.

use core::fmt;

/// Error returned by the View-based operations in [`crate::ops`] and by
/// [`View`](crate::View) constructors.
///
/// The raw entry points never return errors; their preconditions are
/// checked with debug assertions only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
  /// Two views in one call differ in width or height.
  SizeMismatch,
  /// A view has a pixel format the operation does not accept, or two views
  /// that must share a format do not.
  FormatMismatch,
  /// `stride` is smaller than `width * pixel_size`.
  StrideTooSmall,
  /// A borrowed buffer is shorter than the view it should back.
  BufferTooSmall,
  /// A region does not lie inside its parent view.
  RegionOutOfBounds,
  /// A byte-wise kernel got a format without 1 to 4 single-byte channels.
  InvalidChannelCount,
  /// Owned view allocation failed or its size overflowed.
  AllocationFailed,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::SizeMismatch => f.write_str("views differ in width or height"),
      Self::FormatMismatch => f.write_str("unsupported or mismatched pixel format"),
      Self::StrideTooSmall => f.write_str("stride is smaller than the row size"),
      Self::BufferTooSmall => f.write_str("buffer is too small for the view"),
      Self::RegionOutOfBounds => f.write_str("region lies outside the parent view"),
      Self::InvalidChannelCount => f.write_str("invalid channel count"),
      Self::AllocationFailed => f.write_str("view allocation failed"),
    }
  }
}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::string::ToString;

  use super::*;

  #[test]
  fn test_display_is_lowercase_sentence() {
    for err in [
      Error::SizeMismatch,
      Error::FormatMismatch,
      Error::StrideTooSmall,
      Error::BufferTooSmall,
      Error::RegionOutOfBounds,
      Error::InvalidChannelCount,
      Error::AllocationFailed,
    ] {
      let text = err.to_string();
      assert!(!text.is_empty());
      assert!(text.chars().next().is_some_and(|c| c.is_ascii_lowercase()), "{text}");
    }
  }
}
