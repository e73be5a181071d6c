//! Two-dimensional pixel buffer descriptors.
//!
//! A [`View`] describes `height` rows of `width` pixels, `stride` bytes apart.
//! It either owns SIMD-aligned memory (freed on drop) or borrows a caller
//! slice for its lifetime. [`View::region`] produces a borrowed sub-view that
//! shares the parent's stride.
//!
//! Kernels never see a `View`; the wrappers in [`crate::ops`] validate views
//! and hand raw pointers and strides to the dispatched variants.

use core::{fmt, marker::PhantomData, ptr::NonNull};

#[cfg(feature = "alloc")]
use alloc::alloc::{Layout, alloc_zeroed, dealloc};

use platform::CapabilitySet;

use crate::Error;

/// Largest alignment any vector tier asks for.
pub const MAX_ALIGNMENT: usize = 64;

/// Alignment that lets the strongest enabled tier use its aligned load and
/// store forms; never less than the pointer size.
///
/// Owned views created with [`View::new`] use it for their base pointer and
/// stride. It follows [`platform::capabilities`], including an override.
#[inline]
#[must_use]
pub fn alignment() -> usize {
  alignment_for(&platform::capabilities())
}

/// [`alignment`] for an explicit capability set.
#[inline]
#[must_use]
pub const fn alignment_for(caps: &CapabilitySet) -> usize {
  let bytes = caps.best().vector_bytes();
  if bytes > size_of::<usize>() { bytes } else { size_of::<usize>() }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pixel Formats
// ─────────────────────────────────────────────────────────────────────────────

/// Layout of one pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
  /// One 8-bit gray channel.
  Gray8,
  /// Two interleaved 8-bit channels (U and V).
  Uv16,
  /// Three 8-bit channels: blue, green, red.
  Bgr24,
  /// Four 8-bit channels: blue, green, red, alpha.
  Bgra32,
  /// One 16-bit signed integer.
  Int16,
  /// One 32-bit signed integer.
  Int32,
  /// One 64-bit signed integer.
  Int64,
  /// One 32-bit float.
  Float,
  /// One 64-bit float.
  Double,
  /// 8-bit Bayer mosaic, GRBG pattern.
  BayerGrbg,
  /// 8-bit Bayer mosaic, GBRG pattern.
  BayerGbrg,
  /// 8-bit Bayer mosaic, RGGB pattern.
  BayerRggb,
  /// 8-bit Bayer mosaic, BGGR pattern.
  BayerBggr,
  /// Three 8-bit channels: hue, saturation, value.
  Hsv24,
  /// Three 8-bit channels: hue, saturation, lightness.
  Hsl24,
}

impl PixelFormat {
  /// Bytes per pixel.
  #[inline]
  #[must_use]
  pub const fn pixel_size(self) -> usize {
    match self {
      Self::Gray8 | Self::BayerGrbg | Self::BayerGbrg | Self::BayerRggb | Self::BayerBggr => 1,
      Self::Uv16 | Self::Int16 => 2,
      Self::Bgr24 | Self::Hsv24 | Self::Hsl24 => 3,
      Self::Bgra32 | Self::Int32 | Self::Float => 4,
      Self::Int64 | Self::Double => 8,
    }
  }

  /// Bytes per channel.
  #[inline]
  #[must_use]
  pub const fn channel_size(self) -> usize {
    match self {
      Self::Int16 => 2,
      Self::Int32 | Self::Float => 4,
      Self::Int64 | Self::Double => 8,
      _ => 1,
    }
  }

  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    self.pixel_size() / self.channel_size()
  }

  /// Whether every channel is an unsigned byte.
  #[inline]
  #[must_use]
  pub const fn is_byte_channel(self) -> bool {
    self.channel_size() == 1
  }
}

/// Anchor for [`View::region_at`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
  TopLeft,
  TopCenter,
  TopRight,
  MiddleLeft,
  MiddleCenter,
  MiddleRight,
  BottomLeft,
  BottomCenter,
  BottomRight,
}

impl Position {
  /// Offset of a `len`-long span anchored inside `outer` (`start`, `center`,
  /// `end` along one axis).
  const fn offset(anchor: u8, outer: usize, len: usize) -> usize {
    let spare = outer.saturating_sub(len);
    match anchor {
      0 => 0,
      1 => spare / 2,
      _ => spare,
    }
  }

  const fn anchors(self) -> (u8, u8) {
    match self {
      Self::TopLeft => (0, 0),
      Self::TopCenter => (1, 0),
      Self::TopRight => (2, 0),
      Self::MiddleLeft => (0, 1),
      Self::MiddleCenter => (1, 1),
      Self::MiddleRight => (2, 1),
      Self::BottomLeft => (0, 2),
      Self::BottomCenter => (1, 2),
      Self::BottomRight => (2, 2),
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// View
// ─────────────────────────────────────────────────────────────────────────────

enum Storage {
  Borrowed,
  #[cfg(feature = "alloc")]
  Owned(Layout),
}

/// A 2-D pixel buffer, owning or borrowed.
///
/// Invariants:
/// - `stride >= width * format.pixel_size()`
/// - `data` is valid for `(height - 1) * stride + width * pixel_size` bytes
///   whenever `width` and `height` are non-zero
pub struct View<'a> {
  width: usize,
  height: usize,
  stride: usize,
  format: PixelFormat,
  data: NonNull<u8>,
  storage: Storage,
  _marker: PhantomData<&'a mut [u8]>,
}

// SAFETY: A View is either the unique owner of its allocation or holds the
// exclusive borrow `&'a mut [u8]`; it has no shared interior state.
#[allow(unsafe_code)]
unsafe impl Send for View<'_> {}

// SAFETY: Shared access only permits reads through `&self`.
#[allow(unsafe_code)]
unsafe impl Sync for View<'_> {}

impl<'a> View<'a> {
  /// Allocate a zeroed view with base and rows aligned to [`alignment`].
  ///
  /// # Errors
  ///
  /// [`Error::AllocationFailed`] if the size overflows or the allocator fails.
  #[cfg(feature = "alloc")]
  pub fn new(width: usize, height: usize, format: PixelFormat) -> Result<View<'static>, Error> {
    View::with_alignment(width, height, format, alignment())
  }

  /// Allocate a zeroed view whose base pointer and stride are multiples of
  /// `align` (a power of two).
  ///
  /// # Errors
  ///
  /// [`Error::AllocationFailed`] for a non-power-of-two `align`, an
  /// overflowing size, or allocator failure.
  #[cfg(feature = "alloc")]
  #[allow(unsafe_code)]
  pub fn with_alignment(
    width: usize,
    height: usize,
    format: PixelFormat,
    align: usize,
  ) -> Result<View<'static>, Error> {
    if !align.is_power_of_two() {
      return Err(Error::AllocationFailed);
    }
    let row_bytes = width.checked_mul(format.pixel_size()).ok_or(Error::AllocationFailed)?;
    let stride = crate::simd::align_hi(row_bytes, align).ok_or(Error::AllocationFailed)?;
    let size = stride.checked_mul(height).ok_or(Error::AllocationFailed)?;
    let layout = Layout::from_size_align(size, align).map_err(|_| Error::AllocationFailed)?;

    let data = if size == 0 {
      NonNull::dangling()
    } else {
      // SAFETY: `layout` has a non-zero size.
      NonNull::new(unsafe { alloc_zeroed(layout) }).ok_or(Error::AllocationFailed)?
    };

    Ok(View { width, height, stride, format, data, storage: Storage::Owned(layout), _marker: PhantomData })
  }

  /// Wrap caller memory.
  ///
  /// # Errors
  ///
  /// - [`Error::StrideTooSmall`] if `stride < width * pixel_size`
  /// - [`Error::BufferTooSmall`] if `data` cannot hold the last row
  pub fn wrap(
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
    data: &'a mut [u8],
  ) -> Result<Self, Error> {
    let row_bytes = width.checked_mul(format.pixel_size()).ok_or(Error::StrideTooSmall)?;
    if stride < row_bytes {
      return Err(Error::StrideTooSmall);
    }
    if width != 0 && height != 0 {
      let required = (height - 1).checked_mul(stride).and_then(|v| v.checked_add(row_bytes));
      if required.is_none_or(|required| required > data.len()) {
        return Err(Error::BufferTooSmall);
      }
    }

    Ok(Self {
      width,
      height,
      stride,
      format,
      data: NonNull::from(data).cast(),
      storage: Storage::Borrowed,
      _marker: PhantomData,
    })
  }

  // ───────────────────────────────────────────────────────────────────────────
  // Geometry
  // ───────────────────────────────────────────────────────────────────────────

  #[inline]
  #[must_use]
  pub const fn width(&self) -> usize {
    self.width
  }

  #[inline]
  #[must_use]
  pub const fn height(&self) -> usize {
    self.height
  }

  /// Bytes between the starts of consecutive rows.
  #[inline]
  #[must_use]
  pub const fn stride(&self) -> usize {
    self.stride
  }

  #[inline]
  #[must_use]
  pub const fn format(&self) -> PixelFormat {
    self.format
  }

  #[inline]
  #[must_use]
  pub const fn pixel_size(&self) -> usize {
    self.format.pixel_size()
  }

  #[inline]
  #[must_use]
  pub const fn channel_count(&self) -> usize {
    self.format.channel_count()
  }

  /// Meaningful bytes per row (`width * pixel_size`).
  #[inline]
  #[must_use]
  pub const fn row_bytes(&self) -> usize {
    self.width * self.format.pixel_size()
  }

  #[inline]
  #[must_use]
  pub const fn area(&self) -> usize {
    self.width * self.height
  }

  #[inline]
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.width == 0 || self.height == 0
  }

  /// Whether the view frees its memory on drop.
  #[inline]
  #[must_use]
  pub const fn is_owned(&self) -> bool {
    !matches!(self.storage, Storage::Borrowed)
  }

  #[inline]
  #[must_use]
  pub const fn equal_size(&self, other: &View<'_>) -> bool {
    self.width == other.width && self.height == other.height
  }

  /// Same size and same pixel format.
  #[inline]
  #[must_use]
  pub fn compatible(&self, other: &View<'_>) -> bool {
    self.equal_size(other) && self.format == other.format
  }

  #[inline]
  #[must_use]
  pub const fn as_ptr(&self) -> *const u8 {
    self.data.as_ptr()
  }

  #[inline]
  #[must_use]
  pub fn as_mut_ptr(&mut self) -> *mut u8 {
    self.data.as_ptr()
  }

  // ───────────────────────────────────────────────────────────────────────────
  // Element Access
  // ───────────────────────────────────────────────────────────────────────────

  /// The meaningful bytes of row `y`.
  ///
  /// # Panics
  ///
  /// Panics if `y >= height`.
  #[must_use]
  #[allow(unsafe_code)]
  pub fn row(&self, y: usize) -> &[u8] {
    assert!(y < self.height, "row {y} out of bounds for height {}", self.height);
    // SAFETY: Row `y < height` of a non-empty view starts `y * stride` bytes in
    // and holds `row_bytes` valid bytes by the view invariant; zero-width rows
    // are empty slices at the base pointer.
    unsafe { core::slice::from_raw_parts(self.data.as_ptr().add(self.row_offset(y)), self.row_bytes()) }
  }

  /// Mutable access to the meaningful bytes of row `y`.
  ///
  /// # Panics
  ///
  /// Panics if `y >= height`.
  #[allow(unsafe_code)]
  pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
    assert!(y < self.height, "row {y} out of bounds for height {}", self.height);
    // SAFETY: As in `row`; `&mut self` guarantees exclusivity.
    unsafe { core::slice::from_raw_parts_mut(self.data.as_ptr().add(self.row_offset(y)), self.row_bytes()) }
  }

  /// Byte offset of row `y`. A zero-width view's stride is not backed by
  /// memory, so all of its rows sit at offset 0.
  #[inline]
  const fn row_offset(&self, y: usize) -> usize {
    if self.width == 0 { 0 } else { y * self.stride }
  }

  /// The bytes of pixel `(x, y)`.
  ///
  /// # Panics
  ///
  /// Panics if the pixel lies outside the view.
  #[must_use]
  pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
    assert!(x < self.width, "column {x} out of bounds for width {}", self.width);
    let size = self.pixel_size();
    let start = x * size;
    self.row(y).get(start..start + size).unwrap_or_default()
  }

  /// Mutable access to the bytes of pixel `(x, y)`.
  ///
  /// # Panics
  ///
  /// Panics if the pixel lies outside the view.
  pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
    assert!(x < self.width, "column {x} out of bounds for width {}", self.width);
    let size = self.pixel_size();
    let start = x * size;
    self.row_mut(y).get_mut(start..start + size).unwrap_or_default()
  }

  /// Set every meaningful byte to `value`. Row padding is left untouched.
  pub fn fill(&mut self, value: u8) {
    for y in 0..self.height {
      self.row_mut(y).fill(value);
    }
  }

  /// Copy the contents of `src` row by row.
  ///
  /// # Errors
  ///
  /// [`Error::SizeMismatch`] or [`Error::FormatMismatch`] if the views are not
  /// [`compatible`](Self::compatible).
  pub fn copy_from(&mut self, src: &View<'_>) -> Result<(), Error> {
    if !self.equal_size(src) {
      return Err(Error::SizeMismatch);
    }
    if self.format != src.format {
      return Err(Error::FormatMismatch);
    }
    for y in 0..self.height {
      self.row_mut(y).copy_from_slice(src.row(y));
    }
    Ok(())
  }

  /// Deep copy into a newly allocated view.
  ///
  /// # Errors
  ///
  /// [`Error::AllocationFailed`] if allocation fails.
  #[cfg(feature = "alloc")]
  pub fn to_owned(&self) -> Result<View<'static>, Error> {
    let mut copy = View::new(self.width, self.height, self.format)?;
    copy.copy_from(self)?;
    Ok(copy)
  }

  // ───────────────────────────────────────────────────────────────────────────
  // Regions
  // ───────────────────────────────────────────────────────────────────────────

  /// Borrowed sub-view covering columns `left..right` and rows `top..bottom`.
  ///
  /// Coordinates are clamped to the view; an empty or inverted rectangle
  /// yields an empty region.
  #[must_use]
  pub fn region(&mut self, left: usize, top: usize, right: usize, bottom: usize) -> View<'_> {
    let left = left.min(self.width);
    let right = right.min(self.width);
    let top = top.min(self.height);
    let bottom = bottom.min(self.height);

    if right <= left || bottom <= top {
      return self.sub_view(0, 0, 0, 0);
    }
    self.sub_view(left, top, right - left, bottom - top)
  }

  /// Like [`region`](Self::region) but rejects rectangles that leave the view.
  ///
  /// # Errors
  ///
  /// [`Error::RegionOutOfBounds`] unless `left <= right <= width` and
  /// `top <= bottom <= height`.
  pub fn try_region(&mut self, left: usize, top: usize, right: usize, bottom: usize) -> Result<View<'_>, Error> {
    if left > right || top > bottom || right > self.width || bottom > self.height {
      return Err(Error::RegionOutOfBounds);
    }
    Ok(self.region(left, top, right, bottom))
  }

  /// A `width x height` region anchored at `position`, clamped to the view.
  #[must_use]
  pub fn region_at(&mut self, width: usize, height: usize, position: Position) -> View<'_> {
    let (horizontal, vertical) = position.anchors();
    let left = Position::offset(horizontal, self.width, width);
    let top = Position::offset(vertical, self.height, height);
    self.region(left, top, left.saturating_add(width), top.saturating_add(height))
  }

  #[allow(unsafe_code)]
  fn sub_view(&mut self, left: usize, top: usize, width: usize, height: usize) -> View<'_> {
    let data = if width == 0 || height == 0 {
      self.data
    } else {
      // SAFETY: `left < self.width` and `top < self.height`, so the offset
      // addresses a byte of the parent's valid range.
      unsafe { self.data.add(top * self.stride + left * self.pixel_size()) }
    };
    View {
      width,
      height,
      stride: self.stride,
      format: self.format,
      data,
      storage: Storage::Borrowed,
      _marker: PhantomData,
    }
  }
}

impl Drop for View<'_> {
  fn drop(&mut self) {
    #[cfg(feature = "alloc")]
    if let Storage::Owned(layout) = self.storage
      && layout.size() != 0
    {
      // SAFETY: `data` came from `alloc_zeroed(layout)` in `with_alignment`.
      #[allow(unsafe_code)]
      unsafe {
        dealloc(self.data.as_ptr(), layout);
      }
    }
  }
}

impl fmt::Debug for View<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("View")
      .field("width", &self.width)
      .field("height", &self.height)
      .field("stride", &self.stride)
      .field("format", &self.format)
      .field("owned", &self.is_owned())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pixel_format_sizes() {
    assert_eq!(PixelFormat::Gray8.pixel_size(), 1);
    assert_eq!(PixelFormat::Uv16.channel_count(), 2);
    assert_eq!(PixelFormat::Bgr24.channel_count(), 3);
    assert_eq!(PixelFormat::Bgra32.channel_count(), 4);
    assert_eq!(PixelFormat::Int16.channel_count(), 1);
    assert_eq!(PixelFormat::Double.pixel_size(), 8);
    assert_eq!(PixelFormat::BayerRggb.pixel_size(), 1);
    assert!(!PixelFormat::Float.is_byte_channel());
  }

  #[test]
  fn test_wrap_validates_stride_and_length() {
    let mut buf = [0u8; 40];
    assert_eq!(View::wrap(10, 4, 9, PixelFormat::Gray8, &mut buf).err(), Some(Error::StrideTooSmall));
    assert_eq!(View::wrap(10, 5, 10, PixelFormat::Gray8, &mut buf).err(), Some(Error::BufferTooSmall));

    // The last row does not need trailing padding.
    let view = View::wrap(10, 4, 10, PixelFormat::Gray8, &mut buf[..40]).unwrap();
    assert!(!view.is_owned());
    drop(view);
    let view = View::wrap(4, 3, 16, PixelFormat::Gray8, &mut buf[..36]).unwrap();
    assert_eq!(view.row_bytes(), 4);
  }

  #[test]
  fn test_zero_width_rows_stay_at_the_base() {
    let mut buf = [0u8; 0];
    let mut view = View::wrap(0, 3, 100, PixelFormat::Gray8, &mut buf).unwrap();
    let base = view.as_ptr().addr();
    for y in 0..3 {
      assert!(view.row(y).is_empty());
      assert_eq!(view.row(y).as_ptr().addr(), base);
      assert_eq!(view.row_mut(y).as_mut_ptr().addr(), base);
    }
    view.fill(7);
    let mut other_buf = [0u8; 0];
    let other = View::wrap(0, 3, 40, PixelFormat::Gray8, &mut other_buf).unwrap();
    assert_eq!(view.copy_from(&other), Ok(()));
  }

  #[test]
  fn test_alignment_follows_the_strongest_tier() {
    let word = size_of::<usize>();
    assert_eq!(alignment_for(&CapabilitySet::BASE_ONLY), word);
    assert_eq!(alignment_for(&CapabilitySet::from_tiers(&[platform::Tier::Sse2])), 16);
    assert_eq!(alignment_for(&CapabilitySet::from_tiers(&[platform::Tier::Neon])), 16);
    assert_eq!(alignment_for(&CapabilitySet::from_tiers(&[platform::Tier::Sse2, platform::Tier::Avx2])), 32);
    assert_eq!(alignment_for(&CapabilitySet::from_tiers(&[platform::Tier::Avx512bw])), MAX_ALIGNMENT);
    assert_eq!(alignment(), alignment_for(&platform::capabilities()));
    assert!(alignment().is_power_of_two() && alignment() <= MAX_ALIGNMENT);
  }

  #[test]
  fn test_wrap_empty() {
    let mut buf = [0u8; 0];
    let view = View::wrap(0, 0, 0, PixelFormat::Gray8, &mut buf).unwrap();
    assert!(view.is_empty());
  }

  #[cfg(feature = "alloc")]
  #[test]
  fn test_owned_view_is_aligned_and_zeroed() {
    let view = View::new(17, 3, PixelFormat::Bgr24).unwrap();
    assert!(view.is_owned());
    assert_eq!(view.stride(), 51usize.next_multiple_of(alignment()));
    assert!(crate::simd::is_aligned(view.as_ptr(), alignment()));
    for y in 0..3 {
      assert!(view.row(y).iter().all(|&b| b == 0));
      assert_eq!(view.row(y).len(), 51);
    }
  }

  #[cfg(feature = "alloc")]
  #[test]
  fn test_owned_zero_size() {
    let view = View::new(0, 10, PixelFormat::Gray8).unwrap();
    assert!(view.is_empty());
    assert_eq!(View::with_alignment(1, 1, PixelFormat::Gray8, 3).err(), Some(Error::AllocationFailed));
  }

  #[test]
  fn test_region_shares_memory_and_stride() {
    let mut buf: [u8; 64] = core::array::from_fn(|i| i as u8);
    let mut view = View::wrap(8, 8, 8, PixelFormat::Gray8, &mut buf).unwrap();
    let mut region = view.region(2, 3, 5, 6);
    assert_eq!((region.width(), region.height(), region.stride()), (3, 3, 8));
    assert_eq!(region.row(0), &[26, 27, 28]);
    region.fill(0xAA);
    drop(region);
    assert_eq!(view.row(3), &[24, 25, 0xAA, 0xAA, 0xAA, 29, 30, 31]);
    assert_eq!(view.row(6)[2], 50);
  }

  #[test]
  fn test_region_clamps() {
    let mut buf = [0u8; 16];
    let mut view = View::wrap(4, 4, 4, PixelFormat::Gray8, &mut buf).unwrap();
    let region = view.region(2, 2, 100, 100);
    assert_eq!((region.width(), region.height()), (2, 2));
    drop(region);
    assert!(view.region(3, 1, 1, 3).is_empty());
    assert_eq!(view.try_region(0, 0, 5, 1).err(), Some(Error::RegionOutOfBounds));
    assert!(view.try_region(1, 1, 3, 3).is_ok());
  }

  #[test]
  fn test_region_at_positions() {
    let mut buf: [u8; 100] = core::array::from_fn(|i| i as u8);
    let mut view = View::wrap(10, 10, 10, PixelFormat::Gray8, &mut buf).unwrap();
    assert_eq!(view.region_at(2, 2, Position::TopLeft).pixel(0, 0), &[0]);
    assert_eq!(view.region_at(2, 2, Position::MiddleCenter).pixel(0, 0), &[44]);
    assert_eq!(view.region_at(2, 2, Position::BottomRight).pixel(0, 0), &[88]);
    assert_eq!(view.region_at(4, 2, Position::TopRight).pixel(0, 0), &[6]);
    let oversized = view.region_at(20, 20, Position::MiddleCenter);
    assert_eq!((oversized.width(), oversized.height()), (10, 10));
  }

  #[test]
  fn test_pixel_access_multichannel() {
    let mut buf = [0u8; 24];
    let mut view = View::wrap(2, 2, 12, PixelFormat::Bgr24, &mut buf).unwrap();
    view.pixel_mut(1, 1).copy_from_slice(&[1, 2, 3]);
    assert_eq!(view.pixel(1, 1), &[1, 2, 3]);
    assert_eq!(view.row(1), &[0, 0, 0, 1, 2, 3]);
  }

  #[test]
  fn test_copy_from_checks_compatibility() {
    let mut a = [1u8; 16];
    let mut b = [0u8; 16];
    let src = View::wrap(4, 4, 4, PixelFormat::Gray8, &mut a).unwrap();
    let mut dst = View::wrap(4, 4, 4, PixelFormat::Gray8, &mut b).unwrap();
    dst.copy_from(&src).unwrap();
    assert!(dst.row(3).iter().all(|&v| v == 1));

    let mut c = [0u8; 16];
    let mut other = View::wrap(2, 2, 8, PixelFormat::Uv16, &mut c).unwrap();
    assert_eq!(other.copy_from(&src), Err(Error::SizeMismatch));
  }

  #[cfg(feature = "alloc")]
  #[test]
  fn test_to_owned_is_deep() {
    let mut buf = [7u8; 12];
    let view = View::wrap(3, 2, 6, PixelFormat::Gray8, &mut buf).unwrap();
    let mut copy = view.to_owned().unwrap();
    copy.fill(9);
    assert_eq!(view.row(1), &[7, 7, 7]);
    assert_eq!(copy.row(1), &[9, 9, 9]);
    assert!(copy.compatible(&view));
  }

  #[test]
  #[should_panic(expected = "out of bounds")]
  fn test_row_out_of_bounds_panics() {
    let mut buf = [0u8; 4];
    let view = View::wrap(2, 2, 2, PixelFormat::Gray8, &mut buf).unwrap();
    let _ = view.row(2);
  }
}
