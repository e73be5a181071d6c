//! Alignment arithmetic shared by every vector variant.
//!
//! A vector variant of width `A` splits each row into `align_lo(width, A)`
//! bulk bytes and `width % A` tail bytes. Its aligned instantiation runs only
//! when [`all_aligned`] holds for every pointer and stride it touches.

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86_64;

/// Largest multiple of `align` not greater than `value`.
///
/// `align` must be a power of two.
#[inline]
#[must_use]
pub const fn align_lo(value: usize, align: usize) -> usize {
  debug_assert!(align.is_power_of_two());
  value & !(align - 1)
}

/// Smallest multiple of `align` not less than `value`, or `None` on overflow.
///
/// `align` must be a power of two.
#[inline]
#[must_use]
pub const fn align_hi(value: usize, align: usize) -> Option<usize> {
  debug_assert!(align.is_power_of_two());
  match value.checked_add(align - 1) {
    Some(v) => Some(v & !(align - 1)),
    None => None,
  }
}

/// Whether `ptr` is a multiple of `align`.
#[inline]
#[must_use]
pub fn is_aligned(ptr: *const u8, align: usize) -> bool {
  ptr.addr() & (align - 1) == 0
}

/// Whether every `(pointer, stride)` pair is a multiple of `align`.
#[inline]
#[must_use]
pub fn all_aligned(align: usize, parts: &[(*const u8, usize)]) -> bool {
  parts.iter().all(|&(ptr, stride)| is_aligned(ptr, align) && stride & (align - 1) == 0)
}

/// Row `y` of a strided buffer.
///
/// # Safety
///
/// `base + y * stride` must be valid for reads of `len` bytes that nothing
/// mutates for `'a`.
#[inline]
#[allow(unsafe_code)]
pub(crate) unsafe fn row<'a>(base: *const u8, stride: usize, y: usize, len: usize) -> &'a [u8] {
  // SAFETY: Guaranteed by the caller.
  unsafe { core::slice::from_raw_parts(base.add(y * stride), len) }
}

/// Mutable row `y` of a strided buffer.
///
/// # Safety
///
/// `base + y * stride` must be valid for writes of `len` bytes that nothing
/// else accesses for `'a`.
#[inline]
#[allow(unsafe_code)]
pub(crate) unsafe fn row_mut<'a>(base: *mut u8, stride: usize, y: usize, len: usize) -> &'a mut [u8] {
  // SAFETY: Guaranteed by the caller.
  unsafe { core::slice::from_raw_parts_mut(base.add(y * stride), len) }
}
