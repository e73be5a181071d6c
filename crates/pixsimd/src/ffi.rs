//! C ABI.
//!
//! One `extern "C"` function per kernel, taking raw pointers, per-buffer
//! strides in bytes, dimensions and scalar parameters. Every function
//! dispatches exactly like its `kernels` counterpart.
//!
//! # Contract
//!
//! - Each image pointer is valid for `height` rows of `width` bytes (times
//!   `channel_count` for [`pixsimd_operation_binary8u`]) spaced `stride`
//!   bytes apart, and `stride >= width`.
//! - Destinations do not overlap sources.
//! - Null pointers are only allowed when `width` or `height` is zero.
//!
//! Memory from [`pixsimd_allocate`] is released with [`pixsimd_free`] only.
//!
//! Violations are checked with debug assertions only. Enum parameters arrive
//! as `u32`; an unknown value makes the call a no-op. Nothing here panics
//! across the boundary in release builds.

#![allow(unsafe_code)]
#![allow(clippy::too_many_arguments)]

#[cfg(feature = "alloc")]
use core::ptr;
use core::ffi::{c_char, c_void};

use kernels::{CompareType, OperationBinary8u, binarization, edge_background, operation, statistic};

use crate::info;

/// NUL-terminated library version. The pointer is valid for the life of the
/// process.
#[unsafe(no_mangle)]
pub extern "C" fn pixsimd_version() -> *const c_char {
  info::VERSION_C.as_ptr().cast()
}

/// Bitmask of usable instruction sets; bit `i` is
/// [`CpuInfoFlag`](crate::CpuInfoFlag) `i`.
#[unsafe(no_mangle)]
pub extern "C" fn pixsimd_cpu_info() -> u32 {
  info::cpu_info()
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory
// ─────────────────────────────────────────────────────────────────────────────

/// Alignment the enabled kernels prefer, see [`kernels::alignment`].
#[unsafe(no_mangle)]
pub extern "C" fn pixsimd_alignment() -> usize {
  kernels::alignment()
}

/// `size` rounded up to a multiple of `align`, or 0 when `align` is not a
/// power of two or the result overflows.
#[unsafe(no_mangle)]
pub extern "C" fn pixsimd_align(size: usize, align: usize) -> usize {
  if !align.is_power_of_two() {
    return 0;
  }
  size.checked_next_multiple_of(align).unwrap_or(0)
}

/// Bytes kept in front of every block: its layout size and alignment.
#[cfg(feature = "alloc")]
const HEADER: usize = 2 * size_of::<usize>();

/// Layout of a block serving `size` bytes at `align`, and the offset of the
/// caller's pointer into it.
#[cfg(feature = "alloc")]
fn block_layout(size: usize, align: usize) -> Option<(alloc::alloc::Layout, usize)> {
  let align = if align == 0 { kernels::alignment() } else { align };
  if !align.is_power_of_two() {
    return None;
  }
  // Both are powers of two, so the larger one is a multiple of the other.
  let align = align.max(HEADER);
  let total = size.checked_add(align)?;
  let layout = alloc::alloc::Layout::from_size_align(total, align).ok()?;
  Some((layout, align))
}

/// Allocate `size` bytes aligned to `align` (a power of two; 0 means
/// [`pixsimd_alignment`]). Returns null on failure or a bad `align`.
///
/// The block is uninitialized and must be released with [`pixsimd_free`].
#[cfg(feature = "alloc")]
#[unsafe(no_mangle)]
pub extern "C" fn pixsimd_allocate(size: usize, align: usize) -> *mut c_void {
  let Some((layout, offset)) = block_layout(size, align) else {
    return ptr::null_mut();
  };
  // SAFETY: `layout.size() >= offset >= HEADER > 0`.
  let base = unsafe { alloc::alloc::alloc(layout) };
  if base.is_null() {
    return ptr::null_mut();
  }
  // SAFETY: `offset <= layout.size()`, so `block` stays inside the
  // allocation. `block` is aligned to `offset >= HEADER`, so the two words in
  // front of it are in bounds and aligned for `usize`.
  unsafe {
    let block = base.add(offset);
    let header = block.cast::<usize>().sub(2);
    header.write(layout.size());
    header.add(1).write(layout.align());
    block.cast()
  }
}

/// Release a block from [`pixsimd_allocate`]. Null is ignored.
///
/// # Safety
///
/// `ptr` is null or was returned by [`pixsimd_allocate`] and not yet freed.
#[cfg(feature = "alloc")]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_free(ptr: *mut c_void) {
  if ptr.is_null() {
    return;
  }
  // SAFETY: `pixsimd_allocate` wrote the layout in the two words before
  // `ptr`, and the block starts `align` bytes before it.
  unsafe {
    let header = ptr.cast::<usize>().sub(2);
    let size = header.read();
    let align = header.add(1).read();
    let layout = alloc::alloc::Layout::from_size_align_unchecked(size, align);
    alloc::alloc::dealloc(ptr.cast::<u8>().sub(align), layout);
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Statistic
// ─────────────────────────────────────────────────────────────────────────────

/// `*sum = Σ |a - b|`.
///
/// # Safety
///
/// See the module contract; `sum` must be valid for a write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_abs_difference_sum(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
  sum: *mut u64,
) {
  debug_assert!(!sum.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe {
    let value = statistic::abs_difference_sum(a, a_stride, b, b_stride, width, height);
    if let Some(sum) = sum.as_mut() {
      *sum = value;
    }
  }
}

/// `*sum = Σ |a - b|` over pixels where `mask == index`.
///
/// # Safety
///
/// See the module contract; `sum` must be valid for a write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_abs_difference_sum_masked(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  mask: *const u8,
  mask_stride: usize,
  index: u8,
  width: usize,
  height: usize,
  sum: *mut u64,
) {
  debug_assert!(!sum.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe {
    let value =
      statistic::abs_difference_sum_masked(a, a_stride, b, b_stride, mask, mask_stride, index, width, height);
    if let Some(sum) = sum.as_mut() {
      *sum = value;
    }
  }
}

/// Minimum, maximum and rounded mean of an 8-bit image. An empty image
/// reports zeros.
///
/// # Safety
///
/// See the module contract; `min`, `max` and `average` must be valid for a
/// write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_get_statistic(
  src: *const u8,
  stride: usize,
  width: usize,
  height: usize,
  min: *mut u8,
  max: *mut u8,
  average: *mut u8,
) {
  debug_assert!(!min.is_null() && !max.is_null() && !average.is_null());
  // SAFETY: Forwarded from the caller.
  unsafe {
    let stat = statistic::get_statistic(src, stride, width, height);
    for (out, value) in [(min, stat.min), (max, stat.max), (average, stat.average)] {
      if let Some(out) = out.as_mut() {
        *out = value;
      }
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operation / Binarization
// ─────────────────────────────────────────────────────────────────────────────

/// `dst = op(a, b)` per channel. `op` is an [`OperationBinary8u`]
/// discriminant and `channel_count` is 1 to 4.
///
/// # Safety
///
/// See the module contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_operation_binary8u(
  a: *const u8,
  a_stride: usize,
  b: *const u8,
  b_stride: usize,
  width: usize,
  height: usize,
  channel_count: usize,
  dst: *mut u8,
  dst_stride: usize,
  op: u32,
) {
  let Some(op) = OperationBinary8u::from_raw(op) else {
    return;
  };
  if !(1..=4).contains(&channel_count) {
    return;
  }
  // SAFETY: Forwarded from the caller.
  unsafe { operation::operation_binary8u(a, a_stride, b, b_stride, width, height, channel_count, dst, dst_stride, op) };
}

/// `dst = compare(src, value) ? positive : negative`. `compare` is a
/// [`CompareType`] discriminant.
///
/// # Safety
///
/// See the module contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_binarization(
  src: *const u8,
  src_stride: usize,
  width: usize,
  height: usize,
  value: u8,
  positive: u8,
  negative: u8,
  dst: *mut u8,
  dst_stride: usize,
  compare: u32,
) {
  let Some(compare) = CompareType::from_raw(compare) else {
    return;
  };
  // SAFETY: Forwarded from the caller.
  unsafe {
    binarization::binarization(src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare);
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Edge Background
// ─────────────────────────────────────────────────────────────────────────────

/// # Safety
///
/// See the module contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_edge_background_grow_range_slow(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  // SAFETY: Forwarded from the caller.
  unsafe { edge_background::grow_range_slow(value, value_stride, width, height, background, background_stride) };
}

/// # Safety
///
/// See the module contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_edge_background_grow_range_fast(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  // SAFETY: Forwarded from the caller.
  unsafe { edge_background::grow_range_fast(value, value_stride, width, height, background, background_stride) };
}

/// # Safety
///
/// See the module contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_edge_background_increment_count(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background_value: *const u8,
  background_value_stride: usize,
  background_count: *mut u8,
  background_count_stride: usize,
) {
  // SAFETY: Forwarded from the caller.
  unsafe {
    edge_background::increment_count(
      value,
      value_stride,
      width,
      height,
      background_value,
      background_value_stride,
      background_count,
      background_count_stride,
    );
  }
}

/// # Safety
///
/// See the module contract; the two planes do not overlap.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_edge_background_adjust_range(
  background_count: *mut u8,
  background_count_stride: usize,
  width: usize,
  height: usize,
  background_value: *mut u8,
  background_value_stride: usize,
  threshold: u8,
) {
  let (c, cs, v, vs) = (background_count, background_count_stride, background_value, background_value_stride);
  // SAFETY: Forwarded from the caller.
  unsafe { edge_background::adjust_range(c, cs, width, height, v, vs, threshold) };
}

/// # Safety
///
/// See the module contract; the two written planes do not overlap.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_edge_background_adjust_range_masked(
  background_count: *mut u8,
  background_count_stride: usize,
  width: usize,
  height: usize,
  background_value: *mut u8,
  background_value_stride: usize,
  threshold: u8,
  mask: *const u8,
  mask_stride: usize,
) {
  let (c, cs, v, vs) = (background_count, background_count_stride, background_value, background_value_stride);
  // SAFETY: Forwarded from the caller.
  unsafe { edge_background::adjust_range_masked(c, cs, width, height, v, vs, threshold, mask, mask_stride) };
}

/// # Safety
///
/// See the module contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_edge_background_shift_range(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
) {
  // SAFETY: Forwarded from the caller.
  unsafe { edge_background::shift_range(value, value_stride, width, height, background, background_stride) };
}

/// # Safety
///
/// See the module contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixsimd_edge_background_shift_range_masked(
  value: *const u8,
  value_stride: usize,
  width: usize,
  height: usize,
  background: *mut u8,
  background_stride: usize,
  mask: *const u8,
  mask_stride: usize,
) {
  let (vs, bs, ms) = (value_stride, background_stride, mask_stride);
  // SAFETY: Forwarded from the caller.
  unsafe { edge_background::shift_range_masked(value, vs, width, height, background, bs, mask, ms) };
}

#[cfg(test)]
mod tests {
  extern crate std;

  use core::ffi::CStr;
  use std::vec;

  use super::*;

  #[test]
  fn test_alignment_matches_views() {
    assert_eq!(pixsimd_alignment(), crate::alignment());
    assert!(pixsimd_alignment().is_power_of_two());
  }

  #[test]
  fn test_align_rounds_up() {
    assert_eq!(pixsimd_align(100, 64), 128);
    assert_eq!(pixsimd_align(128, 64), 128);
    assert_eq!(pixsimd_align(0, 16), 0);
    assert_eq!(pixsimd_align(5, 0), 0);
    assert_eq!(pixsimd_align(5, 24), 0);
    assert_eq!(pixsimd_align(usize::MAX, 64), 0);
  }

  #[cfg(feature = "alloc")]
  #[test]
  fn test_allocate_is_aligned_and_writable() {
    for (size, align) in [(100, 64), (1, 16), (0, 32), (4096, 4096), (7, 1), (33, 0)] {
      let ptr = pixsimd_allocate(size, align).cast::<u8>();
      assert!(!ptr.is_null(), "{size} at {align}");
      let align = if align == 0 { pixsimd_alignment() } else { align };
      assert_eq!(ptr.addr() % align, 0, "{size} at {align}");
      // SAFETY: `ptr` holds `size` writable bytes until freed below.
      unsafe {
        ptr.write_bytes(0xA5, size);
        assert!(core::slice::from_raw_parts(ptr, size).iter().all(|&b| b == 0xA5));
        pixsimd_free(ptr.cast());
      }
    }
  }

  #[cfg(feature = "alloc")]
  #[test]
  fn test_allocate_rejects_bad_requests() {
    assert!(pixsimd_allocate(16, 24).is_null());
    assert!(pixsimd_allocate(usize::MAX, 64).is_null());
    // SAFETY: Null is accepted.
    unsafe { pixsimd_free(ptr::null_mut()) };
  }

  #[test]
  fn test_version_is_nul_terminated() {
    // SAFETY: `pixsimd_version` returns a static NUL-terminated string.
    let version = unsafe { CStr::from_ptr(pixsimd_version()) };
    assert_eq!(version.to_str(), Ok(info::version()));
  }

  #[test]
  fn test_abs_difference_sum() {
    let (a, b) = ([10u8; 40], [7u8; 40]);
    let mut sum = 0;
    // SAFETY: Two rows of 20 bytes each.
    unsafe { pixsimd_abs_difference_sum(a.as_ptr(), 20, b.as_ptr(), 20, 20, 2, &mut sum) };
    assert_eq!(sum, 3 * 40);
  }

  #[test]
  fn test_get_statistic_outputs() {
    let src: [u8; 4] = [1, 2, 3, 250];
    let (mut min, mut max, mut average) = (0, 0, 0);
    // SAFETY: One row of 4 bytes.
    unsafe { pixsimd_get_statistic(src.as_ptr(), 4, 4, 1, &mut min, &mut max, &mut average) };
    assert_eq!((min, max, average), (1, 250, 64));
  }

  #[test]
  fn test_unknown_enum_is_a_no_op() {
    let src = vec![9u8; 32];
    let mut dst = vec![0u8; 32];
    // SAFETY: One row of 32 bytes each.
    unsafe {
      pixsimd_binarization(src.as_ptr(), 32, 32, 1, 5, 1, 2, dst.as_mut_ptr(), 32, 6);
      pixsimd_operation_binary8u(src.as_ptr(), 32, src.as_ptr(), 32, 32, 1, 1, dst.as_mut_ptr(), 32, 99);
      pixsimd_operation_binary8u(src.as_ptr(), 32, src.as_ptr(), 32, 8, 1, 5, dst.as_mut_ptr(), 32, 0);
    }
    assert!(dst.iter().all(|&d| d == 0));

    let compare = CompareType::Greater as u32;
    // SAFETY: As above.
    unsafe { pixsimd_binarization(src.as_ptr(), 32, 32, 1, 5, 1, 2, dst.as_mut_ptr(), 32, compare) };
    assert!(dst.iter().all(|&d| d == 1));
  }

  #[test]
  fn test_edge_background_cycle() {
    let (width, height) = (24, 2);
    let value = vec![50u8; width * height];
    let mut background = vec![40u8; width * height];
    let mut count = vec![0u8; width * height];
    // SAFETY: Packed 24x2 planes.
    unsafe {
      pixsimd_edge_background_increment_count(
        value.as_ptr(),
        width,
        width,
        height,
        background.as_ptr(),
        width,
        count.as_mut_ptr(),
        width,
      );
      pixsimd_edge_background_adjust_range(count.as_mut_ptr(), width, width, height, background.as_mut_ptr(), width, 0);
    }
    assert!(count.iter().all(|&c| c == 0));
    assert!(background.iter().all(|&b| b == 41));
  }
}
