//! A base-only override applies to everything read from the capability
//! snapshot: dispatch, buffer alignment and the reported CPU flags.
//!
//! The override is process-wide and must precede the first detection, so
//! this binary holds a single test.

#![cfg(not(miri))]
#![allow(unsafe_code)]

use pixsimd::{CapabilitySet, PixelFormat, Tier, View, ffi};

#[test]
fn base_only_override_shrinks_alignment_and_cpu_info() {
  pixsimd::try_set_override(Some(CapabilitySet::BASE_ONLY)).unwrap();

  let caps = pixsimd::capabilities();
  assert_eq!(caps.best(), Tier::Base);
  assert_eq!(pixsimd::alignment(), size_of::<usize>());
  assert_eq!(ffi::pixsimd_alignment(), size_of::<usize>());
  assert_eq!(pixsimd::cpu_info(), 0);
  assert_eq!(ffi::pixsimd_cpu_info(), 0);

  let view = View::new(17, 3, PixelFormat::Gray8).unwrap();
  assert_eq!(view.stride(), 17usize.next_multiple_of(size_of::<usize>()));
  assert_eq!(view.as_ptr().addr() % size_of::<usize>(), 0);

  let block = ffi::pixsimd_allocate(100, 0);
  assert!(!block.is_null());
  assert_eq!(block.addr() % size_of::<usize>(), 0);
  // SAFETY: `block` came from `pixsimd_allocate`.
  unsafe { ffi::pixsimd_free(block) };

  assert_eq!(pixsimd::try_set_override(None), Err(pixsimd::OverrideError::AlreadyInitialized));
}
