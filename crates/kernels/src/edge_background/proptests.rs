extern crate std;

use std::{vec, vec::Vec};

use proptest::prelude::*;

use super::*;

/// Three planes sharing `(width, height, stride, offset)`.
#[derive(Debug, Clone)]
struct Planes {
  width: usize,
  height: usize,
  stride: usize,
  offset: usize,
  a: Vec<u8>,
  b: Vec<u8>,
  c: Vec<u8>,
}

fn planes() -> impl Strategy<Value = Planes> {
  (0usize..=100, 1usize..=3, 0usize..=5, 0usize..=3).prop_flat_map(|(width, height, pad, offset)| {
    let stride = width + pad;
    let len = offset + stride * height;
    // Values near each other so `>` and `==` both occur often.
    let bytes = proptest::collection::vec(prop_oneof![0u8..=4, 250u8..=255, any::<u8>()], len);
    (bytes.clone(), bytes.clone(), bytes).prop_map(move |(a, b, c)| Planes { width, height, stride, offset, a, b, c })
  })
}

impl Planes {
  fn ptr(&self, plane: &[u8]) -> *const u8 {
    plane[self.offset..].as_ptr()
  }
}

fn mut_ptr(plane: &mut [u8], offset: usize) -> *mut u8 {
  plane[offset..].as_mut_ptr()
}

proptest! {
  #[test]
  fn range_variants_match_portable(p in planes()) {
    let (w, h, s, o) = (p.width, p.height, p.stride, p.offset);
    let cases: [(&Dispatcher<RangeFn>, RangeFn); 3] = [
      (&GROW_RANGE_SLOW, portable::grow_range_slow),
      (&GROW_RANGE_FAST, portable::grow_range_fast),
      (&SHIFT_RANGE, portable::shift_range),
    ];
    for (dispatcher, reference) in cases {
      let mut expected = p.b.clone();
      // SAFETY: every plane holds `height` rows of `stride` after `offset`.
      unsafe { reference(p.ptr(&p.a), s, w, h, mut_ptr(&mut expected, o), s) };
      for entry in dispatcher.available() {
        let mut got = p.b.clone();
        // SAFETY: as above; `available` only yields host-supported variants.
        unsafe { (entry.func)(p.ptr(&p.a), s, w, h, mut_ptr(&mut got, o), s) };
        prop_assert_eq!(&got, &expected, "{} {}", dispatcher.algorithm(), entry.name);
      }
    }
  }

  #[test]
  fn increment_count_variants_match_portable(p in planes()) {
    let (w, h, s, o) = (p.width, p.height, p.stride, p.offset);
    let mut expected = p.c.clone();
    // SAFETY: as above.
    unsafe { portable::increment_count(p.ptr(&p.a), s, w, h, p.ptr(&p.b), s, mut_ptr(&mut expected, o), s) };
    for entry in INCREMENT_COUNT.available() {
      let mut got = p.c.clone();
      // SAFETY: as above.
      unsafe { (entry.func)(p.ptr(&p.a), s, w, h, p.ptr(&p.b), s, mut_ptr(&mut got, o), s) };
      prop_assert_eq!(&got, &expected, "{}", entry.name);
    }
  }

  #[test]
  fn adjust_range_variants_match_portable(p in planes(), threshold in any::<u8>()) {
    let (w, h, s, o) = (p.width, p.height, p.stride, p.offset);
    let (mut count, mut value) = (p.a.clone(), p.b.clone());
    // SAFETY: as above.
    unsafe { portable::adjust_range(mut_ptr(&mut count, o), s, w, h, mut_ptr(&mut value, o), s, threshold) };
    for entry in ADJUST_RANGE.available() {
      let (mut got_count, mut got_value) = (p.a.clone(), p.b.clone());
      // SAFETY: as above.
      unsafe { (entry.func)(mut_ptr(&mut got_count, o), s, w, h, mut_ptr(&mut got_value, o), s, threshold) };
      prop_assert_eq!(&got_count, &count, "{}", entry.name);
      prop_assert_eq!(&got_value, &value, "{}", entry.name);
    }
  }

  #[test]
  fn adjust_range_masked_variants_match_portable(p in planes(), threshold in any::<u8>()) {
    let (w, h, s, o) = (p.width, p.height, p.stride, p.offset);
    let mask = p.ptr(&p.c);
    let (mut count, mut value) = (p.a.clone(), p.b.clone());
    // SAFETY: as above.
    unsafe {
      portable::adjust_range_masked(mut_ptr(&mut count, o), s, w, h, mut_ptr(&mut value, o), s, threshold, mask, s);
    }
    for entry in ADJUST_RANGE_MASKED.available() {
      let (mut got_count, mut got_value) = (p.a.clone(), p.b.clone());
      // SAFETY: as above.
      unsafe {
        (entry.func)(mut_ptr(&mut got_count, o), s, w, h, mut_ptr(&mut got_value, o), s, threshold, mask, s);
      }
      prop_assert_eq!(&got_count, &count, "{}", entry.name);
      prop_assert_eq!(&got_value, &value, "{}", entry.name);
    }
  }

  #[test]
  fn shift_range_masked_variants_match_portable(p in planes()) {
    let (w, h, s, o) = (p.width, p.height, p.stride, p.offset);
    let mut expected = p.b.clone();
    // SAFETY: as above.
    unsafe { portable::shift_range_masked(p.ptr(&p.a), s, w, h, mut_ptr(&mut expected, o), s, p.ptr(&p.c), s) };
    for entry in SHIFT_RANGE_MASKED.available() {
      let mut got = p.b.clone();
      // SAFETY: as above.
      unsafe { (entry.func)(p.ptr(&p.a), s, w, h, mut_ptr(&mut got, o), s, p.ptr(&p.c), s) };
      prop_assert_eq!(&got, &expected, "{}", entry.name);
    }
  }
}

#[test]
fn padding_is_never_written() {
  let (width, stride, height) = (37usize, 48usize, 3usize);
  let value = vec![200u8; stride * height];
  for entry in GROW_RANGE_FAST.available() {
    let mut background = vec![7u8; stride * height];
    // SAFETY: 3 rows of 48 bytes.
    unsafe { (entry.func)(value.as_ptr(), stride, width, height, background.as_mut_ptr(), stride) };
    for (i, &b) in background.iter().enumerate() {
      assert_eq!(b, if i % stride < width { 200 } else { 7 }, "{} byte {i}", entry.name);
    }
  }
}
