extern crate std;

use std::{vec, vec::Vec};

use proptest::prelude::*;

use super::*;

fn compare_type() -> impl Strategy<Value = CompareType> {
  (0u32..6).prop_map(|raw| CompareType::from_raw(raw).unwrap_or(CompareType::Equal))
}

proptest! {
  #[test]
  fn binarization_variants_match_reference(
    width in 0usize..=160,
    height in 1usize..=3,
    pad in 0usize..=7,
    offset in 0usize..=3,
    value in any::<u8>(),
    positive in any::<u8>(),
    negative in any::<u8>(),
    compare in compare_type(),
    seed in any::<u64>(),
  ) {
    let stride = width + pad;
    let len = offset + stride * height;
    let src: Vec<u8> = (0..len).map(|i| (seed.rotate_left(i as u32 % 64) as u8) ^ (i as u8)).collect();
    let mut expected = vec![0xA5u8; len];
    for y in 0..height {
      for x in 0..width {
        let i = offset + y * stride + x;
        expected[i] = if compare.compare(src[i], value) { positive } else { negative };
      }
    }

    for entry in BINARIZATION.available() {
      let mut dst = vec![0xA5u8; len];
      // SAFETY: `available` only yields variants the host supports; both buffers hold `height` rows of `stride`.
      unsafe {
        (entry.func)(
          src[offset..].as_ptr(), stride, width, height, value, positive, negative,
          dst[offset..].as_mut_ptr(), stride, compare,
        );
      }
      // Padding bytes must be untouched.
      prop_assert_eq!(&dst, &expected, "{}", entry.name);
    }
  }
}
