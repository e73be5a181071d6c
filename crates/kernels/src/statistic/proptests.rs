extern crate std;

use std::vec::Vec;

use proptest::prelude::*;

use super::*;

/// `(width, height, stride, offset, a, b)` with both planes sharing a layout.
fn planes() -> impl Strategy<Value = (usize, usize, usize, usize, Vec<u8>, Vec<u8>)> {
  (0usize..=200, 1usize..=4, 0usize..=9, 0usize..=3).prop_flat_map(|(width, height, pad, offset)| {
    let stride = width + pad;
    let len = offset + stride * height;
    (
      Just(width),
      Just(height),
      Just(stride),
      Just(offset),
      proptest::collection::vec(any::<u8>(), len),
      proptest::collection::vec(any::<u8>(), len),
    )
  })
}

fn reference_abs_difference_sum(a: &[u8], b: &[u8], stride: usize, width: usize, height: usize) -> u64 {
  (0..height)
    .flat_map(|y| (0..width).map(move |x| y * stride + x))
    .map(|i| u64::from(a[i].abs_diff(b[i])))
    .sum()
}

proptest! {
  #[test]
  fn abs_difference_sum_variants_match_reference((width, height, stride, offset, a, b) in planes()) {
    let expected = reference_abs_difference_sum(&a[offset..], &b[offset..], stride, width, height);
    for entry in ABS_DIFFERENCE_SUM.available() {
      // SAFETY: `available` only yields variants the host supports; the planes hold `height` rows of `stride`.
      let got = unsafe { (entry.func)(a[offset..].as_ptr(), stride, b[offset..].as_ptr(), stride, width, height) };
      prop_assert_eq!(got, expected, "{}", entry.name);
    }
  }

  #[test]
  fn abs_difference_sum_masked_variants_match_portable(
    (width, height, stride, offset, a, b) in planes(),
    index in 0u8..=3,
  ) {
    // A low-cardinality mask so each index is hit often.
    let mask: Vec<u8> = a.iter().zip(&b).map(|(&x, &y)| (x ^ y) & 3).collect();
    let (pa, pb, pm) = (a[offset..].as_ptr(), b[offset..].as_ptr(), mask[offset..].as_ptr());
    // SAFETY: as above.
    let expected =
      unsafe { portable::abs_difference_sum_masked(pa, stride, pb, stride, pm, stride, index, width, height) };
    for entry in ABS_DIFFERENCE_SUM_MASKED.available() {
      // SAFETY: as above.
      let got = unsafe { (entry.func)(pa, stride, pb, stride, pm, stride, index, width, height) };
      prop_assert_eq!(got, expected, "{}", entry.name);
    }
  }

  #[test]
  fn get_statistic_variants_match_portable((width, height, stride, offset, a, _b) in planes()) {
    prop_assume!(width > 0);
    let src = a[offset..].as_ptr();
    // SAFETY: as above.
    let expected = unsafe { portable::get_statistic(src, stride, width, height) };
    for entry in GET_STATISTIC.available() {
      // SAFETY: as above.
      let got = unsafe { (entry.func)(src, stride, width, height) };
      prop_assert_eq!(got, expected, "{}", entry.name);
    }
  }
}
