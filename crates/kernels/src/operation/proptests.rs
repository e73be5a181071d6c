extern crate std;

use proptest::prelude::*;

use super::*;

proptest! {
  #[test]
  fn operation_variants_match_apply(
    (row_bytes, height, stride, offset, a, b) in (0usize..=200, 1usize..=3, 0usize..=9, 0usize..=3)
      .prop_flat_map(|(row_bytes, height, pad, offset)| {
        let stride = row_bytes + pad;
        let len = offset + stride * height;
        (
          Just(row_bytes),
          Just(height),
          Just(stride),
          Just(offset),
          proptest::collection::vec(any::<u8>(), len),
          proptest::collection::vec(any::<u8>(), len),
        )
      }),
    op in proptest::sample::select(OperationBinary8u::ALL.to_vec()),
  ) {
    let mut expected = std::vec![0xA5u8; a.len()];
    for y in 0..height {
      for x in 0..row_bytes {
        let i = offset + y * stride + x;
        expected[i] = op.apply(a[i], b[i]);
      }
    }
    for entry in OPERATION_BINARY_8U.available() {
      let mut dst = std::vec![0xA5u8; a.len()];
      // SAFETY: `available` only yields host-supported variants; every buffer holds `height` rows of `stride`.
      unsafe {
        (entry.func)(
          a[offset..].as_ptr(),
          stride,
          b[offset..].as_ptr(),
          stride,
          row_bytes,
          height,
          dst[offset..].as_mut_ptr(),
          stride,
          op,
        );
      }
      prop_assert_eq!(&dst, &expected, "{} {:?}", entry.name, op);
    }
  }
}
