//! Fuzz target for `binarization`.

#![no_main]

use arbitrary::Arbitrary;
use kernels::{
  CompareType,
  kernel_test::{Plane, run_all_binarization, verify},
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  width: u16,
  height: u8,
  pad: u8,
  compare: u8,
  value: u8,
  positive: u8,
  negative: u8,
  src: Vec<u8>,
}

const SENTINEL: u8 = 0x5A;

fuzz_target!(|input: Input| {
  let Some(compare) = CompareType::from_raw(u32::from(input.compare % 6)) else {
    return;
  };
  let width = usize::from(input.width % 1024);
  let height = usize::from(input.height % 4);
  let stride = width + usize::from(input.pad % 64);
  let len = stride * height;

  let src: Vec<u8> =
    if input.src.is_empty() { vec![0; len] } else { input.src.iter().copied().cycle().take(len).collect() };
  let dst = vec![SENTINEL; len];
  let (Some(ps), Some(pd)) = (Plane::new(&src, width, height, stride), Plane::new(&dst, width, height, stride)) else {
    return;
  };

  let (value, positive, negative) = (input.value, input.positive, input.negative);
  let out = verify(run_all_binarization(ps, value, positive, negative, pd, compare)).unwrap();
  for (i, (&d, &s)) in out.iter().zip(&src).enumerate() {
    let expected = match i % stride.max(1) < width {
      true if compare.compare(s, value) => positive,
      true => negative,
      false => SENTINEL,
    };
    assert_eq!(d, expected, "{compare:?} at byte {i}");
  }
});
