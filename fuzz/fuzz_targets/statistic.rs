//! Fuzz target for the statistic kernels.
//!
//! Every available variant must agree with the portable one on arbitrary
//! shapes, strides and contents.

#![no_main]

use arbitrary::Arbitrary;
use kernels::kernel_test::{
  Plane, run_all_abs_difference_sum, run_all_abs_difference_sum_masked, run_all_get_statistic, verify,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  width: u8,
  height: u8,
  pad: u8,
  index: u8,
  a: Vec<u8>,
  b: Vec<u8>,
  mask: Vec<u8>,
}

/// `height` rows of `stride` bytes, filled by cycling `seed`.
fn buffer(seed: &[u8], stride: usize, height: usize) -> Vec<u8> {
  let len = stride * height;
  if seed.is_empty() {
    return vec![0; len];
  }
  seed.iter().copied().cycle().take(len).collect()
}

fuzz_target!(|input: Input| {
  let width = usize::from(input.width) * 2;
  let height = usize::from(input.height % 8);
  let stride = width + usize::from(input.pad % 64);

  let a = buffer(&input.a, stride, height);
  let b = buffer(&input.b, stride, height);
  let mask = buffer(&input.mask, stride, height);
  let (Some(a), Some(b), Some(mask)) = (
    Plane::new(&a, width, height, stride),
    Plane::new(&b, width, height, stride),
    Plane::new(&mask, width, height, stride),
  ) else {
    return;
  };

  let sum = verify(run_all_abs_difference_sum(a, b)).unwrap();
  let masked = verify(run_all_abs_difference_sum_masked(a, b, mask, input.index)).unwrap();
  assert!(masked <= sum, "masked sum {masked} exceeds full sum {sum}");

  let stat = verify(run_all_get_statistic(a)).unwrap();
  if width != 0 && height != 0 {
    assert!(stat.min <= stat.average && stat.average <= stat.max, "{stat:?}");
  }
});
