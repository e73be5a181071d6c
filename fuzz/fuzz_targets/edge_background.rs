//! Fuzz target for the edge background updates.
//!
//! Runs one model-update step through every variant of each of the seven
//! kernels on shared value, background, count and mask planes.

#![no_main]

use arbitrary::Arbitrary;
use kernels::kernel_test::{
  Plane, run_all_adjust_range, run_all_adjust_range_masked, run_all_grow_range_fast, run_all_grow_range_slow,
  run_all_increment_count, run_all_shift_range, run_all_shift_range_masked, verify,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  width: u16,
  height: u8,
  pad: u8,
  threshold: u8,
  value: Vec<u8>,
  background: Vec<u8>,
  count: Vec<u8>,
  mask: Vec<u8>,
}

fn buffer(seed: &[u8], len: usize) -> Vec<u8> {
  if seed.is_empty() {
    return vec![0; len];
  }
  seed.iter().copied().cycle().take(len).collect()
}

fuzz_target!(|input: Input| {
  let width = usize::from(input.width % 512);
  let height = usize::from(input.height % 4);
  let stride = width + usize::from(input.pad % 64);
  let len = stride * height;

  let value = buffer(&input.value, len);
  let background = buffer(&input.background, len);
  let count = buffer(&input.count, len);
  let mask = buffer(&input.mask, len);
  let (Some(v), Some(bg), Some(c), Some(m)) = (
    Plane::new(&value, width, height, stride),
    Plane::new(&background, width, height, stride),
    Plane::new(&count, width, height, stride),
    Plane::new(&mask, width, height, stride),
  ) else {
    return;
  };

  let slow = verify(run_all_grow_range_slow(v, bg)).unwrap();
  let fast = verify(run_all_grow_range_fast(v, bg)).unwrap();
  for (s, f) in slow.iter().zip(&fast) {
    assert!(s <= f, "slow growth overtook fast growth");
  }
  verify(run_all_shift_range(v, bg)).unwrap();
  verify(run_all_shift_range_masked(v, bg, m)).unwrap();
  verify(run_all_increment_count(v, bg, c)).unwrap();
  verify(run_all_adjust_range(c, bg, input.threshold)).unwrap();
  verify(run_all_adjust_range_masked(c, bg, input.threshold, m)).unwrap();
});
