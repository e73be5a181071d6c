//! Fuzz target for `operation_binary8u`.
//!
//! Compares every variant against the portable one and against the
//! per-byte definition of the operation. Row padding in the destination
//! must survive.

#![no_main]

use arbitrary::Arbitrary;
use kernels::{
  OperationBinary8u,
  kernel_test::{Plane, run_all_operation_binary8u, verify},
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  width: u16,
  height: u8,
  pad: u8,
  op: u8,
  a: Vec<u8>,
  b: Vec<u8>,
}

fn buffer(seed: &[u8], len: usize) -> Vec<u8> {
  if seed.is_empty() {
    return vec![0; len];
  }
  seed.iter().copied().cycle().take(len).collect()
}

const SENTINEL: u8 = 0xA5;

fuzz_target!(|input: Input| {
  let Some(op) = OperationBinary8u::from_raw(u32::from(input.op % 7)) else {
    return;
  };
  let width = usize::from(input.width % 1024);
  let height = usize::from(input.height % 4);
  let stride = width + usize::from(input.pad % 64);

  let a = buffer(&input.a, stride * height);
  let b = buffer(&input.b, stride * height);
  let dst = vec![SENTINEL; stride * height];
  let (Some(pa), Some(pb), Some(pd)) = (
    Plane::new(&a, width, height, stride),
    Plane::new(&b, width, height, stride),
    Plane::new(&dst, width, height, stride),
  ) else {
    return;
  };

  let out = verify(run_all_operation_binary8u(pa, pb, pd, op)).unwrap();
  for (i, &d) in out.iter().enumerate() {
    let expected = if i % stride.max(1) < width { op.apply(a[i], b[i]) } else { SENTINEL };
    assert_eq!(d, expected, "{op:?} at byte {i}");
  }
});
