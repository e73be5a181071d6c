//! Fuzz target for view geometry.
//!
//! Wraps caller memory, carves arbitrary regions and runs kernels through
//! them. Nothing outside the region may change, and the region's result
//! must equal the same kernel on a packed copy.

#![no_main]

use arbitrary::Arbitrary;
use kernels::{CompareType, PixelFormat, View, ops};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  width: u8,
  height: u8,
  pad: u8,
  region: (u8, u8, u8, u8),
  value: u8,
  data: Vec<u8>,
}

fuzz_target!(|input: Input| {
  let width = usize::from(input.width);
  let height = usize::from(input.height % 16);
  let stride = width + usize::from(input.pad % 32);
  let len = stride * height;
  let mut src: Vec<u8> =
    if input.data.is_empty() { vec![0; len] } else { input.data.iter().copied().cycle().take(len).collect() };
  let mut dst = vec![0u8; len];
  let original = src.clone();

  let Ok(mut src_view) = View::wrap(width, height, stride, PixelFormat::Gray8, &mut src) else {
    return;
  };
  let Ok(mut dst_view) = View::wrap(width, height, stride, PixelFormat::Gray8, &mut dst) else {
    return;
  };

  let (l, t, r, b) = input.region;
  let (l, t, r, b) = (usize::from(l), usize::from(t), usize::from(r), usize::from(b));
  let region = src_view.region(l, t, r, b);
  let (rw, rh) = (region.width(), region.height());
  assert!(rw <= width && rh <= height);

  let packed = region.to_owned().unwrap();
  let stat = ops::get_statistic(&region).unwrap();
  assert_eq!(stat, ops::get_statistic(&packed).unwrap());
  drop(region);

  let region = src_view.region(l, t, r, b);
  let mut dst_region = dst_view.region(l, t, r, b);
  ops::binarization(&region, input.value, 1, 2, &mut dst_region, CompareType::Greater).unwrap();
  drop(region);
  drop(dst_region);
  drop(src_view);
  drop(dst_view);

  let (x0, y0) = (l.min(width), t.min(height));
  for y in 0..height {
    for x in 0..stride {
      let i = y * stride + x;
      let inside = (x0..x0 + rw).contains(&x) && (y0..y0 + rh).contains(&y);
      let expected = match inside {
        true if original[i] > input.value => 1,
        true => 2,
        false => 0,
      };
      assert_eq!(dst[i], expected, "({x}, {y})");
    }
  }
  assert_eq!(src, original);
});
