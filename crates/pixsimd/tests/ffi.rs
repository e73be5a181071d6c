//! The C ABI agrees with the view API on strided, offset buffers.

#![allow(unsafe_code)]

use pixsimd::{CompareType, CpuInfoFlag, OperationBinary8u, PixelFormat, Tier, View, ffi, ops};

const WIDTH: usize = 37;
const HEIGHT: usize = 5;
const STRIDE: usize = 41;

fn plane(seed: u8) -> Vec<u8> {
  (0..STRIDE * HEIGHT).map(|i| (i as u8).wrapping_mul(29).wrapping_add(seed)).collect()
}

fn view(buf: &mut [u8]) -> View<'_> {
  View::wrap(WIDTH, HEIGHT, STRIDE, PixelFormat::Gray8, buf).unwrap()
}

#[test]
fn statistic_matches_views() {
  let (mut a, mut b, mut mask) = (plane(1), plane(90), plane(0));
  for m in &mut mask {
    *m %= 3;
  }

  let (mut sum, mut masked) = (0u64, 0u64);
  let (mut min, mut max, mut average) = (0u8, 0u8, 0u8);
  // SAFETY: Every plane holds HEIGHT rows of STRIDE bytes.
  unsafe {
    ffi::pixsimd_abs_difference_sum(a.as_ptr(), STRIDE, b.as_ptr(), STRIDE, WIDTH, HEIGHT, &mut sum);
    ffi::pixsimd_abs_difference_sum_masked(
      a.as_ptr(),
      STRIDE,
      b.as_ptr(),
      STRIDE,
      mask.as_ptr(),
      STRIDE,
      2,
      WIDTH,
      HEIGHT,
      &mut masked,
    );
    ffi::pixsimd_get_statistic(a.as_ptr(), STRIDE, WIDTH, HEIGHT, &mut min, &mut max, &mut average);
  }

  let (va, vb, vm) = (view(&mut a), view(&mut b), view(&mut mask));
  assert_eq!(ops::abs_difference_sum(&va, &vb).unwrap(), sum);
  assert_eq!(ops::abs_difference_sum_masked(&va, &vb, &vm, 2).unwrap(), masked);
  let stat = ops::get_statistic(&va).unwrap();
  assert_eq!((stat.min, stat.max, stat.average), (min, max, average));
}

#[test]
fn writes_match_views() {
  let (mut a, mut b) = (plane(3), plane(200));
  let (mut raw, mut viewed) = (vec![0x5Au8; STRIDE * HEIGHT], vec![0x5Au8; STRIDE * HEIGHT]);

  // SAFETY: As above; `raw` does not overlap the inputs.
  unsafe {
    let op = OperationBinary8u::SaturatedAddition as u32;
    let (pa, pb, pd) = (a.as_ptr(), b.as_ptr(), raw.as_mut_ptr());
    ffi::pixsimd_operation_binary8u(pa, STRIDE, pb, STRIDE, WIDTH, HEIGHT, 1, pd, STRIDE, op);
  }
  {
    let (va, vb) = (view(&mut a), view(&mut b));
    ops::operation_binary8u(&va, &vb, &mut view(&mut viewed), OperationBinary8u::SaturatedAddition).unwrap();
  }
  assert_eq!(raw, viewed);

  // SAFETY: As above.
  unsafe {
    let compare = CompareType::LesserOrEqual as u32;
    ffi::pixsimd_binarization(a.as_ptr(), STRIDE, WIDTH, HEIGHT, 77, 3, 4, raw.as_mut_ptr(), STRIDE, compare);
  }
  ops::binarization(&view(&mut a), 77, 3, 4, &mut view(&mut viewed), CompareType::LesserOrEqual).unwrap();
  assert_eq!(raw, viewed);

  let mut mask = plane(0);
  let (mut raw_bg, mut viewed_bg) = (plane(50), plane(50));
  // SAFETY: As above.
  unsafe {
    ffi::pixsimd_edge_background_shift_range_masked(
      a.as_ptr(),
      STRIDE,
      WIDTH,
      HEIGHT,
      raw_bg.as_mut_ptr(),
      STRIDE,
      mask.as_ptr(),
      STRIDE,
    );
  }
  ops::edge_background_shift_range_masked(&view(&mut a), &mut view(&mut viewed_bg), &view(&mut mask)).unwrap();
  assert_eq!(raw_bg, viewed_bg);
}

#[test]
fn cpu_info_reflects_tiers() {
  let info = ffi::pixsimd_cpu_info();
  assert_eq!(info, pixsimd::cpu_info());
  assert_eq!(info & CpuInfoFlag::Vmx.mask(), 0);
  assert_eq!(info & CpuInfoFlag::Vsx.mask(), 0);
  assert_eq!(info & CpuInfoFlag::Avx2.mask() != 0, pixsimd::is_enabled(Tier::Avx2));
  assert_eq!(info & CpuInfoFlag::Neon.mask() != 0, pixsimd::is_enabled(Tier::Neon));
}
