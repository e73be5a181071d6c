//! The same pixels at vector-aligned and misaligned addresses give the same
//! output for every variant.

#![allow(unsafe_code)]

use kernels::{
  CompareType, MAX_ALIGNMENT, OperationBinary8u,
  binarization::BINARIZATION,
  edge_background::{ADJUST_RANGE_MASKED, GROW_RANGE_FAST},
  operation::OPERATION_BINARY_8U,
  statistic::{ABS_DIFFERENCE_SUM, GET_STATISTIC},
};

const WIDTH: usize = 203;
const HEIGHT: usize = 3;

/// A plane placed `misalign` bytes past a [`MAX_ALIGNMENT`] boundary.
struct Image {
  buf: Vec<u8>,
  offset: usize,
  stride: usize,
}

impl Image {
  fn new(stride: usize, misalign: usize, pixel: impl Fn(usize, usize) -> u8) -> Self {
    let buf = vec![0u8; stride * HEIGHT + 2 * MAX_ALIGNMENT];
    let offset = buf.as_ptr().align_offset(MAX_ALIGNMENT) + misalign;
    let mut image = Self { buf, offset, stride };
    for y in 0..HEIGHT {
      for x in 0..WIDTH {
        image.buf[offset + y * stride + x] = pixel(x, y);
      }
    }
    image
  }

  /// Aligned base and stride.
  fn aligned(pixel: impl Fn(usize, usize) -> u8) -> Self {
    Self::new(256, 0, pixel)
  }

  /// Odd base and stride.
  fn misaligned(pixel: impl Fn(usize, usize) -> u8) -> Self {
    Self::new(211, 1, pixel)
  }

  fn ptr(&self) -> *const u8 {
    self.buf[self.offset..].as_ptr()
  }

  fn mut_ptr(&mut self) -> *mut u8 {
    self.buf[self.offset..].as_mut_ptr()
  }

  fn rows(&self) -> Vec<&[u8]> {
    (0..HEIGHT).map(|y| &self.buf[self.offset + y * self.stride..][..WIDTH]).collect()
  }
}

fn a(x: usize, y: usize) -> u8 {
  (x * 7 + y * 31) as u8
}

fn b(x: usize, y: usize) -> u8 {
  (x * 13 + y * 5 + 100) as u8
}

fn mask(x: usize, y: usize) -> u8 {
  if (x + y) % 3 == 0 { 0xFF } else { 0 }
}

#[test]
fn statistics_ignore_alignment() {
  let (a0, b0) = (Image::aligned(a), Image::aligned(b));
  let (a1, b1) = (Image::misaligned(a), Image::misaligned(b));
  for entry in ABS_DIFFERENCE_SUM.available() {
    // SAFETY: Each image holds HEIGHT rows of its stride; `available` yields supported variants only.
    let (aligned, misaligned) = unsafe {
      (
        (entry.func)(a0.ptr(), a0.stride, b0.ptr(), b0.stride, WIDTH, HEIGHT),
        (entry.func)(a1.ptr(), a1.stride, b1.ptr(), b1.stride, WIDTH, HEIGHT),
      )
    };
    assert_eq!(aligned, misaligned, "{}", entry.name);
  }
  for entry in GET_STATISTIC.available() {
    // SAFETY: As above.
    let (aligned, misaligned) =
      unsafe { ((entry.func)(a0.ptr(), a0.stride, WIDTH, HEIGHT), (entry.func)(a1.ptr(), a1.stride, WIDTH, HEIGHT)) };
    assert_eq!(aligned, misaligned, "{}", entry.name);
  }
}

#[test]
fn operation_ignores_alignment() {
  let (a0, b0, a1, b1) = (Image::aligned(a), Image::aligned(b), Image::misaligned(a), Image::misaligned(b));
  for entry in OPERATION_BINARY_8U.available() {
    let (mut d0, mut d1) = (Image::aligned(|_, _| 0), Image::misaligned(|_, _| 0));
    let (s0, s1) = (d0.stride, d1.stride);
    let op = OperationBinary8u::Average;
    // SAFETY: As above.
    unsafe {
      (entry.func)(a0.ptr(), a0.stride, b0.ptr(), b0.stride, WIDTH, HEIGHT, d0.mut_ptr(), s0, op);
      (entry.func)(a1.ptr(), a1.stride, b1.ptr(), b1.stride, WIDTH, HEIGHT, d1.mut_ptr(), s1, op);
    }
    assert_eq!(d0.rows(), d1.rows(), "{}", entry.name);
  }
}

#[test]
fn binarization_ignores_alignment() {
  let (s0, s1) = (Image::aligned(a), Image::misaligned(a));
  for entry in BINARIZATION.available() {
    let (mut d0, mut d1) = (Image::aligned(|_, _| 0), Image::misaligned(|_, _| 0));
    let (ds0, ds1) = (d0.stride, d1.stride);
    // SAFETY: As above.
    unsafe {
      (entry.func)(s0.ptr(), s0.stride, WIDTH, HEIGHT, 128, 1, 2, d0.mut_ptr(), ds0, CompareType::GreaterOrEqual);
      (entry.func)(s1.ptr(), s1.stride, WIDTH, HEIGHT, 128, 1, 2, d1.mut_ptr(), ds1, CompareType::GreaterOrEqual);
    }
    assert_eq!(d0.rows(), d1.rows(), "{}", entry.name);
  }
}

#[test]
fn edge_background_ignores_alignment() {
  let (v0, v1) = (Image::aligned(a), Image::misaligned(a));
  for entry in GROW_RANGE_FAST.available() {
    let (mut bg0, mut bg1) = (Image::aligned(b), Image::misaligned(b));
    let (s0, s1) = (bg0.stride, bg1.stride);
    // SAFETY: As above.
    unsafe {
      (entry.func)(v0.ptr(), v0.stride, WIDTH, HEIGHT, bg0.mut_ptr(), s0);
      (entry.func)(v1.ptr(), v1.stride, WIDTH, HEIGHT, bg1.mut_ptr(), s1);
    }
    assert_eq!(bg0.rows(), bg1.rows(), "{}", entry.name);
  }

  let (m0, m1) = (Image::aligned(mask), Image::misaligned(mask));
  for entry in ADJUST_RANGE_MASKED.available() {
    let (mut c0, mut c1) = (Image::aligned(a), Image::misaligned(a));
    let (mut bg0, mut bg1) = (Image::aligned(b), Image::misaligned(b));
    let (cs0, cs1, bs0, bs1) = (c0.stride, c1.stride, bg0.stride, bg1.stride);
    // SAFETY: As above.
    unsafe {
      (entry.func)(c0.mut_ptr(), cs0, WIDTH, HEIGHT, bg0.mut_ptr(), bs0, 90, m0.ptr(), m0.stride);
      (entry.func)(c1.mut_ptr(), cs1, WIDTH, HEIGHT, bg1.mut_ptr(), bs1, 90, m1.ptr(), m1.stride);
    }
    assert_eq!(c0.rows(), c1.rows(), "{}", entry.name);
    assert_eq!(bg0.rows(), bg1.rows(), "{}", entry.name);
  }
}
