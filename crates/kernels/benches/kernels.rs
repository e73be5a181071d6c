//! Per-variant kernel benchmarks.
//!
//! Run: `cargo bench -p pixsimd-kernels -- abs_difference_sum`
//!
//! Every available variant of each kernel runs on the same frames, once with
//! vector-aligned rows and once with an odd base address and stride.

#![allow(unsafe_code)]

use core::hint::black_box;
use std::sync::Once;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kernels::{
  CompareType, MAX_ALIGNMENT, OperationBinary8u,
  binarization::BINARIZATION,
  edge_background::{ADJUST_RANGE, GROW_RANGE_FAST, INCREMENT_COUNT},
  operation::OPERATION_BINARY_8U,
  statistic::{ABS_DIFFERENCE_SUM, GET_STATISTIC},
};

const CASES: &[(&str, usize, usize)] = &[("qvga", 320, 240), ("vga", 640, 480), ("hd", 1920, 1080)];

fn print_platform_info() {
  static ONCE: Once = Once::new();
  ONCE.call_once(|| {
    let caps = platform::capabilities();
    eprintln!("platform: {caps:?} (best tier: {})", caps.best());
  });
}

/// One 8-bit frame. `misaligned` frames start one byte past an aligned
/// address and use an odd stride.
struct Frame {
  backing: Vec<u8>,
  offset: usize,
  stride: usize,
  width: usize,
  height: usize,
}

impl Frame {
  fn new(width: usize, height: usize, misaligned: bool, seed: u8) -> Self {
    let stride = if misaligned { width + 3 } else { width.next_multiple_of(MAX_ALIGNMENT) };
    let mut backing = vec![0u8; stride * height + 2 * MAX_ALIGNMENT];
    let offset = backing.as_ptr().align_offset(MAX_ALIGNMENT) + usize::from(misaligned);
    for (i, byte) in backing.iter_mut().enumerate() {
      *byte = (i as u8).wrapping_mul(31).wrapping_add(seed);
    }
    Self { backing, offset, stride, width, height }
  }

  fn ptr(&self) -> *const u8 {
    self.backing[self.offset..].as_ptr()
  }

  fn mut_ptr(&mut self) -> *mut u8 {
    self.backing[self.offset..].as_mut_ptr()
  }

  fn label(&self, case: &str) -> String {
    if self.stride % MAX_ALIGNMENT == 0 { format!("{case}/aligned") } else { format!("{case}/misaligned") }
  }
}

fn frames(width: usize, height: usize) -> [(Frame, Frame, Frame); 2] {
  [false, true].map(|misaligned| {
    (
      Frame::new(width, height, misaligned, 1),
      Frame::new(width, height, misaligned, 97),
      Frame::new(width, height, misaligned, 0),
    )
  })
}

fn bench_statistic(c: &mut Criterion) {
  print_platform_info();
  let mut group = c.benchmark_group("kernels/statistic");
  for &(case, width, height) in CASES {
    group.throughput(Throughput::Bytes((width * height) as u64));
    for (a, b, _) in &frames(width, height) {
      let param = a.label(case);
      for entry in ABS_DIFFERENCE_SUM.available() {
        let func = entry.func;
        group.bench_function(BenchmarkId::new(format!("abs_difference_sum/{}", entry.name), &param), |bench| {
          // SAFETY: Both frames hold `height` rows of `stride`; `available` yields supported variants only.
          bench.iter(|| black_box(unsafe { func(a.ptr(), a.stride, b.ptr(), b.stride, a.width, a.height) }));
        });
      }
      for entry in GET_STATISTIC.available() {
        let func = entry.func;
        group.bench_function(BenchmarkId::new(format!("get_statistic/{}", entry.name), &param), |bench| {
          // SAFETY: As above.
          bench.iter(|| black_box(unsafe { func(a.ptr(), a.stride, a.width, a.height) }));
        });
      }
    }
  }
  group.finish();
}

fn bench_operation(c: &mut Criterion) {
  print_platform_info();
  let mut group = c.benchmark_group("kernels/operation_binary8u");
  for &(case, width, height) in CASES {
    group.throughput(Throughput::Bytes((width * height) as u64));
    for (a, b, dst) in &mut frames(width, height) {
      let param = a.label(case);
      for entry in OPERATION_BINARY_8U.available() {
        let func = entry.func;
        group.bench_function(BenchmarkId::new(entry.name, &param), |bench| {
          let op = OperationBinary8u::Average;
          let (w, h) = (a.width, a.height);
          let (ds, dp) = (dst.stride, dst.mut_ptr());
          // SAFETY: As above; `dst` does not overlap the inputs.
          bench.iter(|| unsafe { func(a.ptr(), a.stride, b.ptr(), b.stride, w, h, dp, ds, black_box(op)) });
        });
      }
    }
  }
  group.finish();
}

fn bench_binarization(c: &mut Criterion) {
  print_platform_info();
  let mut group = c.benchmark_group("kernels/binarization");
  for &(case, width, height) in CASES {
    group.throughput(Throughput::Bytes((width * height) as u64));
    for (src, _, dst) in &mut frames(width, height) {
      let param = src.label(case);
      for entry in BINARIZATION.available() {
        let func = entry.func;
        group.bench_function(BenchmarkId::new(entry.name, &param), |bench| {
          let (ds, dp) = (dst.stride, dst.mut_ptr());
          let compare = CompareType::Greater;
          // SAFETY: As above.
          bench.iter(|| unsafe { func(src.ptr(), src.stride, src.width, src.height, 128, 255, 0, dp, ds, compare) });
        });
      }
    }
  }
  group.finish();
}

fn bench_edge_background(c: &mut Criterion) {
  print_platform_info();
  let mut group = c.benchmark_group("kernels/edge_background");
  for &(case, width, height) in CASES {
    group.throughput(Throughput::Bytes((width * height) as u64));
    for (value, background, count) in &mut frames(width, height) {
      let param = value.label(case);
      for entry in GROW_RANGE_FAST.available() {
        let func = entry.func;
        group.bench_function(BenchmarkId::new(format!("grow_range_fast/{}", entry.name), &param), |bench| {
          let (bs, bp) = (background.stride, background.mut_ptr());
          // SAFETY: As above.
          bench.iter(|| unsafe { func(value.ptr(), value.stride, value.width, value.height, bp, bs) });
        });
      }
      for entry in INCREMENT_COUNT.available() {
        let func = entry.func;
        group.bench_function(BenchmarkId::new(format!("increment_count/{}", entry.name), &param), |bench| {
          let (v, vs, w, h) = (value.ptr(), value.stride, value.width, value.height);
          let (cs, cp) = (count.stride, count.mut_ptr());
          // SAFETY: As above.
          bench.iter(|| unsafe { func(v, vs, w, h, background.ptr(), background.stride, cp, cs) });
        });
      }
      for entry in ADJUST_RANGE.available() {
        let func = entry.func;
        group.bench_function(BenchmarkId::new(format!("adjust_range/{}", entry.name), &param), |bench| {
          let (cs, cp) = (count.stride, count.mut_ptr());
          let (bs, bp) = (background.stride, background.mut_ptr());
          // SAFETY: As above.
          bench.iter(|| unsafe { func(cp, cs, value.width, value.height, bp, bs, black_box(8)) });
        });
      }
    }
  }
  group.finish();
}

criterion_group!(benches, bench_statistic, bench_operation, bench_binarization, bench_edge_background);
criterion_main!(benches);
