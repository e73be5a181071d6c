//! Capability-adaptive SIMD pixel kernels.
//!
//! `pixsimd` runs 8-bit image kernels through the fastest instruction set the
//! CPU and OS support, chosen once per process and cached. Every kernel has a
//! portable variant plus SSE2, AVX2 and AVX-512BW variants on x86_64 and a
//! NEON variant on aarch64, all producing byte-identical output.
//!
//! # Quick Start
//!
//! ```
//! use pixsimd::{CompareType, PixelFormat, View, ops};
//!
//! let mut src = View::new(640, 480, PixelFormat::Gray8)?;
//! let mut dst = View::new(640, 480, PixelFormat::Gray8)?;
//! src.region(100, 100, 200, 200).fill(255);
//!
//! ops::binarization(&src, 128, 1, 0, &mut dst, CompareType::Greater)?;
//! let stat = ops::get_statistic(&dst)?;
//! assert_eq!((stat.min, stat.max), (0, 1));
//!
//! println!("running on {}", pixsimd::capabilities().best());
//! # Ok::<(), pixsimd::Error>(())
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std` | Yes | Runtime CPU detection and cached dispatch |
//! | `alloc` | Yes | Owned [`View`]s (implied by `std`) |
//! | `sse2`, `avx2`, `avx512bw`, `neon` | Yes | Compile the matching kernel variants |
//! | `log` | No | Log capability detection and first selections |
//!
//! ## `no_std` Usage
//!
//! ```toml
//! [dependencies]
//! pixsimd = { version = "0.1", default-features = false, features = ["sse2"] }
//! ```
//!
//! Without `std`, variants are selected from compile-time target features
//! only, and views must wrap caller memory.
//!
//! # C ABI
//!
//! The [`ffi`] module exports one `pixsimd_*` symbol per kernel, plus
//! `pixsimd_alignment`, `pixsimd_align`, `pixsimd_allocate` and
//! `pixsimd_free` for buffers the kernels like; build the `staticlib` or
//! `cdylib` artifact to link it from C.
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing))]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod ffi;
mod info;

// =============================================================================
// Images
// =============================================================================

pub use info::{CpuInfoFlag, cpu_info, version};
pub use kernels::{
  CompareType, Error, MAX_ALIGNMENT, OperationBinary8u, PixelFormat, Position, Statistic, View, alignment,
  alignment_for, binarization, edge_background, operation, ops, statistic,
};

// =============================================================================
// Dispatch
// =============================================================================

pub use backend::{Dispatcher, Entry, Selected};
pub use platform::{CapabilitySet, OverrideError, Tier, capabilities, is_enabled, try_set_override};
