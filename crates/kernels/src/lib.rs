//! Capability-dispatched pixel kernels.
//!
//! Every kernel exists once as portable scalar code and once per vector tier
//! (SSE2, AVX2, AVX-512BW on x86_64; NEON on aarch64). Each algorithm family
//! publishes a static [`Dispatcher`](backend::Dispatcher) and a raw `unsafe fn`
//! entry point that picks the strongest variant the host supports for the
//! call's row size.
//!
//! # Layers
//!
//! - **Raw entry points** (`statistic::abs_difference_sum`, ...): pointers,
//!   strides and dimensions, with `debug_assert!` contracts only
//! - **[`ops`]**: the same kernels over [`View`]s, validated and returning
//!   [`Error`]
//! - **[`kernel_test`]**: run every available variant and compare against the
//!   portable one
//!
//! # Example
//!
//! ```
//! use kernels::{PixelFormat, Statistic, View, ops};
//!
//! let mut src = View::new(100, 4, PixelFormat::Gray8)?;
//! src.fill(42);
//! src.pixel_mut(7, 2)[0] = 200;
//!
//! let stat = ops::get_statistic(&src)?;
//! assert_eq!(stat, Statistic { min: 42, max: 200, average: 42 });
//! # Ok::<(), kernels::Error>(())
//! ```
//!
//! # Variant discipline
//!
//! A vector variant whose row is shorter than one vector calls the portable
//! variant. Otherwise it checks every base pointer and stride for vector
//! alignment once per call and runs the aligned or unaligned instantiation of
//! a generic inner loop. Row tails are finished with one overlapping vector
//! (idempotent kernels), a scalar loop (accumulating kernels), or a masked
//! load/store (AVX-512). Nothing outside `width` bytes of a row is read or
//! written.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod error;
pub mod simd;
pub mod view;

// ─────────────────────────────────────────────────────────────────────────────
// Algorithms
// ─────────────────────────────────────────────────────────────────────────────

pub mod binarization;
pub mod edge_background;
pub mod operation;
pub mod ops;
pub mod statistic;


// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

pub use binarization::CompareType;
pub use error::Error;
pub use operation::OperationBinary8u;
pub use statistic::Statistic;
pub use view::{MAX_ALIGNMENT, PixelFormat, Position, View, alignment, alignment_for};
