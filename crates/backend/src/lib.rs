//! Kernel dispatch for pixsimd.
//!
//! Every algorithm family publishes one static [`Dispatcher`]: an ordered
//! table of variants, strongest tier first, ending with a portable entry.
//!
//! - **Selection**: the first entry whose tier is enabled in the process
//!   [`CapabilitySet`](platform::CapabilitySet) and whose minimum size is met
//! - **Caching**: the enabled-entry mask is computed once per dispatcher
//! - **Testing**: [`Dispatcher::select_with`] takes an explicit capability set
//!
//! ```
//! use backend::{Dispatcher, Entry};
//! use platform::Tier;
//!
//! type FillFn = fn(&mut [u8], u8);
//!
//! fn fill_portable(dst: &mut [u8], value: u8) {
//!   dst.fill(value);
//! }
//!
//! static FILL: Dispatcher<FillFn> = Dispatcher::new("fill", &[Entry::base("portable", fill_portable)]);
//!
//! let mut buf = [0u8; 4];
//! (FILL.select(buf.len()).func)(&mut buf, 7);
//! assert_eq!(buf, [7; 4]);
//! assert_eq!(FILL.select(4).tier, Tier::Base);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod cache;
pub mod dispatch;

pub use cache::OnceCache;
pub use dispatch::{Dispatcher, Entry, Selected, select};
pub use platform;
