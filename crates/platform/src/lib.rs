//! CPU/OS capability probing for pixsimd.
//!
//! This crate answers one question for the rest of the workspace: which
//! instruction-set [`Tier`]s can this process run?
//!
//! # Core Types
//!
//! - [`Tier`]: an instruction-set level a kernel variant is written for
//! - [`Probe`]: per-tier CPU and OS support answers ([`HostProbe`] for the running machine)
//! - [`CapabilitySet`]: the immutable per-process result
//!
//! # Main Entry Point
//!
//! ```
//! use platform::Tier;
//!
//! let caps = platform::capabilities();
//! assert!(caps.is_enabled(Tier::Base));
//!
//! if caps.is_enabled(Tier::Avx2) {
//!   // AVX2 kernels may run.
//! }
//! ```
//!
//! # Design
//!
//! 1. **Two questions per tier**: the CPU must report the feature and the OS must save its register
//!    state. Both are evaluated once.
//! 2. **Compiled-in only**: tiers excluded through cargo features are never probed or enabled.
//! 3. **Immutable**: the set is computed on first use, cached in `OnceLock` (std) or atomics
//!    (no_std), and never changes afterwards.
//! 4. **Explicit for tests**: any [`CapabilitySet`] can be built by hand and passed to a dispatcher.
//! 5. **Miri-safe**: under Miri only [`Tier::Base`] is enabled.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

// ─────────────────────────────────────────────────────────────────────────────
// Core modules
// ─────────────────────────────────────────────────────────────────────────────

pub mod capability;
pub mod caps;
mod detect;
pub mod probe;
pub mod tier;

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

pub use capability::CapabilitySet;
pub use caps::{Arch, Caps};
pub use detect::{OverrideError, caps_static, has_override, try_set_override};
pub use probe::{HostProbe, Probe, SavedState};
pub use tier::{RegisterState, Tier};

/// The capability set of this process.
///
/// Computed on first call; every later call returns the same value.
#[inline]
#[must_use]
pub fn capabilities() -> CapabilitySet {
  detect::capabilities()
}

/// Shorthand for `capabilities().is_enabled(tier)`.
#[inline]
#[must_use]
pub fn is_enabled(tier: Tier) -> bool {
  detect::capabilities().is_enabled(tier)
}
