// ─────────────────────────────────────────────────────────────────────────────
// Process-wide Capability Set
// ─────────────────────────────────────────────────────────────────────────────

use core::fmt;

use crate::{capability::CapabilitySet, probe::HostProbe};

#[cfg(all(feature = "std", not(miri)))]
use std::sync::{OnceLock, RwLock};

#[cfg(all(feature = "std", not(miri)))]
static STD_CACHE: OnceLock<CapabilitySet> = OnceLock::new();

#[cfg(all(feature = "std", not(miri)))]
static OVERRIDE: RwLock<Option<CapabilitySet>> = RwLock::new(None);

/// The capability set of this process.
///
/// Computed on first call and never changed afterwards; every call returns the
/// same value.
///
/// # Caching
///
/// - With `std`: a `OnceLock`; concurrent first callers block until one finishes.
/// - Without `std` on targets with atomics: an atomic state machine; concurrent first callers spin.
/// - Otherwise: recomputed per call from compile-time features, which is a constant.
///
/// # Miri
///
/// Under Miri only [`Tier::Base`](crate::Tier::Base) is enabled.
#[inline]
#[must_use]
pub fn capabilities() -> CapabilitySet {
  #[cfg(miri)]
  {
    CapabilitySet::BASE_ONLY
  }

  #[cfg(all(not(miri), feature = "std"))]
  {
    *STD_CACHE.get_or_init(detect_with_override)
  }

  #[cfg(all(not(miri), not(feature = "std"), target_has_atomic = "8"))]
  {
    atomic_cache::get_or_init(detect_with_override)
  }

  #[cfg(all(not(miri), not(feature = "std"), not(target_has_atomic = "8")))]
  {
    detect_with_override()
  }
}

/// Error from [`try_set_override`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum OverrideError {
  /// [`capabilities`] already ran; the process-wide set is fixed.
  AlreadyInitialized,
  /// Overrides cannot be stored on this target.
  Unsupported,
}

impl fmt::Display for OverrideError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::AlreadyInitialized => f.write_str("capabilities already initialized"),
      Self::Unsupported => f.write_str("capability override not supported on this target"),
    }
  }
}

impl core::error::Error for OverrideError {}

/// Replace host detection with `value`.
///
/// Contract: pre-init only. Once [`capabilities`] has run, this returns
/// [`OverrideError::AlreadyInitialized`] and the observed set stays as it was.
/// Passing `None` clears a pending override.
///
/// The override is trusted: enabling a tier the host lacks makes vector
/// kernels fault.
#[cold]
pub fn try_set_override(value: Option<CapabilitySet>) -> Result<(), OverrideError> {
  #[cfg(miri)]
  {
    let _ = value;
    Err(OverrideError::Unsupported)
  }

  #[cfg(all(not(miri), feature = "std"))]
  {
    if STD_CACHE.get().is_some() {
      return Err(OverrideError::AlreadyInitialized);
    }
    let mut guard = OVERRIDE.write().map_err(|_| OverrideError::Unsupported)?;
    *guard = value;
    log_override(value);
    Ok(())
  }

  #[cfg(all(not(miri), not(feature = "std"), target_has_atomic = "8"))]
  {
    atomic_cache::try_set_override(value).inspect(|_| log_override(value))
  }

  #[cfg(all(not(miri), not(feature = "std"), not(target_has_atomic = "8")))]
  {
    let _ = value;
    Err(OverrideError::Unsupported)
  }
}

/// Whether an override is pending or in effect.
#[inline]
#[must_use]
pub fn has_override() -> bool {
  #[cfg(miri)]
  {
    false
  }

  #[cfg(all(not(miri), feature = "std"))]
  {
    OVERRIDE.read().map(|g| g.is_some()).unwrap_or(false)
  }

  #[cfg(all(not(miri), not(feature = "std"), target_has_atomic = "8"))]
  {
    atomic_cache::has_override()
  }

  #[cfg(all(not(miri), not(feature = "std"), not(target_has_atomic = "8")))]
  {
    false
  }
}

#[cold]
#[cfg(not(miri))]
fn detect_with_override() -> CapabilitySet {
  #[cfg(feature = "std")]
  {
    if let Ok(guard) = OVERRIDE.read()
      && let Some(ov) = *guard
    {
      return ov;
    }
  }

  #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
  {
    if let Some(ov) = atomic_cache::get_override() {
      return ov;
    }
  }

  let set = CapabilitySet::from_probe(&HostProbe::detect());
  #[cfg(feature = "log")]
  log::debug!("detected capabilities: {set}; features {:?}", set.features());
  set
}

#[cfg(not(miri))]
#[allow(unused_variables)]
fn log_override(value: Option<CapabilitySet>) {
  #[cfg(feature = "log")]
  {
    match value {
      Some(set) => log::debug!("capability override installed: {set}"),
      None => log::debug!("capability override cleared"),
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Atomic Cache (no_std with atomics)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(all(not(miri), not(feature = "std"), target_has_atomic = "8"))]
#[allow(unsafe_code)]
mod atomic_cache {
  use core::{
    cell::UnsafeCell,
    sync::atomic::{AtomicBool, AtomicU8, Ordering},
  };

  use super::*;

  const STATE_UNINIT: u8 = 0;
  const STATE_INITING: u8 = 1;
  const STATE_READY: u8 = 2;

  struct Slot<T>(UnsafeCell<T>);

  // SAFETY: Slot access is synchronized by explicit atomic state transitions in this module.
  unsafe impl<T> Sync for Slot<T> {}

  impl<T> Slot<T> {
    const fn new(value: T) -> Self {
      Self(UnsafeCell::new(value))
    }
  }

  static STATE: AtomicU8 = AtomicU8::new(STATE_UNINIT);
  static CACHED: Slot<CapabilitySet> = Slot::new(CapabilitySet::BASE_ONLY);

  static OVERRIDE_SET: AtomicBool = AtomicBool::new(false);
  static OVERRIDE_VALUE: Slot<Option<CapabilitySet>> = Slot::new(None);

  pub fn get_or_init(f: fn() -> CapabilitySet) -> CapabilitySet {
    if STATE.load(Ordering::Acquire) == STATE_READY {
      return load_cached();
    }

    match STATE.compare_exchange(STATE_UNINIT, STATE_INITING, Ordering::AcqRel, Ordering::Acquire) {
      Ok(_) => {
        let result = f();
        // SAFETY: Single writer while STATE_INITING; readers are blocked until STATE_READY.
        unsafe {
          *CACHED.0.get() = result;
        }
        STATE.store(STATE_READY, Ordering::Release);
        result
      }
      Err(STATE_INITING) => {
        while STATE.load(Ordering::Acquire) == STATE_INITING {
          core::hint::spin_loop();
        }
        load_cached()
      }
      Err(_) => load_cached(),
    }
  }

  fn load_cached() -> CapabilitySet {
    // SAFETY: Readers only access after STATE_READY with Acquire ordering.
    unsafe { *CACHED.0.get() }
  }

  pub fn try_set_override(value: Option<CapabilitySet>) -> Result<(), OverrideError> {
    if STATE.load(Ordering::Acquire) != STATE_UNINIT {
      return Err(OverrideError::AlreadyInitialized);
    }

    // SAFETY: Override writes are pre-init only; readers gate on OVERRIDE_SET.
    unsafe {
      *OVERRIDE_VALUE.0.get() = value;
    }
    OVERRIDE_SET.store(value.is_some(), Ordering::Release);
    Ok(())
  }

  pub fn has_override() -> bool {
    OVERRIDE_SET.load(Ordering::Acquire)
  }

  pub fn get_override() -> Option<CapabilitySet> {
    if !OVERRIDE_SET.load(Ordering::Acquire) {
      return None;
    }
    // SAFETY: OVERRIDE_SET is observed true with Acquire before reading payload.
    unsafe { *OVERRIDE_VALUE.0.get() }
  }
}
