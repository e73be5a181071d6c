use crate::caps::Caps;
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use crate::probe::SavedState;

/// CPU features known at compile time.
///
/// Reflects `-C target-feature=...` and `-C target-cpu=...`. Features listed
/// here are guaranteed by whoever built the binary, so they are reported even
/// without runtime detection.
#[inline(always)]
#[must_use]
pub const fn caps_static() -> Caps {
  #[allow(unused_macros)]
  macro_rules! detect {
    ($caps:ident; $($feature:literal => $cap:expr),+ $(,)?) => {
      $(if cfg!(target_feature = $feature) { $caps = $caps.union($cap); })+
    };
  }

  #[allow(unused_mut)]
  let mut result = Caps::NONE;

  #[cfg(target_arch = "x86_64")]
  {
    use crate::caps::x86;

    // SSE2 is part of the x86_64 baseline.
    result = result.union(x86::SSE2);
    detect!(result;
      "sse3" => x86::SSE3,
      "ssse3" => x86::SSSE3,
      "sse4.1" => x86::SSE41,
      "sse4.2" => x86::SSE42,
      "popcnt" => x86::POPCNT,
      "fma" => x86::FMA,
      "bmi1" => x86::BMI1,
      "bmi2" => x86::BMI2,
      "avx2" => x86::AVX2,
      "avx512f" => x86::AVX512F,
      "avx512bw" => x86::AVX512BW,
      "avx512vl" => x86::AVX512VL,
      "avx512dq" => x86::AVX512DQ,
    );
    // An AVX build only runs where the OS enabled XSAVE.
    if cfg!(target_feature = "avx") {
      result = result.union(x86::AVX).union(x86::OSXSAVE);
    }
  }

  #[cfg(target_arch = "aarch64")]
  {
    use crate::caps::aarch64;

    detect!(result;
      "neon" => aarch64::NEON,
      "dotprod" => aarch64::DOTPROD,
    );
  }

  result
}

/// Register state implied by compile-time features.
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
#[inline(always)]
#[must_use]
pub const fn saved_static() -> SavedState {
  #[allow(unused_mut)]
  let mut saved = SavedState::NONE;

  #[cfg(target_arch = "x86_64")]
  {
    saved = saved.union(SavedState::XMM);
    if cfg!(target_feature = "avx") {
      saved = saved.union(SavedState::YMM);
    }
    if cfg!(target_feature = "avx512f") {
      saved = saved.union(SavedState::ZMM);
    }
  }

  #[cfg(target_arch = "aarch64")]
  {
    saved = saved.union(SavedState::NEON);
  }

  saved
}
