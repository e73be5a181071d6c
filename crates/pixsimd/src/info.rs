//! Library and host information.

use platform::{
  Arch, Tier,
  caps::{Caps, x86},
};

/// Bit positions of [`cpu_info`]'s mask.
///
/// The numbering is part of the C ABI and never changes; flags for
/// architectures this library has no kernels for are never set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CpuInfoFlag {
  Sse = 0,
  Sse2 = 1,
  Sse3 = 2,
  Ssse3 = 3,
  Sse41 = 4,
  Sse42 = 5,
  Avx = 6,
  Avx2 = 7,
  Avx512f = 8,
  Avx512bw = 9,
  /// PowerPC Altivec.
  Vmx = 10,
  /// PowerPC VSX.
  Vsx = 11,
  Neon = 12,
}

impl CpuInfoFlag {
  /// Every flag, in bit order.
  pub const ALL: [Self; 13] = [
    Self::Sse,
    Self::Sse2,
    Self::Sse3,
    Self::Ssse3,
    Self::Sse41,
    Self::Sse42,
    Self::Avx,
    Self::Avx2,
    Self::Avx512f,
    Self::Avx512bw,
    Self::Vmx,
    Self::Vsx,
    Self::Neon,
  ];

  #[inline]
  #[must_use]
  pub const fn mask(self) -> u32 {
    1 << self as u32
  }
}

/// Library version, e.g. `"0.1.0"`.
#[inline]
#[must_use]
pub const fn version() -> &'static str {
  env!("CARGO_PKG_VERSION")
}

/// NUL-terminated [`version`] for the C ABI.
pub(crate) static VERSION_C: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Bitmask of [`CpuInfoFlag`]s this process may use.
///
/// Read from the cached [`platform::capabilities`] snapshot, override
/// included. The vector tiers (`Sse2`, `Avx2`, `Avx512bw`, `Neon`) report
/// enabled tiers; the other x86 flags report the detected features, already
/// gated on the OS saving their registers. A set built from tiers alone
/// carries no feature bits, so only its tiers show.
#[must_use]
pub fn cpu_info() -> u32 {
  let caps = platform::capabilities();
  let features = caps.features();
  let has = |feature: Caps| features.has(feature);
  let mut mask = 0;
  let mut set = |flag: CpuInfoFlag, on: bool| {
    if on {
      mask |= flag.mask();
    }
  };

  match caps.arch() {
    Arch::X86_64 => {
      let sse2 = caps.is_enabled(Tier::Sse2);
      // SSE is implied by SSE2.
      set(CpuInfoFlag::Sse, sse2 || has(x86::SSE2));
      set(CpuInfoFlag::Sse2, sse2);
      set(CpuInfoFlag::Sse3, has(x86::SSE3));
      set(CpuInfoFlag::Ssse3, has(x86::SSSE3));
      set(CpuInfoFlag::Sse41, has(x86::SSE41));
      set(CpuInfoFlag::Sse42, has(x86::SSE42));
      set(CpuInfoFlag::Avx, has(x86::AVX));
      set(CpuInfoFlag::Avx2, caps.is_enabled(Tier::Avx2));
      set(CpuInfoFlag::Avx512f, caps.is_enabled(Tier::Avx512bw));
      set(CpuInfoFlag::Avx512bw, caps.is_enabled(Tier::Avx512bw));
    }
    Arch::Aarch64 => set(CpuInfoFlag::Neon, caps.is_enabled(Tier::Neon)),
    Arch::Other => {}
    _ => {}
  }
  mask
}
