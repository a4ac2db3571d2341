//! Round-engine dispatcher.
//!
//! Selects the fastest available AES realization for this host. Detection is
//! a CPUID-style query where the platform provides one (x86), and
//! compile-time arch gating elsewhere; the decision is made once, before
//! worker threads start, and cached for the life of the process.

use std::sync::OnceLock;

use crate::kernels::{self, RoundEngine};

static ENGINE: OnceLock<&'static RoundEngine> = OnceLock::new();

/// Returns the engine every new context binds.
pub fn best_engine() -> &'static RoundEngine {
    ENGINE.get_or_init(detect)
}

fn detect() -> &'static RoundEngine {
    // 1. Runtime query (x86 exposes feature detection through std)
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    if is_x86_feature_detected!("aes") && is_x86_feature_detected!("sse2") {
        return &kernels::aesni::ENGINE;
    }

    // 2. Compile-time dispatch: the POWER and SPARC engines assume the
    //    crypto unit is present when built for the architecture.
    #[cfg(target_arch = "powerpc64")]
    return &kernels::power::ENGINE;

    #[cfg(target_arch = "sparc64")]
    return &kernels::sparc::ENGINE;

    // 3. Portable fallback
    #[cfg(not(any(target_arch = "powerpc64", target_arch = "sparc64")))]
    &kernels::portable::ENGINE
}
