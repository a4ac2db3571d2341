#![cfg_attr(
    any(target_arch = "powerpc64", target_arch = "sparc64"),
    feature(asm_experimental_arch)
)]

//! # cryptonight
//!
//! The CryptoNight memory-hard proof-of-work hash. Every hash walks a 2 MiB
//! scratchpad through ~2^19 memory-dependent AES rounds, which is what makes
//! the function expensive to accelerate with fixed-function hardware.
//!
//! The AES round at the heart of the loop is provided by interchangeable
//! round engines (portable tables, x86 AES-NI, POWER `vcipher`, SPARC T4
//! `aes_eround*`); all of them produce bit-identical digests.
//!
//! # Usage
//! ```rust
//! use cryptonight::Hasher;
//!
//! // Reusable context: one 2 MiB allocation, many hashes.
//! let mut hasher = Hasher::new()?;
//! let digest = hasher.hash(b"This is a test");
//! assert_eq!(digest[0], 0xa0);
//!
//! // One-shot convenience (allocates a fresh context).
//! assert_eq!(cryptonight::hash(b"This is a test")?, digest);
//! # Ok::<(), cryptonight::OutOfMemory>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

mod context;
mod engine;
// Re-export internal kernels for benchmarking/testing if needed, but hide from docs
#[doc(hidden)]
pub mod kernels; // Public for test/example use only
mod oneshot;
mod scratchpad;
mod tail;
mod types;

// =============================================================================
// EXPORTS
// =============================================================================

pub use context::Hasher;
pub use oneshot::{hash, verify};
pub use types::{OutOfMemory, TailHash};

/// Returns the name of the round-engine backend currently in use.
#[must_use]
pub fn active_backend() -> &'static str {
    engine::dispatcher::best_engine().name
}
