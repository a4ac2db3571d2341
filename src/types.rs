//! Shared types used across the cryptonight library.

use core::fmt;
use std::error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error returned when the 2 MiB scratchpad cannot be allocated.
///
/// Construction is the only fallible step; once a [`crate::Hasher`] exists,
/// hashing itself cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfMemory;

impl fmt::Display for OutOfMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to allocate the 2 MiB cryptonight scratchpad")
    }
}

impl error::Error for OutOfMemory {}

// =============================================================================
// TAIL HASH SELECTION
// =============================================================================

/// The hash applied to the 200-byte state after the final Keccak permutation,
/// selected by the low two bits of the first state byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TailHash {
    /// BLAKE-256
    Blake = 0,
    /// Groestl-256
    Groestl = 1,
    /// JH-256
    Jh = 2,
    /// Skein-256 (Skein-512 compressed to a 32-byte digest)
    Skein = 3,
}

impl TailHash {
    /// Read the selector bits out of a finalized state.
    #[must_use]
    pub fn from_state(state: &[u8; 200]) -> Self {
        match state[0] & 3 {
            0 => Self::Blake,
            1 => Self::Groestl,
            2 => Self::Jh,
            _ => Self::Skein,
        }
    }
}

// =============================================================================
// ALIGNMENT
// =============================================================================

/// Helper to enforce 16-byte alignment, required by the vector loads in the
/// hardware engines.
#[repr(align(16))]
pub(crate) struct Align16<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_hash_uses_low_two_bits_only() {
        let mut state = [0u8; 200];
        for byte in 0..=255u8 {
            state[0] = byte;
            let expected = match byte & 3 {
                0 => TailHash::Blake,
                1 => TailHash::Groestl,
                2 => TailHash::Jh,
                _ => TailHash::Skein,
            };
            assert_eq!(TailHash::from_state(&state), expected);
        }
    }
}
