//! One-shot convenience API.
//!
//! Each call allocates a fresh 2 MiB context; miners and anything else on a
//! hot path should hold a [`Hasher`] instead.

use subtle::ConstantTimeEq;

use crate::context::Hasher;
use crate::types::OutOfMemory;

/// Compute the CryptoNight digest of `input`.
///
/// # Errors
/// Returns [`OutOfMemory`] when the scratchpad cannot be allocated.
///
/// # Example
/// ```rust
/// let digest = cryptonight::hash(b"This is a test")?;
/// assert_eq!(digest.len(), 32);
/// # Ok::<(), cryptonight::OutOfMemory>(())
/// ```
pub fn hash(input: &[u8]) -> Result<[u8; 32], OutOfMemory> {
    let mut hasher = Hasher::new()?;
    Ok(hasher.hash(input))
}

/// Verify a digest in constant time.
///
/// # Errors
/// Returns [`OutOfMemory`] when the scratchpad cannot be allocated.
pub fn verify(input: &[u8], expected: &[u8; 32]) -> Result<bool, OutOfMemory> {
    let digest = hash(input)?;
    Ok(digest.ct_eq(expected).into())
}
