//! Round-engine kernels.
//!
//! Each backend (portable tables, AES-NI, POWER VSX, SPARC T4) implements the
//! same capability set so the dispatcher can swap them at construction time.
//! Lane arithmetic is defined over little-endian 64-bit values on every host;
//! the helpers here are the single place that byte order is decided.

pub mod aes;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod aesni;
pub mod constants;
pub mod keccak;
pub mod portable;
#[cfg(target_arch = "powerpc64")]
pub mod power;
#[cfg(target_arch = "sparc64")]
pub mod sparc;

use constants::{AES_BLOCK_SIZE, KEY_BUFFER_SIZE, ROUND_KEYS, STATE_SIZE, TOTAL_BLOCKS};

// =============================================================================
// ENGINE INTERFACE
// =============================================================================

/// The capability set a backend provides.
///
/// One engine is bound per hashing context; there is no per-call dispatch.
/// Every field must be bit-identical to the portable realization.
pub struct RoundEngine {
    /// Backend name, for diagnostics.
    pub name: &'static str,
    /// Expand `state[offset..offset + 32]` into ten 128-bit round keys.
    pub expand_keys: fn(keys: &mut [u8; KEY_BUFFER_SIZE], state: &[u8; STATE_SIZE], offset: usize),
    /// Fill the scratchpad from the state text block (state bytes 64..192).
    pub explode: fn(scratchpad: &mut [u8], state: &[u8; STATE_SIZE], keys: &[u8; KEY_BUFFER_SIZE]),
    /// Run `turns` memory-dependent mutations of the scratchpad.
    pub iterate: fn(scratchpad: &mut [u8], state: &[u8; STATE_SIZE], turns: usize),
    /// Reabsorb the scratchpad into the state text block.
    pub implode: fn(state: &mut [u8; STATE_SIZE], scratchpad: &[u8], keys: &[u8; KEY_BUFFER_SIZE]),
    /// One AES encryption round (`aesenc` semantics), exposed for verification.
    pub aes_round: fn(block: &[u8; 16], key: &[u8; 16]) -> [u8; 16],
}

// =============================================================================
// LANE HELPERS
// =============================================================================

/// Load 64-bit lane `lane` of `bytes` with little-endian semantics.
#[inline]
#[must_use]
pub fn load64(bytes: &[u8], lane: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&bytes[lane * 8..lane * 8 + 8]);
    u64::from_le_bytes(b)
}

/// Store `value` into 64-bit lane `lane` of `bytes` with little-endian semantics.
#[inline]
pub fn store64(bytes: &mut [u8], lane: usize, value: u64) {
    bytes[lane * 8..lane * 8 + 8].copy_from_slice(&value.to_le_bytes());
}

/// Map a 64-bit lane value onto a 16-byte-aligned scratchpad offset.
#[inline]
#[must_use]
pub fn state_index(lane: u64) -> usize {
    (((lane >> 4) as usize) & (TOTAL_BLOCKS - 1)) << 4
}

/// 64 x 64 -> 128 bit widening multiply, split into (high, low) words.
#[inline]
#[must_use]
pub fn widening_mul(a: u64, b: u64) -> (u64, u64) {
    let product = u128::from(a) * u128::from(b);
    let (hi, lo) = ((product >> 64) as u64, product as u64);
    // From (a·2^32 + b)(c·2^32 + d): the a·c term can never exceed the high word.
    debug_assert!((a >> 32).wrapping_mul(b >> 32) <= hi);
    (hi, lo)
}

/// Derive the iteration-loop start values from the Keccak state:
/// `A = state[0..16] ^ state[32..48]`, `B = state[16..32] ^ state[48..64]`.
#[inline]
#[must_use]
pub fn init_ab(state: &[u8; STATE_SIZE]) -> ([u8; 16], [u8; 16]) {
    let mut a = [0u8; 16];
    let mut b = [0u8; 16];
    for i in 0..16 {
        a[i] = state[i] ^ state[i + 32];
        b[i] = state[i + 16] ^ state[i + 48];
    }
    (a, b)
}

/// Split the key buffer into ten 16-byte round keys.
#[inline]
pub(crate) fn round_keys(keys: &[u8; KEY_BUFFER_SIZE]) -> [[u8; 16]; ROUND_KEYS] {
    let mut out = [[0u8; 16]; ROUND_KEYS];
    for (dst, src) in out.iter_mut().zip(keys.chunks_exact(AES_BLOCK_SIZE)) {
        dst.copy_from_slice(src);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::MEMORY;
    use rand::{Rng, RngCore};

    /// The reference decomposition the inline-asm implementations were
    /// originally written against: (a·2^32 + b)(c·2^32 + d).
    fn widening_mul_reference(multiplier: u64, multiplicand: u64) -> (u64, u64) {
        let a = multiplier >> 32;
        let b = multiplier & 0xffff_ffff;
        let c = multiplicand >> 32;
        let d = multiplicand & 0xffff_ffff;

        let ac = a * c;
        let ad = a * d;
        let bc = b * c;
        let bd = b * d;

        let adbc = ad.wrapping_add(bc);
        let adbc_carry = u64::from(adbc < ad);

        let lo = bd.wrapping_add(adbc << 32);
        let lo_carry = u64::from(lo < bd);
        let hi = ac
            .wrapping_add(adbc >> 32)
            .wrapping_add(adbc_carry << 32)
            .wrapping_add(lo_carry);
        (hi, lo)
    }

    #[test]
    fn widening_mul_small_values() {
        assert_eq!(widening_mul(10, 20), (0, 200));
        assert_eq!(widening_mul(10 << 32, 20 << 32), (200, 0));
    }

    #[test]
    fn widening_mul_boundary_grid() {
        let edges = [0u64, 1, (1 << 32) - 1, 1 << 32, u64::MAX];
        for &a in &edges {
            for &b in &edges {
                assert_eq!(widening_mul(a, b), widening_mul_reference(a, b), "{a} * {b}");
            }
        }
    }

    #[test]
    fn widening_mul_matches_reference() {
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let a = rng.next_u64();
            let b = rng.next_u64();
            assert_eq!(widening_mul(a, b), widening_mul_reference(a, b), "{a} * {b}");
        }
    }

    #[test]
    fn state_index_known_value() {
        // Read address of the first iteration turn for "This is a test".
        assert_eq!(state_index(0x1f3f_a438_12b8_64f4), 1_598_704);
    }

    #[test]
    fn state_index_domain() {
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let idx = state_index(rng.gen());
            assert!(idx < MEMORY);
            assert_eq!(idx % 16, 0);
        }
        assert_eq!(state_index(0), 0);
        assert_eq!(state_index(u64::MAX), MEMORY - 16);
    }

    #[test]
    fn lane_helpers_round_trip() {
        let mut bytes = [0u8; 16];
        store64(&mut bytes, 0, 0x0807_0605_0403_0201);
        store64(&mut bytes, 1, 0x1615_1413_1211_1009);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(bytes[7], 0x08);
        assert_eq!(load64(&bytes, 0), 0x0807_0605_0403_0201);
        assert_eq!(load64(&bytes, 1), 0x1615_1413_1211_1009);
    }

    #[test]
    fn init_ab_xors_state_quarters() {
        let mut state = [0u8; STATE_SIZE];
        for (i, byte) in state.iter_mut().enumerate().take(64) {
            *byte = i as u8;
        }
        let (a, b) = init_ab(&state);
        for i in 0..16 {
            assert_eq!(a[i], (i as u8) ^ (i as u8 + 32));
            assert_eq!(b[i], (i as u8 + 16) ^ (i as u8 + 48));
        }
    }
}
