//! Keccak-1600 with the pre-SHA3 CryptoNight parameters.
//!
//! The sponge absorbs at rate 136 (capacity 512) and pads with 0x01 followed
//! by 0x80 at the final rate-block boundary — NOT the SHA-3 0x06 domain byte.
//! Lanes are absorbed and emitted little-endian on every host.

use super::constants::STATE_SIZE;

/// Standard round count of the Keccak-f[1600] permutation.
pub const KECCAK_ROUNDS: usize = 24;

/// Sponge rate in bytes.
const RATE: usize = 136;

const RC: [u64; KECCAK_ROUNDS] = [
    0x0000_0000_0000_0001,
    0x0000_0000_0000_8082,
    0x8000_0000_0000_808a,
    0x8000_0000_8000_8000,
    0x0000_0000_0000_808b,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8009,
    0x0000_0000_0000_008a,
    0x0000_0000_0000_0088,
    0x0000_0000_8000_8009,
    0x0000_0000_8000_000a,
    0x0000_0000_8000_808b,
    0x8000_0000_0000_008b,
    0x8000_0000_0000_8089,
    0x8000_0000_0000_8003,
    0x8000_0000_0000_8002,
    0x8000_0000_0000_0080,
    0x0000_0000_0000_800a,
    0x8000_0000_8000_000a,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8080,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8008,
];

// Rotation offsets and lane permutation for the combined ρ + π step.
const ROTC: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];
const PILN: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

// =============================================================================
// PERMUTATION
// =============================================================================

/// Apply `rounds` rounds (at most [`KECCAK_ROUNDS`]) of Keccak-f[1600].
pub fn keccak_f(st: &mut [u64; 25], rounds: usize) {
    debug_assert!(rounds <= KECCAK_ROUNDS);

    for rc in &RC[..rounds] {
        // θ
        let mut bc = [0u64; 5];
        for (i, lane) in bc.iter_mut().enumerate() {
            *lane = st[i] ^ st[i + 5] ^ st[i + 10] ^ st[i + 15] ^ st[i + 20];
        }
        for i in 0..5 {
            let t = bc[(i + 4) % 5] ^ bc[(i + 1) % 5].rotate_left(1);
            for row in 0..5 {
                st[row * 5 + i] ^= t;
            }
        }

        // ρ + π
        let mut t = st[1];
        for i in 0..24 {
            let j = PILN[i];
            let lane = st[j];
            st[j] = t.rotate_left(ROTC[i]);
            t = lane;
        }

        // χ
        for row in 0..5 {
            let base = row * 5;
            let lanes = [st[base], st[base + 1], st[base + 2], st[base + 3], st[base + 4]];
            for i in 0..5 {
                st[base + i] = lanes[i] ^ (!lanes[(i + 1) % 5] & lanes[(i + 2) % 5]);
            }
        }

        // ι
        st[0] ^= rc;
    }
}

// =============================================================================
// SPONGE
// =============================================================================

#[inline]
fn absorb_block(st: &mut [u64; 25], block: &[u8]) {
    for (lane, chunk) in st.iter_mut().zip(block.chunks_exact(8)) {
        let mut b = [0u8; 8];
        b.copy_from_slice(chunk);
        *lane ^= u64::from_le_bytes(b);
    }
}

/// Absorb `input` and write the full 200-byte sponge state to `out`.
pub fn keccak1600(input: &[u8], out: &mut [u8; STATE_SIZE]) {
    let mut st = [0u64; 25];

    let mut blocks = input.chunks_exact(RATE);
    for block in blocks.by_ref() {
        absorb_block(&mut st, block);
        keccak_f(&mut st, KECCAK_ROUNDS);
    }

    let remainder = blocks.remainder();
    let mut last = [0u8; RATE];
    last[..remainder.len()].copy_from_slice(remainder);
    last[remainder.len()] = 0x01;
    last[RATE - 1] |= 0x80;
    absorb_block(&mut st, &last);
    keccak_f(&mut st, KECCAK_ROUNDS);

    for (chunk, lane) in out.chunks_exact_mut(8).zip(st.iter()) {
        chunk.copy_from_slice(&lane.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use rand::RngCore;

    #[test]
    fn single_and_double_round() {
        let mut st = [0u64; 25];
        st[0] = 0x0102_0304_0506_0708;
        keccak_f(&mut st, 1);
        assert_eq!(st[0], 0x0102_0304_0506_0709);

        let mut st = [0u64; 25];
        st[0] = 0x0102_0304_0506_0708;
        keccak_f(&mut st, 2);
        assert_eq!(st[0], 0x4c43_4cfa_c9a5_b256);
    }

    #[test]
    fn zero_state_kat() {
        // FIPS-202 known answer: first lanes after permuting the all-zero state.
        let mut st = [0u64; 25];
        keccak_f(&mut st, KECCAK_ROUNDS);
        assert_eq!(st[0], 0xf125_8f79_40e1_dde7);
        assert_eq!(st[1], 0x84d5_ccf9_33c0_478a);
        assert_eq!(st[2], 0xd598_261e_a65a_a9ee);
        assert_eq!(st[3], 0xbd15_4730_6f80_494d);
        assert_eq!(st[4], 0x8b28_4e05_6253_d057);
    }

    #[test]
    fn permutation_matches_reference() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let mut st = [0u64; 25];
            for lane in &mut st {
                *lane = rng.next_u64();
            }
            let mut reference = st;
            keccak_f(&mut st, KECCAK_ROUNDS);
            keccak::f1600(&mut reference);
            assert_eq!(st, reference);
        }
    }

    #[test]
    fn absorb_known_state() {
        let mut state = [0u8; STATE_SIZE];
        keccak1600(b"This is a test", &mut state);
        assert_eq!(state[..16], hex!("93b90fab55adf4e98787d33a38e71106"));
        assert_eq!(state[64..80], hex!("405e91deec2a0478578825373af7ea64"));
    }

    #[test]
    fn absorb_matches_reference_padding() {
        // Empty input absorbs the padding block alone.
        let mut state = [0u8; STATE_SIZE];
        keccak1600(&[], &mut state);

        let mut reference = [0u64; 25];
        reference[0] ^= 0x01;
        reference[16] ^= 0x80u64 << 56;
        keccak::f1600(&mut reference);
        for (chunk, lane) in state.chunks_exact(8).zip(reference.iter()) {
            assert_eq!(chunk, lane.to_le_bytes());
        }
    }

    #[test]
    fn rate_boundary_inputs() {
        // A full-rate input absorbs an extra padding-only block; nearby
        // lengths must all produce distinct states.
        let input = [0x5au8; RATE + 1];
        let mut at_rate = [0u8; STATE_SIZE];
        let mut below = [0u8; STATE_SIZE];
        let mut above = [0u8; STATE_SIZE];
        keccak1600(&input[..RATE], &mut at_rate);
        keccak1600(&input[..RATE - 1], &mut below);
        keccak1600(&input[..RATE + 1], &mut above);
        assert_ne!(at_rate, below);
        assert_ne!(at_rate, above);

        let mut again = [0u8; STATE_SIZE];
        keccak1600(&input[..RATE], &mut again);
        assert_eq!(at_rate, again);
    }
}
