//! Portable scalar kernel.
//!
//! Self-contained realization of explode / iterate / implode over the table
//! AES round, producing byte-identical results to the hardware engines. This
//! is the reference the other backends are tested against.

use crate::kernels::aes;
use crate::kernels::constants::{
    AES_BLOCK_SIZE, INIT_SIZE_BYTE, KEY_BUFFER_SIZE, MEMORY, STATE_SIZE,
};
use crate::kernels::{init_ab, load64, round_keys, state_index, store64, widening_mul, RoundEngine};

pub static ENGINE: RoundEngine = RoundEngine {
    name: "portable",
    expand_keys: aes::expand_keys,
    explode,
    iterate,
    implode,
    aes_round: aes::aes_round,
};

// =============================================================================
// EXPLODE
// =============================================================================

/// Fill the scratchpad: the eight text blocks from state bytes 64..192 are
/// run through ten AES rounds and written out, carrying the encrypted result
/// into the next row.
pub fn explode(scratchpad: &mut [u8], state: &[u8; STATE_SIZE], keys: &[u8; KEY_BUFFER_SIZE]) {
    debug_assert_eq!(scratchpad.len(), MEMORY);
    let rk = round_keys(keys);

    let mut text = [0u8; INIT_SIZE_BYTE];
    text.copy_from_slice(&state[64..64 + INIT_SIZE_BYTE]);

    for row in scratchpad.chunks_exact_mut(INIT_SIZE_BYTE) {
        for block in text.chunks_exact_mut(AES_BLOCK_SIZE) {
            let mut b = [0u8; 16];
            b.copy_from_slice(block);
            for key in &rk {
                b = aes::aes_round(&b, key);
            }
            block.copy_from_slice(&b);
        }
        row.copy_from_slice(&text);
    }
}

// =============================================================================
// ITERATE
// =============================================================================

/// The memory-hard loop. Each turn reads a block addressed by A, enciphers it
/// with A, stores it XOR B, then folds a widening multiply against a second
/// data-dependent block back into A.
pub fn iterate(scratchpad: &mut [u8], state: &[u8; STATE_SIZE], turns: usize) {
    debug_assert_eq!(scratchpad.len(), MEMORY);
    let (mut a, mut b) = init_ab(state);

    for _ in 0..turns {
        let idx0 = state_index(load64(&a, 0));
        let mut block = [0u8; 16];
        block.copy_from_slice(&scratchpad[idx0..idx0 + 16]);
        let c = aes::aes_round(&block, &a);
        for (dst, (&c_byte, &b_byte)) in
            scratchpad[idx0..idx0 + 16].iter_mut().zip(c.iter().zip(b.iter()))
        {
            *dst = c_byte ^ b_byte;
        }

        let idx1 = state_index(load64(&c, 0));
        let d0 = load64(&scratchpad[idx1..idx1 + 16], 0);
        let d1 = load64(&scratchpad[idx1..idx1 + 16], 1);

        let (hi, lo) = widening_mul(load64(&c, 0), d0);
        let hi = hi.wrapping_add(load64(&a, 0));
        let lo = lo.wrapping_add(load64(&a, 1));

        store64(&mut scratchpad[idx1..idx1 + 16], 0, hi);
        store64(&mut scratchpad[idx1..idx1 + 16], 1, lo);
        store64(&mut a, 0, d0 ^ hi);
        store64(&mut a, 1, d1 ^ lo);
        b = c;
    }
}

// =============================================================================
// IMPLODE
// =============================================================================

/// Reabsorb the scratchpad: each row is XORed into the state text block,
/// which is then run through ten AES rounds with the second key set.
pub fn implode(state: &mut [u8; STATE_SIZE], scratchpad: &[u8], keys: &[u8; KEY_BUFFER_SIZE]) {
    debug_assert_eq!(scratchpad.len(), MEMORY);
    let rk = round_keys(keys);

    for row in scratchpad.chunks_exact(INIT_SIZE_BYTE) {
        for (j, src) in row.chunks_exact(AES_BLOCK_SIZE).enumerate() {
            let offset = 64 + j * AES_BLOCK_SIZE;
            let mut b = [0u8; 16];
            for (dst, (&state_byte, &pad_byte)) in b
                .iter_mut()
                .zip(state[offset..offset + 16].iter().zip(src.iter()))
            {
                *dst = state_byte ^ pad_byte;
            }
            for key in &rk {
                b = aes::aes_round(&b, key);
            }
            state[offset..offset + 16].copy_from_slice(&b);
        }
    }
}
