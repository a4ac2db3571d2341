//! SPARC T4 kernel.
//!
//! The T4 crypto unit exposes the AES round as an `aes_eround01` /
//! `aes_eround23` pair over float-register halves. Blocks and keys travel
//! through memory so the byte order the engine consumes matches what the
//! scalar side sees; the little-endian lane helpers handle the swabs around
//! the index computation and the widening multiply.

#![allow(unsafe_code)]

use core::arch::asm;

use crate::kernels::aes;
use crate::kernels::constants::{
    AES_BLOCK_SIZE, INIT_SIZE_BYTE, KEY_BUFFER_SIZE, MEMORY, STATE_SIZE,
};
use crate::kernels::{init_ab, load64, round_keys, state_index, store64, widening_mul, RoundEngine};

pub static ENGINE: RoundEngine = RoundEngine {
    name: "sparc-t4",
    expand_keys: aes::expand_keys,
    explode,
    iterate,
    implode,
    aes_round,
};

/// One AES round, in place. Both eround halves read the whole input state,
/// so the results land in separate registers before the write-back.
#[inline]
fn eround(block: &mut [u8; 16], key: &[u8; 16]) {
    // SAFETY: reads 16 bytes from each pointer, writes 16 back to `block`;
    // both are valid for that range. The eround instructions are present on
    // every T4+ part this engine is built for.
    unsafe {
        asm!(
            "ldd [{key}], %f0",
            "ldd [{key} + 8], %f2",
            "ldd [{blk}], %f4",
            "ldd [{blk} + 8], %f6",
            "aes_eround01 %f0, %f4, %f6, %f8",
            "aes_eround23 %f2, %f4, %f6, %f10",
            "std %f8, [{blk}]",
            "std %f10, [{blk} + 8]",
            blk = in(reg) block.as_mut_ptr(),
            key = in(reg) key.as_ptr(),
            out("f0") _,
            out("f2") _,
            out("f4") _,
            out("f6") _,
            out("f8") _,
            out("f10") _,
            options(nostack),
        );
    }
}

fn aes_round(block: &[u8; 16], key: &[u8; 16]) -> [u8; 16] {
    let mut out = *block;
    eround(&mut out, key);
    out
}

fn explode(scratchpad: &mut [u8], state: &[u8; STATE_SIZE], keys: &[u8; KEY_BUFFER_SIZE]) {
    debug_assert_eq!(scratchpad.len(), MEMORY);
    let rk = round_keys(keys);

    let mut text = [0u8; INIT_SIZE_BYTE];
    text.copy_from_slice(&state[64..64 + INIT_SIZE_BYTE]);

    for row in scratchpad.chunks_exact_mut(INIT_SIZE_BYTE) {
        for block in text.chunks_exact_mut(AES_BLOCK_SIZE) {
            let mut b = [0u8; 16];
            b.copy_from_slice(block);
            for key in &rk {
                eround(&mut b, key);
            }
            block.copy_from_slice(&b);
        }
        row.copy_from_slice(&text);
    }
}

fn iterate(scratchpad: &mut [u8], state: &[u8; STATE_SIZE], turns: usize) {
    debug_assert_eq!(scratchpad.len(), MEMORY);
    let (mut a, mut b) = init_ab(state);

    for _ in 0..turns {
        let index0 = state_index(load64(&a, 0));
        let mut c = [0u8; 16];
        c.copy_from_slice(&scratchpad[index0..index0 + 16]);
        eround(&mut c, &a);
        for (dst, (&c_byte, &b_byte)) in scratchpad[index0..index0 + 16]
            .iter_mut()
            .zip(c.iter().zip(b.iter()))
        {
            *dst = c_byte ^ b_byte;
        }

        let index1 = state_index(load64(&c, 0));
        let d0 = load64(&scratchpad[index1..index1 + 16], 0);
        let d1 = load64(&scratchpad[index1..index1 + 16], 1);

        let (hi, lo) = widening_mul(load64(&c, 0), d0);
        let hi = hi.wrapping_add(load64(&a, 0));
        let lo = lo.wrapping_add(load64(&a, 1));

        store64(&mut scratchpad[index1..index1 + 16], 0, hi);
        store64(&mut scratchpad[index1..index1 + 16], 1, lo);
        store64(&mut a, 0, d0 ^ hi);
        store64(&mut a, 1, d1 ^ lo);
        b = c;
    }
}

fn implode(state: &mut [u8; STATE_SIZE], scratchpad: &[u8], keys: &[u8; KEY_BUFFER_SIZE]) {
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
                eround(&mut b, key);
            }
            state[offset..offset + 16].copy_from_slice(&b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use rand::RngCore;

    #[test]
    fn eround_matches_table_round() {
        let block = hex!("000102030405060708090a0b0c0d0e0f");
        assert_eq!(aes_round(&block, &[0u8; 16]), aes::aes_round(&block, &[0u8; 16]));
        assert_eq!(aes_round(&[0u8; 16], &[0u8; 16]), [0x63u8; 16]);

        let mut rng = rand::thread_rng();
        for _ in 0..256 {
            let mut block = [0u8; 16];
            let mut key = [0u8; 16];
            rng.fill_bytes(&mut block);
            rng.fill_bytes(&mut key);
            assert_eq!(aes_round(&block, &key), aes::aes_round(&block, &key));
        }
    }
}
