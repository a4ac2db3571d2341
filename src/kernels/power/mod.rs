//! POWER VSX kernel.
//!
//! `vcipher` performs the full AES round in one instruction. The scalar side
//! of the loop is shared with the portable shape; the little-endian lane
//! helpers perform the byte swaps a big-endian POWER host needs around the
//! index computation and the widening multiply.
//!
//! `vcipher` consumes the AES state with memory byte 0 in the high register
//! byte. A big-endian `lxvd2x` places it there directly; on little-endian
//! targets `lxvd2x` accesses each doubleword in memory significance order,
//! leaving the register doubleword-reversed, so the round is wrapped in the
//! reversing permute the AltiVec swab mask encodes.

#![allow(unsafe_code)]

use core::arch::asm;

use crate::kernels::aes;
use crate::kernels::constants::{
    AES_BLOCK_SIZE, INIT_SIZE_BYTE, KEY_BUFFER_SIZE, MEMORY, STATE_SIZE,
};
use crate::kernels::{init_ab, load64, round_keys, state_index, store64, widening_mul, RoundEngine};

pub static ENGINE: RoundEngine = RoundEngine {
    name: "power-vsx",
    // The schedule is not hot; the portable expansion is bit-identical.
    expand_keys: aes::expand_keys,
    explode,
    iterate,
    implode,
    aes_round,
};

/// One `vcipher` round, in place.
#[cfg(target_endian = "big")]
#[inline]
fn vcipher(block: &mut [u8; 16], key: &[u8; 16]) {
    // SAFETY: reads 16 bytes from each pointer, writes 16 back to `block`;
    // both are valid for that range. vcipher is present on every POWER8+
    // part this engine is built for.
    unsafe {
        asm!(
            "lxvd2x 32, 0, {blk}",
            "lxvd2x 33, 0, {key}",
            "vcipher 0, 0, 1",
            "stxvd2x 32, 0, {blk}",
            blk = in(reg) block.as_mut_ptr(),
            key = in(reg) key.as_ptr(),
            out("v0") _,
            out("v1") _,
            options(nostack),
        );
    }
}

/// One `vcipher` round, in place.
///
/// Little-endian `lxvd2x` byte-reverses each doubleword relative to the
/// register order `vcipher` consumes, and `stxvd2x` reverses again on the
/// way out. Both operands are straightened with a per-doubleword reversing
/// permute (v2), built as the 0..15 ramp from `lvsl` XOR 7 so no mask
/// constant has to round-trip through memory.
#[cfg(target_endian = "little")]
#[inline]
fn vcipher(block: &mut [u8; 16], key: &[u8; 16]) {
    // SAFETY: reads 16 bytes from each pointer, writes 16 back to `block`;
    // both are valid for that range. vcipher is present on every POWER8+
    // part this engine is built for.
    unsafe {
        asm!(
            "lxvd2x 32, 0, {blk}",
            "lxvd2x 33, 0, {key}",
            "lvsl 2, 0, {zero}",
            "vspltisb 3, 7",
            "vxor 2, 2, 3",
            "vperm 0, 0, 0, 2",
            "vperm 1, 1, 1, 2",
            "vcipher 0, 0, 1",
            "vperm 0, 0, 0, 2",
            "stxvd2x 32, 0, {blk}",
            blk = in(reg) block.as_mut_ptr(),
            key = in(reg) key.as_ptr(),
            zero = in(reg) 0u64,
            out("v0") _,
            out("v1") _,
            out("v2") _,
            out("v3") _,
            options(nostack),
        );
    }
}

fn aes_round(block: &[u8; 16], key: &[u8; 16]) -> [u8; 16] {
    let mut out = *block;
    vcipher(&mut out, key);
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
                vcipher(&mut b, key);
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
        vcipher(&mut c, &a);
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
                vcipher(&mut b, key);
            }
            state[offset..offset + 16].copy_from_slice(&b);
        }
    }
}
