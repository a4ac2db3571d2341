//! x86 AES-NI kernel.
//!
//! One `aesenc` per round and the `aeskeygenassist` schedule. Only reachable
//! through the dispatcher after runtime CPUID validation, so the safe
//! wrappers below may assume the features are present.

#![allow(unsafe_code)]

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::kernels::constants::{
    AES_BLOCK_SIZE, INIT_SIZE_BLOCK, INIT_SIZE_BYTE, KEY_BUFFER_SIZE, MEMORY, ROUND_KEYS,
    STATE_SIZE,
};
use crate::kernels::{init_ab, state_index, widening_mul, RoundEngine};

pub static ENGINE: RoundEngine = RoundEngine {
    name: "aes-ni",
    expand_keys,
    explode,
    iterate,
    implode,
    aes_round,
};

// =============================================================================
// SAFE WRAPPERS
// =============================================================================

fn expand_keys(keys: &mut [u8; KEY_BUFFER_SIZE], state: &[u8; STATE_SIZE], offset: usize) {
    // SAFETY: the dispatcher selects this engine only after AES and SSE2 are
    // detected at runtime.
    unsafe { expand_keys_aesni(keys, state, offset) }
}

fn explode(scratchpad: &mut [u8], state: &[u8; STATE_SIZE], keys: &[u8; KEY_BUFFER_SIZE]) {
    // SAFETY: as above.
    unsafe { explode_aesni(scratchpad, state, keys) }
}

fn iterate(scratchpad: &mut [u8], state: &[u8; STATE_SIZE], turns: usize) {
    // SAFETY: as above.
    unsafe { iterate_aesni(scratchpad, state, turns) }
}

fn implode(state: &mut [u8; STATE_SIZE], scratchpad: &[u8], keys: &[u8; KEY_BUFFER_SIZE]) {
    // SAFETY: as above.
    unsafe { implode_aesni(state, scratchpad, keys) }
}

fn aes_round(block: &[u8; 16], key: &[u8; 16]) -> [u8; 16] {
    // SAFETY: as above.
    unsafe { aes_round_aesni(block, key) }
}

// =============================================================================
// KEY SCHEDULE
// =============================================================================

#[target_feature(enable = "sse2")]
unsafe fn assist1(mut t1: __m128i, t2: __m128i) -> __m128i {
    let t2 = _mm_shuffle_epi32::<0xff>(t2);
    let mut t4 = _mm_slli_si128::<0x04>(t1);
    t1 = _mm_xor_si128(t1, t4);
    t4 = _mm_slli_si128::<0x04>(t4);
    t1 = _mm_xor_si128(t1, t4);
    t4 = _mm_slli_si128::<0x04>(t4);
    t1 = _mm_xor_si128(t1, t4);
    _mm_xor_si128(t1, t2)
}

#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
unsafe fn assist2(t1: __m128i, mut t3: __m128i) -> __m128i {
    let t2 = _mm_shuffle_epi32::<0xaa>(_mm_aeskeygenassist_si128::<0x00>(t1));
    let mut t4 = _mm_slli_si128::<0x04>(t3);
    t3 = _mm_xor_si128(t3, t4);
    t4 = _mm_slli_si128::<0x04>(t4);
    t3 = _mm_xor_si128(t3, t4);
    t4 = _mm_slli_si128::<0x04>(t4);
    t3 = _mm_xor_si128(t3, t4);
    _mm_xor_si128(t3, t2)
}

#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
unsafe fn expand_keys_aesni(
    keys: &mut [u8; KEY_BUFFER_SIZE],
    state: &[u8; STATE_SIZE],
    offset: usize,
) {
    let mut t1 = _mm_loadu_si128(state.as_ptr().add(offset).cast());
    let mut t3 = _mm_loadu_si128(state.as_ptr().add(offset + 16).cast());

    let out = keys.as_mut_ptr().cast::<__m128i>();
    _mm_storeu_si128(out, t1);
    _mm_storeu_si128(out.add(1), t3);

    macro_rules! expand_pair {
        ($rcon:literal, $slot:expr) => {
            let t2 = _mm_aeskeygenassist_si128::<$rcon>(t3);
            t1 = assist1(t1, t2);
            _mm_storeu_si128(out.add($slot), t1);
            t3 = assist2(t1, t3);
            _mm_storeu_si128(out.add($slot + 1), t3);
        };
    }

    expand_pair!(0x01, 2);
    expand_pair!(0x02, 4);
    expand_pair!(0x04, 6);
    expand_pair!(0x08, 8);
}

// =============================================================================
// ROUNDS
// =============================================================================

#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
unsafe fn aes_round_aesni(block: &[u8; 16], key: &[u8; 16]) -> [u8; 16] {
    let b = _mm_loadu_si128(block.as_ptr().cast());
    let k = _mm_loadu_si128(key.as_ptr().cast());
    let mut out = [0u8; 16];
    _mm_storeu_si128(out.as_mut_ptr().cast(), _mm_aesenc_si128(b, k));
    out
}

#[target_feature(enable = "sse2")]
unsafe fn load_keys(keys: &[u8; KEY_BUFFER_SIZE]) -> [__m128i; ROUND_KEYS] {
    let mut rk = [_mm_setzero_si128(); ROUND_KEYS];
    for (i, key) in rk.iter_mut().enumerate() {
        *key = _mm_loadu_si128(keys.as_ptr().add(i * AES_BLOCK_SIZE).cast());
    }
    rk
}

#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
unsafe fn explode_aesni(
    scratchpad: &mut [u8],
    state: &[u8; STATE_SIZE],
    keys: &[u8; KEY_BUFFER_SIZE],
) {
    debug_assert_eq!(scratchpad.len(), MEMORY);
    let rk = load_keys(keys);

    let mut text = [_mm_setzero_si128(); INIT_SIZE_BLOCK];
    for (j, block) in text.iter_mut().enumerate() {
        *block = _mm_loadu_si128(state.as_ptr().add(64 + j * AES_BLOCK_SIZE).cast());
    }

    let mut dst = scratchpad.as_mut_ptr();
    for _ in 0..MEMORY / INIT_SIZE_BYTE {
        for block in &mut text {
            for key in &rk {
                *block = _mm_aesenc_si128(*block, *key);
            }
            _mm_storeu_si128(dst.cast(), *block);
            dst = dst.add(AES_BLOCK_SIZE);
        }
    }
}

#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
unsafe fn iterate_aesni(scratchpad: &mut [u8], state: &[u8; STATE_SIZE], turns: usize) {
    debug_assert_eq!(scratchpad.len(), MEMORY);
    let (a0, b0) = init_ab(state);
    let mut a = _mm_loadu_si128(a0.as_ptr().cast());
    let mut b = _mm_loadu_si128(b0.as_ptr().cast());
    let base = scratchpad.as_mut_ptr();

    for _ in 0..turns {
        let mut t0 = [0u64; 2];
        _mm_storeu_si128(t0.as_mut_ptr().cast(), a);
        let index0 = state_index(t0[0]);

        let mut c = _mm_loadu_si128(base.add(index0).cast());
        c = _mm_aesenc_si128(c, a);

        let mut t1 = [0u64; 2];
        _mm_storeu_si128(t1.as_mut_ptr().cast(), c);
        let index1 = state_index(t1[0]);
        _mm_prefetch::<_MM_HINT_T0>(base.add(index1).cast());

        b = _mm_xor_si128(b, c);
        _mm_storeu_si128(base.add(index0).cast(), b);

        let p = base.add(index1);
        let d = _mm_loadu_si128(p.cast());
        let mut lanes = [0u64; 2];
        _mm_storeu_si128(lanes.as_mut_ptr().cast(), d);

        let (hi, lo) = widening_mul(t1[0], lanes[0]);
        a = _mm_add_epi64(a, _mm_set_epi64x(lo as i64, hi as i64));
        _mm_storeu_si128(p.cast(), a);
        a = _mm_xor_si128(a, d);
        b = c;
    }
}

#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
unsafe fn implode_aesni(
    state: &mut [u8; STATE_SIZE],
    scratchpad: &[u8],
    keys: &[u8; KEY_BUFFER_SIZE],
) {
    debug_assert_eq!(scratchpad.len(), MEMORY);
    let rk = load_keys(keys);

    let mut src = scratchpad.as_ptr();
    for _ in 0..MEMORY / INIT_SIZE_BYTE {
        for j in 0..INIT_SIZE_BLOCK {
            let block = state.as_mut_ptr().add(64 + j * AES_BLOCK_SIZE);
            let mut d = _mm_loadu_si128(block.cast());
            d = _mm_xor_si128(d, _mm_loadu_si128(src.cast()));
            src = src.add(AES_BLOCK_SIZE);
            for key in &rk {
                d = _mm_aesenc_si128(d, *key);
            }
            _mm_storeu_si128(block.cast(), d);
        }
    }
}
