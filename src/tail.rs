//! Tail-hash dispatch.
//!
//! After the final Keccak permutation, the low two bits of the first state
//! byte pick one of four digests over the whole 200-byte state. "Skein-256"
//! here is Skein-512 with a 32-byte output, as CryptoNight defines it.

// BLAKE and JH share the pre-0.9 `digest` generation, so one trait import
// through a re-export covers both; Skein tracks `digest` 0.9 and Groestl
// tracks the top-level `digest` 0.10, so each brings its own import in its
// branch.
use blake_hash::digest::Digest as _;
use skein_hash::digest::generic_array::typenum::U32;

use crate::kernels::constants::STATE_SIZE;
use crate::types::TailHash;

pub(crate) fn tail_digest(state: &[u8; STATE_SIZE]) -> [u8; 32] {
    match TailHash::from_state(state) {
        TailHash::Blake => copy32(&blake_hash::Blake256::digest(state)),
        TailHash::Groestl => {
            use digest::Digest as _;
            copy32(&groestl::Groestl256::digest(state))
        }
        TailHash::Jh => copy32(&jh_x86_64::Jh256::digest(state)),
        TailHash::Skein => {
            use skein_hash::digest::Digest as _;
            copy32(&skein_hash::Skein512::<U32>::digest(state))
        }
    }
}

#[inline]
fn copy32(digest: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(digest);
    out
}
