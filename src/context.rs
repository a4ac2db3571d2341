//! The hashing context.
//!
//! One `Hasher` per worker thread: it owns the Keccak state, the round-key
//! buffer and the 2 MiB scratchpad, and binds a round engine once at
//! construction. Every `hash` call overwrites state and scratchpad entirely,
//! so a context is reused across many hashes and released at shutdown.
//!
//! The individual pipeline stages are public so white-box tests can drive
//! them one at a time and inspect the buffers in between.

use std::time::{Duration, Instant};

use crate::engine::dispatcher;
use crate::kernels::constants::{
    AES_BLOCK_SIZE, AES_KEY_SIZE, ITER, KEY_BUFFER_SIZE, ROUND_KEYS, STATE_SIZE,
};
use crate::kernels::{keccak, RoundEngine};
use crate::scratchpad::Scratchpad;
use crate::tail;
use crate::types::{Align16, OutOfMemory, TailHash};

/// Instrumented intervals: the eight pipeline stages plus the whole hash.
const STAGES: usize = 9;

/// A reusable CryptoNight hashing context (~2 MiB).
pub struct Hasher {
    state: Align16<[u8; STATE_SIZE]>,
    keys: Align16<[u8; KEY_BUFFER_SIZE]>,
    scratchpad: Scratchpad,
    engine: &'static RoundEngine,
    stage_times: [Duration; STAGES],
}

impl Hasher {
    /// Allocate a context backed by the fastest engine on this host.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] when the scratchpad cannot be allocated;
    /// callers should treat this as fatal to the worker.
    pub fn new() -> Result<Self, OutOfMemory> {
        Self::with_engine(dispatcher::best_engine())
    }

    /// Allocate a context bound to a specific engine. Exposed for the
    /// engine-agreement tests; `new` is the normal entry point.
    #[doc(hidden)]
    pub fn with_engine(engine: &'static RoundEngine) -> Result<Self, OutOfMemory> {
        Ok(Self {
            state: Align16([0u8; STATE_SIZE]),
            keys: Align16([0u8; KEY_BUFFER_SIZE]),
            scratchpad: Scratchpad::new()?,
            engine,
            stage_times: [Duration::ZERO; STAGES],
        })
    }

    // =========================================================================
    // FULL PIPELINE
    // =========================================================================

    /// Compute the CryptoNight digest of `input`.
    #[must_use]
    pub fn hash(&mut self, input: &[u8]) -> [u8; 32] {
        let start = Instant::now();
        self.init_keccak(input);
        let t1 = Instant::now();
        self.expand_keys(0);
        let t2 = Instant::now();
        self.explode();
        let t3 = Instant::now();
        self.iterate(ITER / 2);
        let t4 = Instant::now();
        self.expand_keys(AES_KEY_SIZE);
        let t5 = Instant::now();
        self.implode();
        let t6 = Instant::now();
        self.finalize_keccak();
        let t7 = Instant::now();
        let digest = self.tail();
        let end = Instant::now();

        let marks = [start, t1, t2, t3, t4, t5, t6, t7, end];
        for (slot, pair) in self.stage_times.iter_mut().zip(marks.windows(2)) {
            *slot += pair[1] - pair[0];
        }
        self.stage_times[STAGES - 1] += end - start;
        digest
    }

    // =========================================================================
    // STAGES
    // =========================================================================

    /// Absorb `input` into the 200-byte Keccak state.
    pub fn init_keccak(&mut self, input: &[u8]) {
        keccak::keccak1600(input, &mut self.state.0);
    }

    /// Expand `state[offset..offset + 32]` into the ten round keys.
    /// The pipeline uses offset 0 before explode and 32 before implode.
    pub fn expand_keys(&mut self, offset: usize) {
        (self.engine.expand_keys)(&mut self.keys.0, &self.state.0, offset);
    }

    /// Fill the scratchpad from the state text block.
    pub fn explode(&mut self) {
        (self.engine.explode)(&mut self.scratchpad, &self.state.0, &self.keys.0);
    }

    /// Run `turns` turns of the memory-hard loop; a full hash runs `ITER / 2`.
    pub fn iterate(&mut self, turns: usize) {
        (self.engine.iterate)(&mut self.scratchpad, &self.state.0, turns);
    }

    /// Reabsorb the scratchpad into the state text block.
    pub fn implode(&mut self) {
        (self.engine.implode)(&mut self.state.0, &self.scratchpad, &self.keys.0);
    }

    /// Run the final permutation over the state as-if stored big-endian:
    /// each lane is swapped in, permuted for 24 rounds, and swapped back.
    pub fn finalize_keccak(&mut self) {
        let mut lanes = [0u64; 25];
        for (lane, chunk) in lanes.iter_mut().zip(self.state.0.chunks_exact(8)) {
            let mut b = [0u8; 8];
            b.copy_from_slice(chunk);
            *lane = u64::from_be_bytes(b);
        }
        keccak::keccak_f(&mut lanes, keccak::KECCAK_ROUNDS);
        for (chunk, lane) in self.state.0.chunks_exact_mut(8).zip(lanes.iter()) {
            chunk.copy_from_slice(&lane.to_be_bytes());
        }
    }

    /// Apply the selected tail hash over the whole state.
    #[must_use]
    pub fn tail(&self) -> [u8; 32] {
        tail::tail_digest(&self.state.0)
    }

    /// Which tail hash the finalized state selects.
    #[must_use]
    pub fn tail_hash(&self) -> TailHash {
        TailHash::from_state(&self.state.0)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// The Keccak state. After [`Self::hash`] this is the finalized state the
    /// tail digest was computed over, for callers that validate on raw state.
    #[must_use]
    pub fn state(&self) -> &[u8; STATE_SIZE] {
        &self.state.0
    }

    /// Mutable state access for white-box verification.
    pub fn state_mut(&mut self) -> &mut [u8; STATE_SIZE] {
        &mut self.state.0
    }

    /// Round key `i` of the ten currently expanded.
    ///
    /// # Panics
    /// Panics if `i >= 10`.
    #[must_use]
    pub fn round_key(&self, i: usize) -> &[u8] {
        assert!(i < ROUND_KEYS);
        &self.keys.0[i * AES_BLOCK_SIZE..(i + 1) * AES_BLOCK_SIZE]
    }

    /// Mutable key-buffer access for white-box verification.
    pub fn keys_mut(&mut self) -> &mut [u8; KEY_BUFFER_SIZE] {
        &mut self.keys.0
    }

    /// The scratchpad contents.
    #[must_use]
    pub fn scratchpad(&self) -> &[u8] {
        &self.scratchpad
    }

    /// Mutable scratchpad access for white-box verification.
    pub fn scratchpad_mut(&mut self) -> &mut [u8] {
        &mut self.scratchpad
    }

    /// Accumulated per-stage durations: init_keccak, expand_keys(0), explode,
    /// iterate, expand_keys(32), implode, finalize_keccak, tail, and the
    /// whole-hash total.
    #[must_use]
    pub fn stage_times(&self) -> &[Duration; STAGES] {
        &self.stage_times
    }

    /// The engine this context is bound to.
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.engine.name
    }
}
