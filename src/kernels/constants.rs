//! CryptoNight algorithm constants.

/// Total size of the scratchpad working memory.
pub const MEMORY: usize = 1 << 21;

/// Number of scratchpad iterations; the main loop runs `ITER / 2` turns.
pub const ITER: usize = 1 << 20;

/// Size of an AES block.
pub const AES_BLOCK_SIZE: usize = 16;

/// Size of an AES-256 key.
pub const AES_KEY_SIZE: usize = 32;

/// Number of blocks carried through explode/implode at a time.
pub const INIT_SIZE_BLOCK: usize = 8;

/// Number of scratchpad bytes written per explode/implode row.
pub const INIT_SIZE_BYTE: usize = INIT_SIZE_BLOCK * AES_BLOCK_SIZE;

/// Total number of 16-byte blocks in the scratchpad.
pub const TOTAL_BLOCKS: usize = MEMORY / AES_BLOCK_SIZE;

/// Size of the Keccak sponge state in bytes.
pub const STATE_SIZE: usize = 200;

/// Number of AES round keys expanded from 32 bytes of state.
pub const ROUND_KEYS: usize = 10;

/// Size of the round-key buffer.
pub const KEY_BUFFER_SIZE: usize = ROUND_KEYS * AES_BLOCK_SIZE;
