//! Cross-engine consistency tests.
//!
//! Verifies that every round engine available on this host produces IDENTICAL
//! results: full digests, single AES rounds, and the key schedule. This
//! ensures feature detection can never alter the hash output.

#![allow(clippy::unwrap_used)]

use cryptonight::kernels::{constants::STATE_SIZE, RoundEngine};
use cryptonight::Hasher;
use rand::{Rng, RngCore};

fn engines() -> Vec<&'static RoundEngine> {
    let mut engines = vec![&cryptonight::kernels::portable::ENGINE];
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    if is_x86_feature_detected!("aes") && is_x86_feature_detected!("sse2") {
        engines.push(&cryptonight::kernels::aesni::ENGINE);
    }
    #[cfg(target_arch = "powerpc64")]
    engines.push(&cryptonight::kernels::power::ENGINE);
    #[cfg(target_arch = "sparc64")]
    engines.push(&cryptonight::kernels::sparc::ENGINE);
    engines
}

#[test]
fn digests_agree_across_engines() {
    let engines = engines();
    if engines.len() < 2 {
        println!("skipping: only the portable engine is available");
        return;
    }

    let mut scenarios: Vec<(String, Vec<u8>)> = vec![
        ("empty".into(), vec![]),
        ("small".into(), b"This is a test".to_vec()),
        ("rate boundary (136)".into(), vec![0x5a; 136]),
        ("two rate blocks (272)".into(), vec![0xa5; 272]),
    ];
    let mut rng = rand::thread_rng();
    for _ in 0..4 {
        let len = rng.gen_range(1..512);
        let mut input = vec![0u8; len];
        rng.fill_bytes(&mut input);
        scenarios.push((format!("random ({len})"), input));
    }

    let mut contexts: Vec<Hasher> = engines
        .iter()
        .map(|&engine| Hasher::with_engine(engine).unwrap())
        .collect();

    for (name, input) in scenarios {
        let reference = contexts[0].hash(&input);
        for (context, engine) in contexts.iter_mut().zip(engines.iter()).skip(1) {
            assert_eq!(
                context.hash(&input),
                reference,
                "engine {} diverged on: {name}",
                engine.name
            );
        }
    }
}

#[test]
fn aes_round_agrees_across_engines() {
    let engines = engines();
    let mut rng = rand::thread_rng();

    for _ in 0..256 {
        let mut block = [0u8; 16];
        let mut key = [0u8; 16];
        rng.fill_bytes(&mut block);
        rng.fill_bytes(&mut key);

        let reference = (engines[0].aes_round)(&block, &key);
        for engine in &engines[1..] {
            assert_eq!(
                (engine.aes_round)(&block, &key),
                reference,
                "aes_round diverged on {} (block {:02x?})",
                engine.name,
                block
            );
        }
    }
}

#[test]
fn key_schedule_agrees_across_engines() {
    let engines = engines();
    let mut rng = rand::thread_rng();

    for _ in 0..64 {
        let mut state = [0u8; STATE_SIZE];
        rng.fill_bytes(&mut state);

        for offset in [0usize, 32] {
            let mut reference = [0u8; 160];
            (engines[0].expand_keys)(&mut reference, &state, offset);
            for engine in &engines[1..] {
                let mut keys = [0u8; 160];
                (engine.expand_keys)(&mut keys, &state, offset);
                assert_eq!(
                    keys, reference,
                    "key schedule diverged on {} at offset {offset}",
                    engine.name
                );
            }
        }
    }
}
