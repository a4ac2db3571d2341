//! Official test vectors.
//!
//! End-to-end digests against the canonical JSON vectors — one input per
//! tail-hash branch — plus boundary-length inputs.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use cryptonight::{Hasher, TailHash};
use hex_literal::hex;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;

#[derive(Deserialize)]
struct Vector {
    name: String,
    input: String,
    tail: String,
    digest_prefix: String,
}

#[derive(Deserialize)]
struct TestVectors {
    vectors: Vec<Vector>,
}

fn tail_name(tail: TailHash) -> &'static str {
    match tail {
        TailHash::Blake => "blake",
        TailHash::Groestl => "groestl",
        TailHash::Jh => "jh",
        TailHash::Skein => "skein",
    }
}

#[test]
fn official_vectors() {
    let file = File::open("tests/test_vectors.json").expect("failed to open test_vectors.json");
    let data: TestVectors =
        serde_json::from_reader(BufReader::new(file)).expect("failed to parse JSON");

    let mut hasher = Hasher::new().expect("scratchpad allocation");
    for vector in data.vectors {
        let digest = hasher.hash(vector.input.as_bytes());
        assert_eq!(
            hex::encode(&digest[..16]),
            vector.digest_prefix,
            "vector mismatched: {}",
            vector.name
        );
        assert_eq!(tail_name(hasher.tail_hash()), vector.tail, "{}", vector.name);
    }
}

#[test]
fn full_groestl_digest() {
    let digest = cryptonight::hash(b"This is a test").unwrap();
    assert_eq!(
        digest,
        hex!("a084f01d1437a09c6985401b60d43554ae105802c5f5d8a9b3253649c0be6605")
    );
    assert!(cryptonight::verify(b"This is a test", &digest).unwrap());
    let mut wrong = digest;
    wrong[31] ^= 1;
    assert!(!cryptonight::verify(b"This is a test", &wrong).unwrap());
}

#[test]
fn boundary_lengths() {
    // Empty, one byte, and the Keccak rate boundary all hash deterministically
    // and produce pairwise distinct digests.
    let mut hasher = Hasher::new().unwrap();
    let rate_block = [0x5au8; 136];
    let inputs: [&[u8]; 4] = [b"", b"x", &rate_block[..135], &rate_block];

    let digests: Vec<[u8; 32]> = inputs.iter().map(|input| hasher.hash(input)).collect();
    for (i, input) in inputs.iter().enumerate() {
        assert_eq!(hasher.hash(input), digests[i], "input length {}", input.len());
    }
    for i in 0..digests.len() {
        for j in i + 1..digests.len() {
            assert_ne!(digests[i], digests[j]);
        }
    }
}

#[test]
fn context_reuse_matches_fresh_context() {
    let mut reused = Hasher::new().unwrap();
    let first = reused.hash(b"This is a test");
    let _ = reused.hash(b"This is a quick test");
    let again = reused.hash(b"This is a test");
    assert_eq!(first, again);
    assert_eq!(first, cryptonight::hash(b"This is a test").unwrap());
}

#[test]
fn stage_times_accumulate() {
    let mut hasher = Hasher::new().unwrap();
    let _ = hasher.hash(b"This is a test");
    let total = *hasher.stage_times().last().unwrap();
    assert!(total > std::time::Duration::ZERO);
    // The iterate stage dominates the hash; it must at least be non-zero.
    assert!(hasher.stage_times()[3] > std::time::Duration::ZERO);
    let _ = hasher.hash(b"This is a test");
    assert!(*hasher.stage_times().last().unwrap() > total);
}
