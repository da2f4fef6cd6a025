//! Known-answer vectors for the fold digest and its SM3 core.
//!
//! The SM3 vectors are the GB/T 32905-2016 examples. The block vectors were
//! derived from them: a block whose lanes XOR to a 64-byte message `m`
//! hashes to `SM3(m)`.

use integrity::{BLOCK_LEN, Block, DigestWidth, Tier, baseline, hash_batch_raw, sm3, truncate};
use test_support::{ones_block, pattern_block, zero_block};

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut out, "{byte:02x}").unwrap();
    }
    out
}

const ZERO_BLOCK_DIGEST: &str = "46b58571be41685c253194d20ec7f82b659cc8c6b753f26d4e9ec85bc91c231e";

fn block_with_prefix(prefix: &[u8]) -> Block {
    let mut block = zero_block();
    block[..prefix.len()].copy_from_slice(prefix);
    block
}

// ============================================================================
// SM3 core
// ============================================================================

#[test]
fn sm3_standard_vectors() {
    assert_eq!(
        to_hex(&sm3::digest_message(b"abc")),
        "66c7f0f462eeedd9d1f2d46bdc10e4e24167c4875cf2f7a2297da02b8f4ba8e0"
    );
    assert_eq!(
        to_hex(&sm3::digest_message(&b"abcd".repeat(16))),
        "debe9ff92275b8a138604889c18e5a4d6fdb70e5387e5765293dcba39c0c5732"
    );
}

#[test]
fn intermediate_digest_is_sm3_of_the_intermediate() {
    let intermediate: [u8; 64] = std::array::from_fn(|i| (i * 3 + 1) as u8);
    assert_eq!(
        sm3::digest_intermediate(&intermediate),
        sm3::digest_message(&intermediate)
    );
}

// ============================================================================
// Block digests
// ============================================================================

#[test]
fn zero_block_vector() {
    for tier in Tier::ALL {
        assert_eq!(
            to_hex(&tier.hash256(&zero_block())),
            ZERO_BLOCK_DIGEST,
            "tier {tier}"
        );
    }
}

#[test]
fn single_lane_blocks_hash_to_sm3_of_the_lane() {
    let vectors = [
        (
            b"abcd".repeat(16),
            "debe9ff92275b8a138604889c18e5a4d6fdb70e5387e5765293dcba39c0c5732",
        ),
        (
            b"abc".to_vec(),
            "c430ecb3c8bf00f45f897509c32cb4b6e0c598ff0774805bd50e4396132c153b",
        ),
        (
            vec![0x01],
            "a754ac5fec6c543d6f33f4749216d0e586887918d07a8b8ae8c2f4b5bb6eda66",
        ),
    ];

    for (prefix, expected) in vectors {
        let block = block_with_prefix(&prefix);
        for tier in Tier::ALL {
            assert_eq!(to_hex(&tier.hash256(&block)), expected, "tier {tier}");
        }
    }
}

#[test]
fn lane_position_does_not_matter() {
    let mut last_lane = zero_block();
    last_lane[BLOCK_LEN - 64..].copy_from_slice(&b"abcd".repeat(16));
    assert_eq!(
        to_hex(&integrity::hash256(&last_lane)),
        "debe9ff92275b8a138604889c18e5a4d6fdb70e5387e5765293dcba39c0c5732"
    );
}

#[test]
fn cancelling_blocks_share_the_zero_vector() {
    // The byte pattern repeats every four lanes, so all lanes cancel.
    for block in [pattern_block(), ones_block()] {
        assert_eq!(to_hex(&integrity::hash256(&block)), ZERO_BLOCK_DIGEST);
    }
}

#[test]
fn hash128_is_the_leading_half() {
    let block = block_with_prefix(b"abc");
    for tier in Tier::ALL {
        assert_eq!(to_hex(&tier.hash128(&block)), "c430ecb3c8bf00f45f897509c32cb4b6");
        assert_eq!(tier.hash128(&block), truncate(&tier.hash256(&block)));
    }
}

#[test]
fn raw_batch_writes_known_digests() {
    let blocks = test_support::concat_blocks(&[zero_block(), block_with_prefix(b"abc")]);
    let mut out = vec![0u8; 2 * 32];
    hash_batch_raw(Tier::Vectorized, &blocks, &mut out, DigestWidth::Bits256).unwrap();
    assert_eq!(to_hex(&out[..32]), ZERO_BLOCK_DIGEST);
    assert_eq!(
        to_hex(&out[32..]),
        "c430ecb3c8bf00f45f897509c32cb4b6e0c598ff0774805bd50e4396132c153b"
    );
}

// ============================================================================
// Baselines
// ============================================================================

#[test]
fn baseline_vectors() {
    assert_eq!(
        to_hex(&baseline::sha256_4kb(&zero_block())),
        "ad7facb2586fc6e966c004d7d1d16b024f5805ff7cb47c7a85dabd8b48892ca7"
    );
    assert_eq!(
        to_hex(&baseline::sm3_4kb(&zero_block())),
        "996d9ccd1272a25d574ed05aaa72c6cfd9736d3cdd0ff72a45031f6a1c4092ba"
    );
}

#[test]
fn digests_are_stable_across_calls() {
    let block: Block = std::array::from_fn(|i| (i.wrapping_mul(2_654_435_761) >> 7) as u8);
    let first = integrity::hash256(&block);
    for _ in 0..16 {
        assert_eq!(integrity::hash256(&block), first);
    }
}
