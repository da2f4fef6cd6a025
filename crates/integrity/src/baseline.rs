//! Comparison baselines over whole 4096-byte blocks.
//!
//! These are the reference points the fold digest is measured against in
//! benchmarks. They are not part of the digest pipeline.

use sha2::{Digest as _, Sha256};

use crate::block::{Block, Digest256};
use crate::sm3;

/// SHA-256 of the full block.
///
/// `sha2` selects SHA-NI or the ARMv8 crypto extensions at runtime when
/// the CPU has them.
#[must_use]
pub fn sha256_4kb(block: &Block) -> Digest256 {
    Sha256::digest(block).into()
}

/// Plain SM3 of the full block: 64 message blocks plus one padding block.
#[must_use]
pub fn sm3_4kb(block: &Block) -> Digest256 {
    sm3::digest_message(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BLOCK_LEN;
    use crate::tier::Tier;

    #[test]
    fn sha256_of_zero_block() {
        let digest = sha256_4kb(&[0u8; BLOCK_LEN]);
        assert_eq!(
            digest[..8],
            [0xad, 0x7f, 0xac, 0xb2, 0x58, 0x6f, 0xc6, 0xe9]
        );
    }

    #[test]
    fn sm3_baseline_differs_from_fold_digest() {
        let block: Block = std::array::from_fn(|i| (i * 13) as u8);
        assert_ne!(sm3_4kb(&block), Tier::Reference.hash256(&block));
    }

    #[test]
    fn sm3_baseline_of_single_lane_block_uses_whole_message() {
        // The fold digest of a block whose only non-zero lane is the first
        // equals SM3 of that lane; the baseline hashes all 4096 bytes.
        let mut block = [0u8; BLOCK_LEN];
        block[..64].copy_from_slice(&b"abcd".repeat(16));
        let mut lane = [0u8; 64];
        lane.copy_from_slice(&block[..64]);
        assert_eq!(Tier::Reference.hash256(&block), sm3::digest_message(&lane));
        assert_ne!(sm3_4kb(&block), sm3::digest_message(&lane));
    }
}
