//! Sequential batch dispatch.
//!
//! `outputs[i]` is always the single-block digest of `inputs[i]`. Blocks
//! never influence each other, and nothing outside the provided output
//! slots is written.

use std::borrow::Borrow;

use logging::trace_batch;

use crate::block::{Block, DigestOutput, DigestWidth, blocks_from_bytes, check_output_len};
use crate::error::IntegrityError;
use crate::tier::Tier;

/// Hashes every input block into the matching output slot.
///
/// # Panics
///
/// Panics if `inputs` and `outputs` have different lengths.
///
/// # Examples
///
/// ```
/// use integrity::{Tier, hash_batch};
///
/// let blocks = [[0u8; 4096], [1u8; 4096]];
/// let mut digests = [[0u8; 32]; 2];
/// hash_batch(Tier::Reference, &blocks, &mut digests);
/// assert_eq!(digests[0], Tier::Reference.hash256(&blocks[0]));
/// ```
pub fn hash_batch<B, D>(tier: Tier, inputs: &[B], outputs: &mut [D])
where
    B: Borrow<Block>,
    D: DigestOutput,
{
    assert_eq!(
        inputs.len(),
        outputs.len(),
        "batch input and output counts differ"
    );
    for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
        *output = tier.hash(input.borrow());
    }
    trace_batch!(tier = tier.name(), blocks = inputs.len(), "batch complete");
}

/// Hashes every input block and collects the digests.
#[must_use]
pub fn digest_batch<B, D>(tier: Tier, inputs: &[B]) -> Vec<D>
where
    B: Borrow<Block>,
    D: DigestOutput,
{
    let mut outputs = vec![D::default(); inputs.len()];
    hash_batch(tier, inputs, &mut outputs);
    outputs
}

/// Flat-buffer variant of [`hash_batch`].
///
/// `blocks` must hold whole 4096-byte blocks and `out` exactly one digest of
/// `width` per block.
///
/// # Errors
///
/// Returns [`IntegrityError::BufferLength`] for a partial input block and
/// [`IntegrityError::OutputLength`] for a wrongly sized output. Nothing is
/// written in either case.
pub fn hash_batch_raw(
    tier: Tier,
    blocks: &[u8],
    out: &mut [u8],
    width: DigestWidth,
) -> Result<(), IntegrityError> {
    let blocks = blocks_from_bytes(blocks)?;
    check_output_len(out, blocks.len(), width)?;
    fill_raw(tier, blocks, out, width);
    trace_batch!(tier = tier.name(), blocks = blocks.len(), "raw batch complete");
    Ok(())
}

/// Writes the digests of `blocks` into `out`, whose length was already
/// checked against `width`.
pub(crate) fn fill_raw(tier: Tier, blocks: &[Block], out: &mut [u8], width: DigestWidth) {
    for (block, slot) in blocks.iter().zip(out.chunks_exact_mut(width.len())) {
        let full = tier.hash256(block);
        slot.copy_from_slice(&full[..width.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BLOCK_LEN, Digest128, Digest256};

    fn blocks(count: usize) -> Vec<Block> {
        (0..count)
            .map(|i| std::array::from_fn(|j| ((i * 31 + j * 7) ^ (j >> 4)) as u8))
            .collect()
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let inputs: [Block; 0] = [];
        let mut outputs: [Digest256; 0] = [];
        hash_batch(Tier::Unrolled, &inputs, &mut outputs);
        assert!(digest_batch::<_, Digest128>(Tier::Unrolled, &inputs).is_empty());
    }

    #[test]
    fn batch_matches_single_block_calls() {
        let inputs = blocks(5);
        for tier in Tier::ALL {
            let digests: Vec<Digest256> = digest_batch(tier, &inputs);
            for (input, digest) in inputs.iter().zip(&digests) {
                assert_eq!(*digest, tier.hash256(input));
            }
        }
    }

    #[test]
    fn accepts_borrowed_blocks() {
        let owned = blocks(3);
        let borrowed: Vec<&Block> = owned.iter().collect();
        let boxed: Vec<Box<Block>> = owned.iter().map(|b| Box::new(*b)).collect();
        let a: Vec<Digest256> = digest_batch(Tier::Reference, &owned);
        let b: Vec<Digest256> = digest_batch(Tier::Reference, &borrowed);
        let c: Vec<Digest256> = digest_batch(Tier::Reference, &boxed);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    #[should_panic(expected = "batch input and output counts differ")]
    fn mismatched_lengths_panic() {
        let inputs = blocks(2);
        let mut outputs = [[0u8; 32]; 3];
        hash_batch(Tier::Reference, &inputs, &mut outputs);
    }

    #[test]
    fn raw_batch_writes_each_width() {
        let inputs = blocks(3);
        let flat = inputs.concat();
        for width in [DigestWidth::Bits128, DigestWidth::Bits256] {
            let mut out = vec![0u8; 3 * width.len()];
            hash_batch_raw(Tier::Vectorized, &flat, &mut out, width).unwrap();
            for (input, slot) in inputs.iter().zip(out.chunks_exact(width.len())) {
                assert_eq!(slot, &Tier::Reference.hash256(input)[..width.len()]);
            }
        }
    }

    #[test]
    fn raw_batch_rejects_bad_lengths_without_writing() {
        let flat = vec![0u8; BLOCK_LEN * 2];
        let mut out = vec![0xaau8; 48];
        let err = hash_batch_raw(Tier::Reference, &flat, &mut out, DigestWidth::Bits256)
            .unwrap_err();
        assert!(matches!(err, IntegrityError::OutputLength { len: 48, expected: 64 }));
        assert!(out.iter().all(|&b| b == 0xaa));

        let short = vec![0u8; BLOCK_LEN - 1];
        let err = hash_batch_raw(Tier::Reference, &short, &mut [], DigestWidth::Bits128)
            .unwrap_err();
        assert!(matches!(err, IntegrityError::BufferLength { what: "input", .. }));
    }
}
