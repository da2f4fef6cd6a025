//! Diffusion statistics over digests.
//!
//! The measurements return plain report values; callers aggregate or assert
//! on them as they see fit.

use std::borrow::Borrow;

use crate::block::{BLOCK_LEN, Block, Digest256};
use crate::tier::Tier;

/// Number of bits in a 256-bit digest.
pub const DIGEST_BITS: usize = 256;

/// Number of differing bits between two equally sized byte strings.
///
/// # Panics
///
/// Panics if the lengths differ.
#[must_use]
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    assert_eq!(a.len(), b.len(), "hamming distance needs equal lengths");
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Returns a copy of `block` with bit `bit` (`byte * 8 + bit_in_byte`)
/// inverted.
///
/// # Panics
///
/// Panics if `bit` is outside the block.
#[must_use]
pub fn flip_bit(block: &Block, bit: usize) -> Block {
    assert!(bit < BLOCK_LEN * 8, "bit {bit} is outside the block");
    let mut flipped = *block;
    flipped[bit / 8] ^= 1 << (bit % 8);
    flipped
}

/// Hamming distances between the digests of paired blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AvalancheReport {
    /// Number of pairs measured.
    pub samples: usize,
    /// Mean distance in bits.
    pub mean: f64,
    /// Population standard deviation in bits.
    pub std_dev: f64,
    /// Smallest distance seen.
    pub min: u32,
    /// Largest distance seen.
    pub max: u32,
}

impl AvalancheReport {
    /// Builds a report from raw distances.
    #[must_use]
    pub fn from_distances(distances: &[u32]) -> Self {
        if distances.is_empty() {
            return Self::default();
        }

        let samples = distances.len();
        let n = samples as f64;
        let mean = distances.iter().map(|&d| f64::from(d)).sum::<f64>() / n;
        let variance = distances
            .iter()
            .map(|&d| {
                let delta = f64::from(d) - mean;
                delta * delta
            })
            .sum::<f64>()
            / n;

        Self {
            samples,
            mean,
            std_dev: variance.sqrt(),
            min: distances.iter().copied().min().unwrap_or(0),
            max: distances.iter().copied().max().unwrap_or(0),
        }
    }

    /// Mean distance as a fraction of the digest width.
    #[must_use]
    pub fn mean_ratio(&self) -> f64 {
        self.mean / DIGEST_BITS as f64
    }
}

/// Measures the 256-bit digest distance for each `(a, b)` pair.
pub fn avalanche<A, B>(tier: Tier, pairs: &[(A, B)]) -> AvalancheReport
where
    A: Borrow<Block>,
    B: Borrow<Block>,
{
    let distances: Vec<u32> = pairs
        .iter()
        .map(|(a, b)| hamming_distance(&tier.hash256(a.borrow()), &tier.hash256(b.borrow())))
        .collect();
    AvalancheReport::from_distances(&distances)
}

/// Per-bit set counts over a collection of 256-bit digests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitBalanceReport {
    /// Number of digests counted.
    pub samples: usize,
    /// How many digests had each bit set; bit `i` is bit `i % 8` of byte
    /// `i / 8`.
    pub set_counts: [u32; DIGEST_BITS],
}

impl Default for BitBalanceReport {
    fn default() -> Self {
        Self {
            samples: 0,
            set_counts: [0; DIGEST_BITS],
        }
    }
}

impl BitBalanceReport {
    /// Adds one digest to the counts.
    pub fn record(&mut self, digest: &Digest256) {
        self.samples += 1;
        for (bit, count) in self.set_counts.iter_mut().enumerate() {
            *count += u32::from((digest[bit / 8] >> (bit % 8)) & 1);
        }
    }

    /// Fraction of samples with `bit` set.
    #[must_use]
    pub fn ratio(&self, bit: usize) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        f64::from(self.set_counts[bit]) / self.samples as f64
    }

    /// Fraction of bits whose set ratio lies in `lo..=hi`.
    #[must_use]
    pub fn balanced_fraction(&self, lo: f64, hi: f64) -> f64 {
        let balanced = (0..DIGEST_BITS)
            .filter(|&bit| (lo..=hi).contains(&self.ratio(bit)))
            .count();
        balanced as f64 / DIGEST_BITS as f64
    }
}

/// Counts set bits over the digests of `inputs`.
pub fn bit_balance<B: Borrow<Block>>(tier: Tier, inputs: &[B]) -> BitBalanceReport {
    let mut report = BitBalanceReport::default();
    for input in inputs {
        report.record(&tier.hash256(input.borrow()));
    }
    report
}
