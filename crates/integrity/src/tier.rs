//! Execution tiers of the digest pipeline.
//!
//! A tier fixes how the two stages run: which fold kernel reduces the block
//! and which realization of the SM3 compression hashes the intermediate.
//! Tiers differ only in scheduling. Every tier returns exactly the bytes of
//! [`Tier::Reference`] for every input.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use logging::trace_tier;

use crate::block::{Block, Digest128, Digest256, DigestOutput, Intermediate, truncate};
use crate::error::IntegrityError;
use crate::fold::{FoldKernel, fold_reference, fold_unrolled, fold_vectorized};
use crate::sm3;

/// Selectable realization of the fold + SM3 pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Tier {
    /// Byte-wise fold and loop-based SM3.
    Reference,
    /// Word-wise fold and fully unrolled SM3 rounds.
    Unrolled,
    /// SIMD fold (AVX2, SSE2 or NEON, detected at runtime) and unrolled SM3.
    ///
    /// Falls back to the word-wise fold when no vector unit is usable.
    Vectorized,
}

impl Tier {
    /// Every tier, slowest first.
    pub const ALL: [Self; 3] = [Self::Reference, Self::Unrolled, Self::Vectorized];

    /// Lowercase name, as accepted by [`Tier::from_str`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Unrolled => "unrolled",
            Self::Vectorized => "vectorized",
        }
    }

    /// Fastest tier for the current CPU.
    #[must_use]
    pub fn detect() -> Self {
        if FoldKernel::active() == FoldKernel::Portable {
            Self::Unrolled
        } else {
            Self::Vectorized
        }
    }

    /// Runs the XOR-fold stage.
    #[inline]
    #[must_use]
    pub fn fold(self, block: &Block) -> Intermediate {
        match self {
            Self::Reference => fold_reference(block),
            Self::Unrolled => fold_unrolled(block),
            Self::Vectorized => fold_vectorized(block),
        }
    }

    /// Runs the SM3 stage on a folded intermediate.
    #[inline]
    #[must_use]
    pub fn compress(self, intermediate: &Intermediate) -> Digest256 {
        match self {
            Self::Reference => sm3::digest_intermediate(intermediate),
            Self::Unrolled | Self::Vectorized => sm3::unrolled::digest_intermediate(intermediate),
        }
    }

    /// 256-bit digest of one block.
    #[inline]
    #[must_use]
    pub fn hash256(self, block: &Block) -> Digest256 {
        self.compress(&self.fold(block))
    }

    /// 128-bit digest of one block: the first 16 bytes of [`Tier::hash256`].
    #[inline]
    #[must_use]
    pub fn hash128(self, block: &Block) -> Digest128 {
        truncate(&self.hash256(block))
    }

    /// Digest of one block in the width of `D`.
    #[inline]
    #[must_use]
    pub fn hash<D: DigestOutput>(self, block: &Block) -> D {
        D::from_full(&self.hash256(block))
    }

    /// Whether this tier agrees with [`Tier::Reference`] on `block`.
    #[must_use]
    pub fn equals_reference(self, block: &Block) -> bool {
        self.hash256(block) == Self::Reference.hash256(block)
    }
}

impl Default for Tier {
    fn default() -> Self {
        global()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| IntegrityError::UnknownTier(s.to_owned()))
    }
}

/// Process-wide default tier, detected on first use.
pub fn global() -> Tier {
    static TIER: OnceLock<Tier> = OnceLock::new();
    *TIER.get_or_init(|| {
        let tier = Tier::detect();
        trace_tier!(
            tier = tier.name(),
            kernel = FoldKernel::active().name(),
            "selected default tier"
        );
        tier
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BLOCK_LEN;

    fn sample(seed: u8) -> Block {
        std::array::from_fn(|i| (i as u8).wrapping_mul(seed).rotate_left(3) ^ seed)
    }

    #[test]
    fn names_parse_back() {
        for tier in Tier::ALL {
            assert_eq!(tier.name().parse::<Tier>().unwrap(), tier);
            assert_eq!(tier.to_string(), tier.name());
        }
        assert_eq!(" Unrolled ".parse::<Tier>().unwrap(), Tier::Unrolled);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "fast".parse::<Tier>().unwrap_err();
        assert!(matches!(err, IntegrityError::UnknownTier(ref name) if name == "fast"));
    }

    #[test]
    fn tiers_agree_with_reference() {
        for seed in [1u8, 7, 0x5b, 0xfe] {
            let block = sample(seed);
            for tier in Tier::ALL {
                assert!(tier.equals_reference(&block), "{tier} diverged");
            }
        }
    }

    #[test]
    fn hash128_is_prefix_of_hash256() {
        let block = sample(3);
        for tier in Tier::ALL {
            assert_eq!(tier.hash128(&block)[..], tier.hash256(&block)[..16]);
            let short: Digest128 = tier.hash(&block);
            assert_eq!(short, tier.hash128(&block));
        }
    }

    #[test]
    fn zero_and_ones_share_a_digest() {
        let zero = [0u8; BLOCK_LEN];
        let ones = [0xffu8; BLOCK_LEN];
        assert_eq!(Tier::Reference.hash256(&zero), Tier::Reference.hash256(&ones));
    }

    #[test]
    fn global_tier_is_stable() {
        assert_eq!(global(), global());
        assert_eq!(Tier::default(), global());
    }
}
