//! XOR-fold stage: 4096-byte block to 64-byte intermediate.
//!
//! The block is viewed as 64 lanes of 64 bytes and the lanes are XORed
//! together, so `intermediate[k]` is the XOR of `block[lane * 64 + k]` over
//! every lane. The fold is linear and therefore cancels for inputs that
//! repeat the same byte an even number of times per position (all-zero and
//! all-`0xFF` blocks both fold to zero).
//!
//! Three realizations are provided and all of them return identical bytes:
//!
//! - [`fold_reference`] walks lanes byte by byte,
//! - [`fold_unrolled`] XORs eight 64-bit words per lane,
//! - [`fold_vectorized`] uses the widest SIMD kernel the CPU offers, chosen
//!   once per process by [`FoldKernel::active`].

use std::sync::OnceLock;

use crate::block::{Block, INTERMEDIATE_LEN, Intermediate};

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
mod neon;
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod x86;

const WORDS_PER_LANE: usize = INTERMEDIATE_LEN / 8;

/// Byte-at-a-time fold.
#[must_use]
pub fn fold_reference(block: &Block) -> Intermediate {
    let mut out = [0u8; INTERMEDIATE_LEN];
    for lane in block.as_chunks::<INTERMEDIATE_LEN>().0 {
        for (acc, byte) in out.iter_mut().zip(lane) {
            *acc ^= byte;
        }
    }
    out
}

/// Word-at-a-time fold with eight independent 64-bit accumulators.
///
/// Native endianness is used for both the load and the store, so the byte
/// order of the result matches [`fold_reference`] on every target.
#[inline]
#[must_use]
pub fn fold_unrolled(block: &Block) -> Intermediate {
    let mut acc = [0u64; WORDS_PER_LANE];
    for lane in block.as_chunks::<INTERMEDIATE_LEN>().0 {
        let words = lane.as_chunks::<8>().0;
        acc[0] ^= u64::from_ne_bytes(words[0]);
        acc[1] ^= u64::from_ne_bytes(words[1]);
        acc[2] ^= u64::from_ne_bytes(words[2]);
        acc[3] ^= u64::from_ne_bytes(words[3]);
        acc[4] ^= u64::from_ne_bytes(words[4]);
        acc[5] ^= u64::from_ne_bytes(words[5]);
        acc[6] ^= u64::from_ne_bytes(words[6]);
        acc[7] ^= u64::from_ne_bytes(words[7]);
    }

    let mut out = [0u8; INTERMEDIATE_LEN];
    for (chunk, word) in out.chunks_exact_mut(8).zip(acc) {
        chunk.copy_from_slice(&word.to_ne_bytes());
    }
    out
}

/// Fold kernels selectable at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FoldKernel {
    /// Two 256-bit accumulators (x86_64 with AVX2).
    Avx2,
    /// Four 128-bit accumulators (x86_64 baseline).
    Sse2,
    /// Four 128-bit accumulators (aarch64 Advanced SIMD).
    Neon,
    /// 64-bit word fold, available everywhere.
    Portable,
}

impl FoldKernel {
    /// Detects the widest usable kernel.
    ///
    /// Returns [`FoldKernel::Portable`] when the `simd` feature is disabled
    /// or no vector unit is detected.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        {
            if std::arch::is_x86_feature_detected!("avx2") {
                return Self::Avx2;
            }
            if std::arch::is_x86_feature_detected!("sse2") {
                return Self::Sse2;
            }
        }

        #[cfg(all(feature = "simd", target_arch = "aarch64"))]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                return Self::Neon;
            }
        }

        Self::Portable
    }

    /// Kernel used by [`fold_vectorized`], detected on first use.
    #[must_use]
    pub fn active() -> Self {
        static ACTIVE: OnceLock<FoldKernel> = OnceLock::new();
        *ACTIVE.get_or_init(Self::detect)
    }

    /// Short lowercase name for logs and benchmark labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Avx2 => "avx2",
            Self::Sse2 => "sse2",
            Self::Neon => "neon",
            Self::Portable => "portable",
        }
    }

    /// Whether this kernel can run on the current CPU.
    #[must_use]
    pub fn is_supported(self) -> bool {
        match self {
            Self::Portable => true,
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Self::Avx2 => std::arch::is_x86_feature_detected!("avx2"),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Self::Sse2 => std::arch::is_x86_feature_detected!("sse2"),
            #[cfg(all(feature = "simd", target_arch = "aarch64"))]
            Self::Neon => std::arch::is_aarch64_feature_detected!("neon"),
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    /// Folds `block` with this kernel.
    ///
    /// Kernels that the CPU does not support fall back to
    /// [`fold_unrolled`], so the result is always correct.
    #[must_use]
    pub fn fold(self, block: &Block) -> Intermediate {
        match self {
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Self::Avx2 => x86::fold_avx2(block).unwrap_or_else(|| fold_unrolled(block)),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Self::Sse2 => x86::fold_sse2(block).unwrap_or_else(|| fold_unrolled(block)),
            #[cfg(all(feature = "simd", target_arch = "aarch64"))]
            Self::Neon => neon::fold(block).unwrap_or_else(|| fold_unrolled(block)),
            #[allow(unreachable_patterns)]
            _ => fold_unrolled(block),
        }
    }
}

/// Fold with the process-wide [`FoldKernel::active`] kernel.
#[inline]
#[must_use]
pub fn fold_vectorized(block: &Block) -> Intermediate {
    FoldKernel::active().fold(block)
}
