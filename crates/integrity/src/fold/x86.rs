//! SSE2 and AVX2 fold kernels for x86_64.
//!
//! # Safety
//!
//! - Each `#[target_feature]` function is only entered after the matching
//!   feature was confirmed by `is_x86_feature_detected!`; the result is cached
//!   in a `OnceLock`.
//! - All loads and stores use the unaligned `loadu`/`storeu` forms, so input
//!   and output buffers carry no alignment requirement.
//! - Offsets are derived from the fixed block geometry (64 lanes of 64 bytes),
//!   so every load stays inside the 4096-byte input.

#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use core::arch::x86_64::{
    __m128i, __m256i, _mm_loadu_si128, _mm_storeu_si128, _mm_xor_si128, _mm256_loadu_si256,
    _mm256_storeu_si256, _mm256_xor_si256,
};
use std::sync::OnceLock;

use crate::block::{Block, INTERMEDIATE_LEN, Intermediate, LANES};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct FeatureLevel {
    avx2: bool,
    sse2: bool,
}

static FEATURES: OnceLock<FeatureLevel> = OnceLock::new();

#[inline]
fn cpu_features() -> FeatureLevel {
    *FEATURES.get_or_init(|| FeatureLevel {
        avx2: std::arch::is_x86_feature_detected!("avx2"),
        sse2: std::arch::is_x86_feature_detected!("sse2"),
    })
}

/// Folds with AVX2, or returns `None` when the CPU lacks it.
#[inline]
pub(super) fn fold_avx2(block: &Block) -> Option<Intermediate> {
    if !cpu_features().avx2 {
        return None;
    }
    // SAFETY: AVX2 support was verified above.
    Some(unsafe { fold_avx2_impl(block) })
}

/// Folds with SSE2, or returns `None` when the CPU lacks it.
#[inline]
pub(super) fn fold_sse2(block: &Block) -> Option<Intermediate> {
    if !cpu_features().sse2 {
        return None;
    }
    // SAFETY: SSE2 support was verified above.
    Some(unsafe { fold_sse2_impl(block) })
}

#[target_feature(enable = "avx2")]
unsafe fn fold_avx2_impl(block: &Block) -> Intermediate {
    let base = block.as_ptr();
    let mut lo = _mm256_loadu_si256(base.cast::<__m256i>());
    let mut hi = _mm256_loadu_si256(base.add(32).cast::<__m256i>());

    for lane in 1..LANES {
        let ptr = base.add(lane * INTERMEDIATE_LEN);
        lo = _mm256_xor_si256(lo, _mm256_loadu_si256(ptr.cast::<__m256i>()));
        hi = _mm256_xor_si256(hi, _mm256_loadu_si256(ptr.add(32).cast::<__m256i>()));
    }

    let mut out = [0u8; INTERMEDIATE_LEN];
    _mm256_storeu_si256(out.as_mut_ptr().cast::<__m256i>(), lo);
    _mm256_storeu_si256(out.as_mut_ptr().add(32).cast::<__m256i>(), hi);
    out
}

#[target_feature(enable = "sse2")]
unsafe fn fold_sse2_impl(block: &Block) -> Intermediate {
    let base = block.as_ptr();
    let mut acc: [__m128i; 4] = [
        _mm_loadu_si128(base.cast::<__m128i>()),
        _mm_loadu_si128(base.add(16).cast::<__m128i>()),
        _mm_loadu_si128(base.add(32).cast::<__m128i>()),
        _mm_loadu_si128(base.add(48).cast::<__m128i>()),
    ];

    for lane in 1..LANES {
        let ptr = base.add(lane * INTERMEDIATE_LEN);
        for (i, slot) in acc.iter_mut().enumerate() {
            *slot = _mm_xor_si128(*slot, _mm_loadu_si128(ptr.add(i * 16).cast::<__m128i>()));
        }
    }

    let mut out = [0u8; INTERMEDIATE_LEN];
    for (i, slot) in acc.iter().enumerate() {
        _mm_storeu_si128(out.as_mut_ptr().add(i * 16).cast::<__m128i>(), *slot);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::fold_reference;

    fn sample() -> Block {
        std::array::from_fn(|i| ((i * 131) ^ (i >> 6)) as u8)
    }

    #[test]
    fn sse2_matches_reference_when_available() {
        let block = sample();
        if let Some(folded) = fold_sse2(&block) {
            assert_eq!(folded, fold_reference(&block));
        }
    }

    #[test]
    fn avx2_matches_reference_when_available() {
        let block = sample();
        if let Some(folded) = fold_avx2(&block) {
            assert_eq!(folded, fold_reference(&block));
        }
    }

    #[test]
    fn features_are_cached() {
        let first = cpu_features();
        assert!(FEATURES.get().is_some());
        assert_eq!(first, cpu_features());
    }
}
