//! Advanced SIMD fold kernel for aarch64.
//!
//! # Safety
//!
//! NEON availability is checked with `is_aarch64_feature_detected!` and
//! cached in a `OnceLock` before the `#[target_feature]` body runs. `vld1q_u8`
//! and `vst1q_u8` carry no alignment requirement, and every load offset is
//! bounded by the fixed 4096-byte block geometry.

#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use core::arch::aarch64::{uint8x16_t, veorq_u8, vld1q_u8, vst1q_u8};
use std::sync::OnceLock;

use crate::block::{Block, INTERMEDIATE_LEN, Intermediate, LANES};

static NEON_AVAILABLE: OnceLock<bool> = OnceLock::new();

#[inline]
fn neon_available() -> bool {
    *NEON_AVAILABLE.get_or_init(|| std::arch::is_aarch64_feature_detected!("neon"))
}

/// Folds with NEON, or returns `None` when the CPU lacks it.
#[inline]
pub(super) fn fold(block: &Block) -> Option<Intermediate> {
    if !neon_available() {
        return None;
    }
    // SAFETY: NEON support was verified above.
    Some(unsafe { fold_neon_impl(block) })
}

#[target_feature(enable = "neon")]
unsafe fn fold_neon_impl(block: &Block) -> Intermediate {
    let base = block.as_ptr();
    let mut acc: [uint8x16_t; 4] = [
        vld1q_u8(base),
        vld1q_u8(base.add(16)),
        vld1q_u8(base.add(32)),
        vld1q_u8(base.add(48)),
    ];

    for lane in 1..LANES {
        let ptr = base.add(lane * INTERMEDIATE_LEN);
        acc[0] = veorq_u8(acc[0], vld1q_u8(ptr));
        acc[1] = veorq_u8(acc[1], vld1q_u8(ptr.add(16)));
        acc[2] = veorq_u8(acc[2], vld1q_u8(ptr.add(32)));
        acc[3] = veorq_u8(acc[3], vld1q_u8(ptr.add(48)));
    }

    let mut out = [0u8; INTERMEDIATE_LEN];
    let dst = out.as_mut_ptr();
    vst1q_u8(dst, acc[0]);
    vst1q_u8(dst.add(16), acc[1]);
    vst1q_u8(dst.add(32), acc[2]);
    vst1q_u8(dst.add(48), acc[3]);
    out
}
