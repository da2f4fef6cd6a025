#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `integrity` computes a block-integrity digest for fixed 4096-byte blocks.
//! Each block is reduced to 64 bytes by XOR-folding its 64 lanes, and the
//! result is hashed with the SM3 compression function. The output is a
//! 256-bit digest; the 128-bit digest is its first 16 bytes.
//!
//! # Design
//!
//! - [`fold`] and [`sm3`] are the two stages. Both are pure and hold no state
//!   between calls.
//! - [`Tier`] selects how the stages run (reference loops, unrolled rounds,
//!   or SIMD folding). All tiers produce the same bytes.
//! - [`hash_batch`] applies one tier to many blocks, [`hash_batch_staged`]
//!   does the same with prefetching and aligned staging, and
//!   [`WorkerPool`] spreads a batch over threads.
//! - [`PipelineConfig`] chooses among these from code or environment.
//!
//! # Invariants
//!
//! - `hash128(x) == hash256(x)[..16]` for every tier and input.
//! - Batch, staged and parallel dispatch write `digest(input[i])` to
//!   `output[i]` and nothing else, whatever the worker count.
//! - The fold is linear: blocks whose lanes XOR to the same intermediate
//!   share a digest. All-zero and all-`0xFF` blocks both fold to zero.
//!
//! # Examples
//!
//! ```
//! let block = [0x5au8; 4096];
//! let full = integrity::hash256(&block);
//! let short = integrity::hash128(&block);
//! assert_eq!(short[..], full[..16]);
//! ```

pub mod baseline;
mod batch;
mod block;
mod config;
mod error;
pub mod fold;
#[cfg(feature = "parallel")]
#[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
pub mod parallel;
pub mod sm3;
mod staging;
pub mod stats;
mod tier;

pub use batch::{digest_batch, hash_batch, hash_batch_raw};
pub use block::{
    BLOCK_LEN, Block, Digest128, Digest256, DigestOutput, DigestWidth, INTERMEDIATE_LEN,
    Intermediate, LANES, blocks_from_bytes, check_output_len, truncate,
};
pub use config::{
    MAX_THREADS, PREFETCH_ENV, PipelineConfig, RunSummary, THREADS_ENV, TIER_ENV, TierSelection,
};
pub use error::IntegrityError;
#[cfg(feature = "parallel")]
pub use parallel::{DispatchSummary, WorkerPool, hash_parallel, hash_parallel_blocks};
pub use staging::{
    CACHE_LINE, DEFAULT_PREFETCH_DISTANCE, MAX_PREFETCH_DISTANCE, MemoryOptions, StagingReport,
    hash_batch_raw_staged, hash_batch_staged, is_cache_aligned,
};
pub use tier::{Tier, global as default_tier};

/// 256-bit digest of one block with the default tier.
#[inline]
#[must_use]
pub fn hash256(block: &Block) -> Digest256 {
    tier::global().hash256(block)
}

/// 128-bit digest of one block with the default tier.
#[inline]
#[must_use]
pub fn hash128(block: &Block) -> Digest128 {
    tier::global().hash128(block)
}
