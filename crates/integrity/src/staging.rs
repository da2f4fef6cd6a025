//! Memory-access layer around batch dispatch.
//!
//! Two techniques are applied while walking a batch:
//!
//! - **prefetch-ahead**: while block `i` is hashed, every cache line of
//!   block `i + distance` is requested with a T0 hint (x86_64 only; other
//!   targets skip the hint),
//! - **aligned staging**: inputs that do not start on a 64-byte boundary are
//!   copied into a cache-line-aligned buffer first, and digests are
//!   collected in an aligned ring before being flushed to the caller's
//!   slots.
//!
//! Neither changes any output byte; [`hash_batch_staged`] always agrees with
//! [`crate::hash_batch`].

use std::borrow::Borrow;

use logging::trace_staging;

use crate::block::{BLOCK_LEN, Block, DigestOutput, DigestWidth, blocks_from_bytes, check_output_len};
use crate::error::IntegrityError;
use crate::tier::Tier;

/// Cache line size assumed for alignment and prefetch stride.
pub const CACHE_LINE: usize = 64;

/// Prefetch distance used when none is configured.
pub const DEFAULT_PREFETCH_DISTANCE: usize = 2;

/// Largest accepted prefetch distance.
pub const MAX_PREFETCH_DISTANCE: usize = 64;

const OUTPUT_RING: usize = 8;

/// Knobs of the memory-access layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryOptions {
    /// How many blocks ahead to prefetch; `0` disables prefetching.
    pub prefetch_distance: usize,
    /// Stage misaligned inputs and buffer outputs in aligned storage.
    pub aligned_staging: bool,
}

impl MemoryOptions {
    /// Both techniques switched off.
    pub const DISABLED: Self = Self {
        prefetch_distance: 0,
        aligned_staging: false,
    };

    /// Returns a copy with the given prefetch distance, capped at
    /// [`MAX_PREFETCH_DISTANCE`].
    pub const fn with_prefetch_distance(mut self, distance: usize) -> Self {
        self.prefetch_distance = if distance > MAX_PREFETCH_DISTANCE {
            MAX_PREFETCH_DISTANCE
        } else {
            distance
        };
        self
    }

    /// Returns a copy with aligned staging switched on or off.
    pub const fn with_aligned_staging(mut self, enabled: bool) -> Self {
        self.aligned_staging = enabled;
        self
    }
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            prefetch_distance: DEFAULT_PREFETCH_DISTANCE,
            aligned_staging: true,
        }
    }
}

/// What the layer did during one batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StagingReport {
    /// Blocks hashed.
    pub blocks: usize,
    /// Inputs copied into aligned storage because they were misaligned.
    pub staged_inputs: usize,
    /// Blocks for which a prefetch was requested.
    pub prefetched: usize,
}

#[repr(C, align(64))]
struct CacheAligned<T>(T);

/// Whether `block` starts on a cache-line boundary.
#[inline]
#[must_use]
pub fn is_cache_aligned(block: &Block) -> bool {
    block.as_ptr().align_offset(CACHE_LINE) == 0
}

#[cfg(target_arch = "x86_64")]
#[allow(unsafe_code)]
#[allow(unused_unsafe)]
#[inline(always)]
fn prefetch_block(block: &Block) {
    use core::arch::x86_64::{_MM_HINT_T0, _mm_prefetch};

    for line in block.as_chunks::<CACHE_LINE>().0 {
        // SAFETY: prefetch is a hint that never faults; the pointer is in bounds.
        unsafe { _mm_prefetch::<_MM_HINT_T0>(line.as_ptr().cast::<i8>()) };
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
const fn prefetch_block(_block: &Block) {}

/// [`crate::hash_batch`] with prefetch-ahead and aligned staging.
///
/// # Panics
///
/// Panics if `inputs` and `outputs` have different lengths.
pub fn hash_batch_staged<B, D>(
    tier: Tier,
    inputs: &[B],
    outputs: &mut [D],
    options: MemoryOptions,
) -> StagingReport
where
    B: Borrow<Block>,
    D: DigestOutput,
{
    assert_eq!(
        inputs.len(),
        outputs.len(),
        "batch input and output counts differ"
    );

    let mut report = StagingReport {
        blocks: inputs.len(),
        ..StagingReport::default()
    };
    let mut staging = CacheAligned([0u8; BLOCK_LEN]);
    let mut ring = CacheAligned([D::default(); OUTPUT_RING]);
    let mut ring_start = 0;
    let mut ring_len = 0;

    for (index, input) in inputs.iter().enumerate() {
        let distance = options.prefetch_distance;
        if distance > 0 {
            if let Some(ahead) = inputs.get(index + distance) {
                prefetch_block(ahead.borrow());
                report.prefetched += 1;
            }
        }

        let block = input.borrow();
        let source = if options.aligned_staging && !is_cache_aligned(block) {
            staging.0.copy_from_slice(block);
            report.staged_inputs += 1;
            &staging.0
        } else {
            block
        };
        let digest = tier.hash::<D>(source);

        if options.aligned_staging {
            ring.0[ring_len] = digest;
            ring_len += 1;
            if ring_len == OUTPUT_RING {
                outputs[ring_start..ring_start + ring_len].copy_from_slice(&ring.0);
                ring_start += ring_len;
                ring_len = 0;
            }
        } else {
            outputs[index] = digest;
        }
    }

    if ring_len > 0 {
        outputs[ring_start..ring_start + ring_len].copy_from_slice(&ring.0[..ring_len]);
    }

    trace_staging!(
        blocks = report.blocks,
        staged = report.staged_inputs,
        prefetched = report.prefetched,
        "staged batch complete"
    );
    report
}

/// Flat-buffer variant of [`hash_batch_staged`].
///
/// # Errors
///
/// Returns [`IntegrityError::BufferLength`] for a partial input block and
/// [`IntegrityError::OutputLength`] for a wrongly sized output.
pub fn hash_batch_raw_staged(
    tier: Tier,
    blocks: &[u8],
    out: &mut [u8],
    width: DigestWidth,
    options: MemoryOptions,
) -> Result<StagingReport, IntegrityError> {
    let blocks = blocks_from_bytes(blocks)?;
    check_output_len(out, blocks.len(), width)?;
    let report = match width {
        DigestWidth::Bits256 => {
            hash_batch_staged(tier, blocks, out.as_chunks_mut::<32>().0, options)
        }
        DigestWidth::Bits128 => {
            hash_batch_staged(tier, blocks, out.as_chunks_mut::<16>().0, options)
        }
    };
    Ok(report)
}
