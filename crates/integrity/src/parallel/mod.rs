//! Multi-threaded dispatch on a rayon worker pool.
//!
//! Blocks are split into contiguous ranges (see [`partition`]) and each
//! worker hashes its range into the matching, disjoint slice of the output.
//! No locks are taken on the hashing path and the caller blocks until every
//! worker has finished, so the result is identical to [`crate::hash_batch`]
//! for any worker count.
//!
//! A [`WorkerPool`] owns its threads: they start in [`WorkerPool::new`], are
//! reused by every dispatch, and stop in [`WorkerPool::shutdown`] or on drop.
//! The free functions [`hash_parallel`] and [`hash_parallel_blocks`] share
//! a single lazily started pool instead. It is sized to the largest
//! effective request seen so far, and a smaller request uses only part of
//! it. If that pool cannot be started they hash on the calling thread.

mod partition;

use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use logging::trace_pool;

use crate::batch::{fill_raw, hash_batch};
use crate::block::{Block, DigestOutput, DigestWidth, blocks_from_bytes, check_output_len};
use crate::config::MAX_THREADS;
use crate::error::IntegrityError;
use crate::tier::Tier;

pub use partition::partition;

/// Outcome of one parallel dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchSummary {
    /// Blocks hashed.
    pub blocks: usize,
    /// Worker threads the blocks were spread over; `0` means the calling
    /// thread did all the work.
    pub workers: usize,
    /// The requested pool could not be started and the dispatch ran
    /// sequentially instead.
    pub degraded: bool,
}

impl DispatchSummary {
    const fn sequential(blocks: usize, degraded: bool) -> Self {
        Self {
            blocks,
            workers: 0,
            degraded,
        }
    }
}

/// A fixed-size pool of hashing threads.
pub struct WorkerPool {
    workers: usize,
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Starts a pool with `workers` threads, capped at [`MAX_THREADS`].
    ///
    /// `workers == 0` creates a pool without threads that hashes on the
    /// calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::PoolBuild`] when the threads cannot be
    /// spawned.
    pub fn new(workers: usize) -> Result<Self, IntegrityError> {
        let workers = workers.min(MAX_THREADS);
        if workers == 0 {
            return Ok(Self::sequential());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("foldsm3-worker-{index}"))
            .build()
            .map_err(|err| IntegrityError::pool_build(workers, err))?;

        trace_pool!(workers, "worker pool started");
        Ok(Self {
            workers,
            pool: Some(pool),
        })
    }

    /// A pool without threads; every dispatch runs on the calling thread.
    #[must_use]
    pub const fn sequential() -> Self {
        Self {
            workers: 0,
            pool: None,
        }
    }

    /// Number of worker threads.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Hashes `blocks[i]` into `outputs[i]` across the pool.
    ///
    /// At most one worker per block takes part; the summary reports how
    /// many did.
    ///
    /// # Panics
    ///
    /// Panics if `blocks` and `outputs` have different lengths.
    pub fn hash_blocks<D: DigestOutput>(
        &self,
        tier: Tier,
        blocks: &[Block],
        outputs: &mut [D],
    ) -> DispatchSummary {
        self.dispatch(tier, blocks, outputs, self.workers)
    }

    /// Flat-buffer variant of [`WorkerPool::hash_blocks`].
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::BufferLength`] or
    /// [`IntegrityError::OutputLength`] when a buffer has the wrong length.
    pub fn hash_blocks_raw(
        &self,
        tier: Tier,
        blocks: &[u8],
        out: &mut [u8],
        width: DigestWidth,
    ) -> Result<DispatchSummary, IntegrityError> {
        let blocks = blocks_from_bytes(blocks)?;
        check_output_len(out, blocks.len(), width)?;
        Ok(self.dispatch_width(tier, blocks, out, width, self.workers))
    }

    /// Spreads `blocks` over at most `workers` of the pool's threads.
    fn dispatch<D: DigestOutput>(
        &self,
        tier: Tier,
        blocks: &[Block],
        outputs: &mut [D],
        workers: usize,
    ) -> DispatchSummary {
        assert_eq!(
            blocks.len(),
            outputs.len(),
            "batch input and output counts differ"
        );

        let workers = effective_workers(workers.min(self.workers), blocks.len());
        let Some(pool) = self.pool.as_ref().filter(|_| workers > 0) else {
            hash_batch(tier, blocks, outputs);
            return DispatchSummary::sequential(blocks.len(), false);
        };

        let ranges = partition(blocks.len(), workers);
        trace_pool!(
            blocks = blocks.len(),
            workers,
            chunk = ranges.first().map_or(0, |r| r.len()),
            "partition plan"
        );

        let spawned = pool.scope(|scope| {
            let mut rest = outputs;
            let mut spawned = 0;
            for range in ranges {
                let (head, tail) = mem::take(&mut rest).split_at_mut(range.len());
                rest = tail;
                if range.is_empty() {
                    continue;
                }
                spawned += 1;
                let inputs = &blocks[range];
                scope.spawn(move |_| hash_batch(tier, inputs, head));
            }
            spawned
        });

        trace_pool!(blocks = blocks.len(), workers = spawned, "parallel dispatch complete");
        DispatchSummary {
            blocks: blocks.len(),
            workers: spawned,
            degraded: false,
        }
    }

    fn dispatch_width(
        &self,
        tier: Tier,
        blocks: &[Block],
        out: &mut [u8],
        width: DigestWidth,
        workers: usize,
    ) -> DispatchSummary {
        match width {
            DigestWidth::Bits256 => {
                self.dispatch(tier, blocks, out.as_chunks_mut::<32>().0, workers)
            }
            DigestWidth::Bits128 => {
                self.dispatch(tier, blocks, out.as_chunks_mut::<16>().0, workers)
            }
        }
    }

    /// Stops the worker threads.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.pool.take().is_some() {
            trace_pool!(workers = self.workers, "worker pool stopped");
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

/// Workers that can do useful work: no more than one per block and never
/// more than [`MAX_THREADS`].
#[must_use]
pub fn effective_workers(requested: usize, blocks: usize) -> usize {
    requested.min(blocks).min(MAX_THREADS)
}

/// The pool behind [`hash_parallel`] and [`hash_parallel_blocks`].
///
/// There is at most one. A request for more workers than it has replaces it
/// with a larger pool; the old one stops when its last dispatch lets go.
static SHARED_POOL: Mutex<Option<Arc<WorkerPool>>> = Mutex::new(None);

/// Returns a shared pool with at least `workers` threads.
pub(crate) fn shared_pool(workers: usize) -> Result<Arc<WorkerPool>, IntegrityError> {
    let mut slot = SHARED_POOL.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(pool) = slot.as_ref().filter(|pool| pool.workers() >= workers) {
        return Ok(Arc::clone(pool));
    }
    let pool = Arc::new(WorkerPool::new(workers)?);
    *slot = Some(Arc::clone(&pool));
    Ok(pool)
}

/// Thread count of the shared pool, `0` before first use.
#[must_use]
pub fn shared_pool_workers() -> usize {
    SHARED_POOL
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map_or(0, |pool| pool.workers())
}

/// Unwraps a pool lookup, logging the failure when the caller has to fall
/// back to the calling thread.
fn pool_or_warn(pool: Result<Arc<WorkerPool>, IntegrityError>) -> Option<Arc<WorkerPool>> {
    match pool {
        Ok(pool) => Some(pool),
        Err(error) => {
            tracing::warn!(
                target: "foldsm3::pool",
                %error,
                "worker pool unavailable, hashing on the calling thread"
            );
            None
        }
    }
}

/// Hashes a flat buffer of blocks on up to `threads` workers.
///
/// The worker count is limited by [`effective_workers`], so a small batch
/// never starts more threads than it has blocks. `threads == 0` hashes on
/// the calling thread. If the pool cannot be started the blocks are hashed
/// on the calling thread as well and the summary reports `degraded`.
///
/// # Errors
///
/// Returns [`IntegrityError::BufferLength`] or
/// [`IntegrityError::OutputLength`] when a buffer has the wrong length. Pool
/// start-up failures are not errors here.
///
/// # Examples
///
/// ```
/// use integrity::{DigestWidth, Tier, hash_parallel};
///
/// let blocks = vec![7u8; 4096 * 3];
/// let mut out = vec![0u8; 16 * 3];
/// let summary = hash_parallel(Tier::Unrolled, &blocks, &mut out, 2, DigestWidth::Bits128)?;
/// assert_eq!(summary.blocks, 3);
/// # Ok::<(), integrity::IntegrityError>(())
/// ```
pub fn hash_parallel(
    tier: Tier,
    blocks: &[u8],
    out: &mut [u8],
    threads: usize,
    width: DigestWidth,
) -> Result<DispatchSummary, IntegrityError> {
    let blocks = blocks_from_bytes(blocks)?;
    check_output_len(out, blocks.len(), width)?;

    let workers = effective_workers(threads, blocks.len());
    if workers == 0 {
        fill_raw(tier, blocks, out, width);
        return Ok(DispatchSummary::sequential(blocks.len(), false));
    }

    match pool_or_warn(shared_pool(workers)) {
        Some(pool) => Ok(pool.dispatch_width(tier, blocks, out, width, workers)),
        None => {
            fill_raw(tier, blocks, out, width);
            Ok(DispatchSummary::sequential(blocks.len(), true))
        }
    }
}

/// Typed variant of [`hash_parallel`].
///
/// # Panics
///
/// Panics if `blocks` and `outputs` have different lengths.
pub fn hash_parallel_blocks<D: DigestOutput>(
    tier: Tier,
    blocks: &[Block],
    outputs: &mut [D],
    threads: usize,
) -> DispatchSummary {
    let workers = effective_workers(threads, blocks.len());
    if workers == 0 {
        hash_batch(tier, blocks, outputs);
        return DispatchSummary::sequential(blocks.len(), false);
    }

    match pool_or_warn(shared_pool(workers)) {
        Some(pool) => pool.dispatch(tier, blocks, outputs, workers),
        None => {
            hash_batch(tier, blocks, outputs);
            DispatchSummary::sequential(blocks.len(), true)
        }
    }
}
