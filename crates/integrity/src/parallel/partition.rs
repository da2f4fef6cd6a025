//! Contiguous work partitioning.

use std::ops::Range;

/// Splits `0..len` into one contiguous range per worker.
///
/// Each worker receives `ceil(len / workers)` indices, except that the last
/// non-empty range is cut short at `len` and workers beyond it receive empty
/// ranges. With `workers == 0` the whole range is returned as a single entry,
/// to be processed on the calling thread.
///
/// The ranges are disjoint, ordered, and their concatenation is `0..len`.
#[must_use]
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    if workers == 0 {
        return vec![0..len];
    }

    let chunk = len.div_ceil(workers);
    (0..workers)
        .map(|worker| {
            let start = worker.saturating_mul(chunk).min(len);
            let end = start.saturating_add(chunk).min(len);
            start..end
        })
        .collect()
}
