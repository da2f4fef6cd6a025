//! crates/logging/src/tracing_macros.rs
//! Convenience macros for the digest pipeline's tracing targets.
//!
//! Each macro forwards to the matching `tracing` macro with the target of
//! one [`DebugFlag`](crate::DebugFlag), so [`FoldLayer`](crate::FoldLayer)
//! can route it.

/// Emit a tier-selection trace.
///
/// # Example
/// ```ignore
/// trace_tier!(tier = %tier, "selected default tier");
/// ```
#[macro_export]
macro_rules! trace_tier {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "foldsm3::tier", $($arg)*)
    };
}

/// Emit a batch-dispatch trace.
///
/// # Example
/// ```ignore
/// trace_batch!(blocks = n, "batch complete");
/// ```
#[macro_export]
macro_rules! trace_batch {
    ($($arg:tt)*) => {
        $crate::tracing::trace!(target: "foldsm3::batch", $($arg)*)
    };
}

/// Emit a staging-layer trace.
///
/// # Example
/// ```ignore
/// trace_staging!(staged = count, "staged misaligned inputs");
/// ```
#[macro_export]
macro_rules! trace_staging {
    ($($arg:tt)*) => {
        $crate::tracing::trace!(target: "foldsm3::staging", $($arg)*)
    };
}

/// Emit a worker-pool trace.
///
/// # Example
/// ```ignore
/// trace_pool!(workers = 4, "pool started");
/// ```
#[macro_export]
macro_rules! trace_pool {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "foldsm3::pool", $($arg)*)
    };
}

/// Record a diagnostic directly in the thread-local buffer when the current
/// thread's verbosity for `$flag` is at least `$level`.
///
/// # Example
/// ```ignore
/// debug_log!(Pool, 2, "partition {:?}", ranges);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($flag:ident, $level:expr, $($arg:tt)*) => {
        if $crate::debug_gte($crate::DebugFlag::$flag, $level) {
            $crate::emit_debug($crate::DebugFlag::$flag, $level, format!($($arg)*));
        }
    };
}
