//! Errors surfaced by the digest crate.
//!
//! Hashing itself is infallible. Errors only arise from worker-pool
//! construction, configuration parsing, and flat-buffer validation.

use std::error::Error as StdError;

use thiserror::Error;

/// Errors returned by the integrity crate.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// The operating system refused to start the requested worker threads.
    #[error("failed to start a worker pool with {threads} thread(s): {source}")]
    PoolBuild {
        /// Number of workers that was requested.
        threads: usize,
        /// Underlying thread-pool construction failure.
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
    /// A tier name did not match any known execution strategy.
    #[error("unknown tier {0:?} (expected auto, reference, unrolled or vectorized)")]
    UnknownTier(String),
    /// A thread-count setting could not be parsed.
    #[error("invalid thread count {0:?}")]
    InvalidThreadCount(String),
    /// A prefetch-distance setting could not be parsed.
    #[error("invalid prefetch distance {0:?}")]
    InvalidPrefetchDistance(String),
    /// A flat buffer was not a whole multiple of its element size.
    #[error("{what} buffer of {len} bytes is not a whole multiple of {unit} bytes")]
    BufferLength {
        /// Which buffer was rejected.
        what: &'static str,
        /// Length of the rejected buffer.
        len: usize,
        /// Required element size.
        unit: usize,
    },
    /// An output buffer did not hold exactly one digest per input block.
    #[error("output buffer of {len} bytes does not match the {expected} bytes required")]
    OutputLength {
        /// Length of the rejected buffer.
        len: usize,
        /// Digest count times digest width.
        expected: usize,
    },
}

impl IntegrityError {
    pub(crate) fn pool_build<E>(threads: usize, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::PoolBuild {
            threads,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_length_message_names_the_buffer() {
        let err = IntegrityError::BufferLength {
            what: "input",
            len: 4097,
            unit: 4096,
        };
        assert_eq!(
            err.to_string(),
            "input buffer of 4097 bytes is not a whole multiple of 4096 bytes"
        );
    }

    #[test]
    fn output_length_message_reports_the_required_size() {
        let err = IntegrityError::OutputLength {
            len: 64,
            expected: 96,
        };
        assert_eq!(
            err.to_string(),
            "output buffer of 64 bytes does not match the 96 bytes required"
        );
    }

    #[test]
    fn pool_build_keeps_its_source() {
        let io = std::io::Error::other("no threads left");
        let err = IntegrityError::pool_build(8, io);
        assert!(err.to_string().contains("8 thread(s)"));
        assert!(err.source().is_some());
    }
}
