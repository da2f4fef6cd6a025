#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `foldsm3` is the front door of the workspace. It re-exports the digest
//! API of the `integrity` crate and wires up the `logging` crate so that an
//! application needs a single dependency.
//!
//! The digest reduces a 4096-byte block to 64 bytes with a 64-lane XOR fold
//! and hashes the result with SM3. See [`Tier`] for the available
//! realizations and [`PipelineConfig`] for environment-driven dispatch.
//!
//! # Examples
//!
//! ```
//! let blocks = vec![0u8; 4096 * 4];
//! let mut digests = vec![0u8; 32 * 4];
//!
//! let config = foldsm3::PipelineConfig::default().with_threads(2);
//! let summary = config.run(&blocks, &mut digests)?;
//! assert_eq!(summary.blocks, 4);
//! assert_eq!(digests[..32], foldsm3::hash256(&[0u8; 4096]));
//! # Ok::<(), foldsm3::IntegrityError>(())
//! ```

pub use integrity::*;

/// Debug flags, trace macros and the tracing-subscriber bridge.
pub use logging;

use logging::{VerbosityConfig, trace_batch};
use tracing_subscriber::util::TryInitError;

/// Installs the global diagnostics subscriber at `-v` level `verbose`.
///
/// Level 1 records tier selection, 2 adds worker-pool activity and 3 adds
/// per-batch and staging events. `RUST_LOG` controls what is printed to
/// stderr independently.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(verbose: u8) -> Result<(), TryInitError> {
    logging::try_init_tracing(VerbosityConfig::from_verbose_level(verbose))
}

/// Hashes a flat buffer of blocks with the configuration found in the
/// `FOLDSM3_*` environment variables.
///
/// # Errors
///
/// Returns the configuration error of a malformed variable, or
/// [`IntegrityError::BufferLength`] or [`IntegrityError::OutputLength`] when
/// a buffer has the wrong length.
pub fn run_from_env(blocks: &[u8], out: &mut [u8]) -> Result<RunSummary, IntegrityError> {
    let config = PipelineConfig::from_env()?;
    let summary = config.run(blocks, out)?;
    trace_batch!(
        tier = summary.tier.name(),
        threads = config.threads,
        blocks = summary.blocks,
        "environment run complete"
    );
    Ok(summary)
}
