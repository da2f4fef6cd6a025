#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` carries the diagnostics plumbing shared by the workspace: a
//! small set of [`DebugFlag`] categories, per-flag verbosity levels, and a
//! tracing-subscriber [`FoldLayer`] that turns `foldsm3::*` tracing events
//! into [`DiagnosticEvent`] records.
//!
//! # Design
//!
//! Library code never talks to a subscriber directly. It emits events through
//! [`trace_tier!`], [`trace_batch!`], [`trace_staging!`] and [`trace_pool!`],
//! each of which pins the tracing target for one flag. Binaries and tests
//! decide what is recorded by installing [`FoldLayer`] with a
//! [`VerbosityConfig`], usually through [`init_tracing`].
//!
//! Accepted events are buffered per thread and read back with
//! [`drain_events`], which is what the tests in this workspace assert on.
//!
//! # Examples
//!
//! ```
//! use logging::{DebugFlag, FoldLayer, VerbosityConfig, drain_events, trace_pool};
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let mut config = VerbosityConfig::default();
//! config.apply_debug_flag("pool2").unwrap();
//!
//! let subscriber = tracing_subscriber::registry().with(FoldLayer::new(config));
//! tracing::subscriber::with_default(subscriber, || {
//!     trace_pool!(workers = 2, "pool started");
//! });
//!
//! let events = drain_events();
//! assert_eq!(events[0].flag, DebugFlag::Pool);
//! ```

mod config;
mod levels;
mod thread_local;
mod tracing_bridge;
mod tracing_macros;

#[doc(hidden)]
pub use tracing;

pub use config::VerbosityConfig;
pub use levels::{DebugFlag, DebugLevels};
pub use thread_local::{
    DiagnosticEvent, apply_debug_flag, debug_gte, drain_events, emit_debug, init,
};
pub use tracing_bridge::{FoldLayer, init_tracing, try_init_tracing};
