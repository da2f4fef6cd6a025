//! crates/logging/src/tracing_bridge.rs
//! Bridge between the tracing crate and the debug flag system.
//!
//! [`FoldLayer`] is a tracing-subscriber layer that maps events emitted under
//! the `foldsm3::*` targets to a [`DebugFlag`], compares the event level with
//! the configured flag level and records accepted events as
//! [`DiagnosticEvent`](crate::DiagnosticEvent)s in the emitting thread's
//! buffer. [`init_tracing`] installs the layer next to a stderr formatter
//! filtered by `RUST_LOG`.
//!
//! ```rust,ignore
//! use logging::{VerbosityConfig, init_tracing};
//!
//! init_tracing(VerbosityConfig::from_verbose_level(2));
//! tracing::debug!(target: "foldsm3::pool", "started 4 workers");
//! ```

use super::config::VerbosityConfig;
use super::levels::DebugFlag;
use super::thread_local::emit_debug;
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::EnvFilter;

/// Default `RUST_LOG` directive when the variable is unset.
const DEFAULT_DIRECTIVE: &str = "warn";

/// A tracing layer that records `foldsm3::*` events according to the
/// configured debug flag levels.
pub struct FoldLayer {
    config: VerbosityConfig,
}

impl FoldLayer {
    /// Create a new layer with the given verbosity configuration.
    #[must_use]
    pub const fn new(config: VerbosityConfig) -> Self {
        Self { config }
    }

    /// Verbosity configuration this layer filters with.
    #[must_use]
    pub const fn config(&self) -> &VerbosityConfig {
        &self.config
    }

    /// Map a tracing target to a debug flag.
    fn target_to_debug_flag(target: &str) -> Option<DebugFlag> {
        let (root, rest) = target.split_once("::")?;
        if root != "foldsm3" {
            return None;
        }
        let leaf = rest.split("::").next().unwrap_or(rest);
        DebugFlag::from_name(leaf)
    }

    /// Map a tracing level to a verbosity level.
    const fn level_to_verbosity_level(level: &Level) -> u8 {
        match *level {
            Level::ERROR | Level::WARN | Level::INFO => 1,
            Level::DEBUG => 2,
            Level::TRACE => 3,
        }
    }
}

impl<S> Layer<S> for FoldLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let Some(flag) = Self::target_to_debug_flag(metadata.target()) else {
            return;
        };
        let level = Self::level_to_verbosity_level(metadata.level());
        if self.config.debug.get(flag) < level {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(message) = visitor.finish() {
            emit_debug(flag, level, message);
        }
    }
}

/// Collects the `message` field plus any structured fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> Option<String> {
        let mut message = self.message?;
        for field in self.fields {
            message.push(' ');
            message.push_str(&field);
        }
        Some(message)
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install [`FoldLayer`] and a stderr formatter as the global subscriber.
///
/// Also stores `config` as the calling thread's verbosity so that
/// [`crate::debug_log!`] agrees with the layer.
///
/// # Panics
///
/// Panics if a global subscriber is already installed. Use
/// [`try_init_tracing`] when that can happen.
pub fn init_tracing(config: VerbosityConfig) {
    if let Err(err) = try_init_tracing(config) {
        panic!("failed to install tracing subscriber: {err}");
    }
}

/// Fallible variant of [`init_tracing`].
pub fn try_init_tracing(config: VerbosityConfig) -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    super::thread_local::init(config.clone());

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(FoldLayer::new(config))
        .with(fmt)
        .try_init()
}
