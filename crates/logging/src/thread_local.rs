//! crates/logging/src/thread_local.rs
//! Thread-local storage for verbosity configuration and event collection.

use super::config::VerbosityConfig;
use super::levels::DebugFlag;
use std::cell::RefCell;

thread_local! {
    static VERBOSITY: RefCell<VerbosityConfig> = RefCell::new(VerbosityConfig::default());
    #[allow(clippy::missing_const_for_thread_local)]
    static EVENTS: RefCell<Vec<DiagnosticEvent>> = RefCell::new(Vec::new());
}

/// Diagnostic event collected during execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticEvent {
    /// The debug flag category.
    pub flag: DebugFlag,
    /// The verbosity level.
    pub level: u8,
    /// The diagnostic message.
    pub message: String,
}

/// Initialize verbosity configuration for the current thread.
pub fn init(config: VerbosityConfig) {
    VERBOSITY.with(|v| {
        *v.borrow_mut() = config;
    });
}

/// Check if the debug flag is at or above the specified level.
pub fn debug_gte(flag: DebugFlag, level: u8) -> bool {
    VERBOSITY.with(|v| v.borrow().debug.get(flag) >= level)
}

/// Emit a debug diagnostic event.
pub fn emit_debug(flag: DebugFlag, level: u8, message: String) {
    EVENTS.with(|e| {
        e.borrow_mut().push(DiagnosticEvent {
            flag,
            level,
            message,
        });
    });
}

/// Drain all collected events, clearing the internal buffer.
pub fn drain_events() -> Vec<DiagnosticEvent> {
    EVENTS.with(|e| e.borrow_mut().drain(..).collect())
}

/// Apply a debug flag token to the current configuration.
pub fn apply_debug_flag(token: &str) -> Result<(), String> {
    VERBOSITY.with(|v| v.borrow_mut().apply_debug_flag(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_and_check() {
        let mut config = VerbosityConfig::default();
        config.debug.pool = 2;
        init(config);

        assert!(debug_gte(DebugFlag::Pool, 1));
        assert!(debug_gte(DebugFlag::Pool, 2));
        assert!(!debug_gte(DebugFlag::Pool, 3));
        assert!(!debug_gte(DebugFlag::Tier, 1));
    }

    #[test]
    fn emit_and_drain() {
        init(VerbosityConfig::default());
        let _ = drain_events();

        emit_debug(DebugFlag::Tier, 1, "selected unrolled".to_string());
        emit_debug(DebugFlag::Pool, 2, "4 workers".to_string());

        let events = drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].flag, DebugFlag::Tier);
        assert_eq!(events[1].message, "4 workers");
        assert!(drain_events().is_empty());
    }

    #[test]
    fn apply_token_updates_current_thread_only() {
        init(VerbosityConfig::default());
        apply_debug_flag("staging3").unwrap();
        assert!(debug_gte(DebugFlag::Staging, 3));

        let other = std::thread::spawn(|| debug_gte(DebugFlag::Staging, 1))
            .join()
            .unwrap();
        assert!(!other);
    }
}
