//! Integration tests for routing pipeline trace macros through `FoldLayer`.

use logging::{
    DebugFlag, FoldLayer, VerbosityConfig, debug_log, drain_events, init, trace_batch,
    trace_pool, trace_staging, trace_tier,
};
use tracing_subscriber::layer::SubscriberExt;

fn record_with(config: VerbosityConfig, body: impl FnOnce()) -> Vec<logging::DiagnosticEvent> {
    let _ = drain_events();
    let subscriber = tracing_subscriber::registry().with(FoldLayer::new(config));
    tracing::subscriber::with_default(subscriber, body);
    drain_events()
}

fn emit_one_of_each() {
    trace_tier!(tier = "unrolled", "selected default tier");
    trace_pool!(workers = 4, "pool started");
    trace_batch!(blocks = 8, "batch complete");
    trace_staging!(staged = 1, "staged misaligned inputs");
}

#[test]
fn verbose_zero_records_nothing() {
    let events = record_with(VerbosityConfig::from_verbose_level(0), emit_one_of_each);
    assert!(events.is_empty());
}

#[test]
fn verbose_one_records_tier_selection_only() {
    // trace_pool! is a debug-level event and needs pool >= 2.
    let events = record_with(VerbosityConfig::from_verbose_level(1), emit_one_of_each);
    let flags: Vec<_> = events.iter().map(|e| e.flag).collect();
    assert_eq!(flags, vec![DebugFlag::Tier]);
}

#[test]
fn verbose_three_records_everything_in_order() {
    let events = record_with(VerbosityConfig::from_verbose_level(3), emit_one_of_each);
    let flags: Vec<_> = events.iter().map(|e| e.flag).collect();
    assert_eq!(
        flags,
        vec![
            DebugFlag::Tier,
            DebugFlag::Pool,
            DebugFlag::Batch,
            DebugFlag::Staging
        ]
    );
    assert_eq!(events[2].message, "batch complete blocks=8");
}

#[test]
fn single_flag_token_enables_one_category() {
    let mut config = VerbosityConfig::default();
    config.apply_debug_flag("staging3").unwrap();
    let events = record_with(config, emit_one_of_each);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].flag, DebugFlag::Staging);
    assert_eq!(events[0].level, 3);
}

#[test]
fn warnings_on_pool_target_are_level_one() {
    let mut config = VerbosityConfig::default();
    config.apply_debug_flag("pool1").unwrap();
    let events = record_with(config, || {
        tracing::warn!(target: "foldsm3::pool", "falling back to sequential dispatch");
        trace_pool!("not recorded at level one");
    });
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, 1);
}

#[test]
fn debug_log_uses_thread_verbosity() {
    let mut config = VerbosityConfig::default();
    config.debug.batch = 1;
    init(config);
    let _ = drain_events();

    debug_log!(Batch, 1, "{} blocks", 3);
    debug_log!(Batch, 2, "suppressed");

    let events = drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message, "3 blocks");
}

#[cfg(feature = "serde")]
#[test]
fn config_serializes_to_json() {
    let config = VerbosityConfig::from_verbose_level(2);
    let json = serde_json::to_string(&config).unwrap();
    let back: VerbosityConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
