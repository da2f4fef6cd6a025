//! The digest pipeline reports its activity through the logging crate.

use foldsm3::logging::{DebugFlag, DiagnosticEvent, FoldLayer, VerbosityConfig, drain_events};
use foldsm3::{Block, Digest256, MemoryOptions, Tier, hash_batch, hash_batch_staged};
use tracing_subscriber::layer::SubscriberExt;

fn record(config: VerbosityConfig, body: impl FnOnce()) -> Vec<DiagnosticEvent> {
    let _ = drain_events();
    let subscriber = tracing_subscriber::registry().with(FoldLayer::new(config));
    tracing::subscriber::with_default(subscriber, body);
    drain_events()
}

fn blocks(count: usize) -> Vec<Block> {
    (0..count)
        .map(|i| std::array::from_fn(|j| (i ^ (j >> 6)) as u8))
        .collect()
}

#[test]
fn batch_events_carry_their_fields() {
    let inputs = blocks(5);
    let mut out = vec![Digest256::default(); 5];
    let events = record(VerbosityConfig::from_verbose_level(3), || {
        hash_batch(Tier::Unrolled, &inputs, &mut out);
    });

    let batch: Vec<_> = events
        .iter()
        .filter(|e| e.flag == DebugFlag::Batch)
        .collect();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].message, "batch complete tier=unrolled blocks=5");
}

#[test]
fn staging_events_need_level_three() {
    let inputs = blocks(3);
    let mut out = vec![Digest256::default(); 3];

    let quiet = record(VerbosityConfig::from_verbose_level(2), || {
        hash_batch_staged(Tier::Reference, &inputs, &mut out, MemoryOptions::default());
    });
    assert!(quiet.iter().all(|e| e.flag != DebugFlag::Staging));

    let mut config = VerbosityConfig::default();
    config.apply_debug_flag("staging3").unwrap();
    let loud = record(config, || {
        hash_batch_staged(Tier::Reference, &inputs, &mut out, MemoryOptions::default());
    });
    assert_eq!(loud.len(), 1);
    assert_eq!(loud[0].flag, DebugFlag::Staging);
    assert!(loud[0].message.starts_with("staged batch complete"));
}

#[cfg(feature = "parallel")]
#[test]
fn pool_dispatch_logs_on_the_calling_thread() {
    let inputs = blocks(12);
    let mut out = vec![Digest256::default(); 12];
    let mut config = VerbosityConfig::default();
    config.apply_debug_flag("pool2").unwrap();

    let events = record(config, || {
        let pool = foldsm3::WorkerPool::new(3).unwrap();
        pool.hash_blocks(Tier::Vectorized, &inputs, &mut out);
        pool.shutdown();
    });

    let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
    assert!(messages.iter().any(|m| m.starts_with("worker pool started")), "{messages:?}");
    assert!(messages.iter().any(|m| m.starts_with("partition plan")), "{messages:?}");
    assert!(messages.iter().any(|m| m.starts_with("worker pool stopped")), "{messages:?}");
    assert!(events.iter().all(|e| e.flag == DebugFlag::Pool));
}
