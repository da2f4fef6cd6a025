//! Repeated parallel dispatch must not accumulate OS threads.
//!
//! Kept in its own test binary so that no other test starts threads while
//! the count is read.

#![cfg(all(feature = "parallel", target_os = "linux"))]

use std::time::{Duration, Instant};

use integrity::parallel::shared_pool_workers;
use integrity::{DigestWidth, Tier, hash_parallel};
use test_support::{concat_blocks, random_blocks};

fn thread_count() -> usize {
    let status = std::fs::read_to_string("/proc/self/status").unwrap();
    status
        .lines()
        .find_map(|line| line.strip_prefix("Threads:"))
        .and_then(|value| value.trim().parse().ok())
        .unwrap()
}

/// Waits for replaced pools to finish stopping their threads.
fn settled_thread_count(limit: usize) -> usize {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let count = thread_count();
        if count <= limit || Instant::now() >= deadline {
            return count;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn thread_count_stays_bounded_across_requests() {
    let before = thread_count();
    let blocks = concat_blocks(&random_blocks(3, 42));
    let mut out = vec![0u8; 3 * 32];

    for threads in (1..=40).chain([2000, 2000, 7]) {
        let summary =
            hash_parallel(Tier::Unrolled, &blocks, &mut out, threads, DigestWidth::Bits256)
                .unwrap();
        assert_eq!(summary.workers, threads.min(3), "{threads} threads");
        assert!(!summary.degraded);
    }

    assert_eq!(shared_pool_workers(), 3);
    let after = settled_thread_count(before + 3);
    assert!(
        after <= before + 3,
        "{after} threads alive, started with {before}"
    );
}
