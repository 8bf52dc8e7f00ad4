//! Integration tests for resilience module
//!
//! Drives a hand-written retry loop with a backoff strategy the way callers
//! in other crates do, under paused Tokio time.

#![cfg(feature = "foundation")]

use std::time::Duration;

use authkit_common::resilience::BackoffStrategy;
use authkit_common::time::{Clock, MockClock};
use tokio::time::Instant;

/// Validates that a capped doubling strategy produces the expected sleep
/// schedule inside a counted retry loop.
///
/// # Test Steps
/// 1. Build a 1s doubling strategy capped at 30s
/// 2. Run a loop that fails every attempt and sleeps between retries
/// 3. Record the virtual time elapsed for each sleep
/// 4. Confirm the recorded delays are 2s, 4s, 8s
#[tokio::test(start_paused = true)]
async fn test_counted_retry_loop_follows_doubling_schedule() {
    let strategy = BackoffStrategy::doubling(Duration::from_secs(1), Duration::from_secs(30));
    let max_retries = 3;
    let mut retries = 0;
    let mut observed = Vec::new();

    // Every attempt fails.
    loop {
        retries += 1;
        if retries > max_retries {
            break;
        }
        let started = Instant::now();
        tokio::time::sleep(strategy.calculate_delay(retries)).await;
        observed.push(started.elapsed());
    }

    assert_eq!(
        observed,
        vec![Duration::from_secs(2), Duration::from_secs(4), Duration::from_secs(8)]
    );
}

/// Validates that the cap holds for large attempt numbers.
#[test]
fn test_backoff_cap_applies_to_large_attempts() {
    let strategy = BackoffStrategy::doubling(Duration::from_secs(1), Duration::from_secs(30));
    for attempt in 5..64 {
        assert_eq!(strategy.calculate_delay(attempt), Duration::from_secs(30));
    }
}

/// Validates that a mock clock only moves when told to.
#[test]
fn test_mock_clock_is_frozen_between_advances() {
    let clock = MockClock::at_unix_secs(1_700_000_000);
    let first = clock.unix_secs();
    std::thread::sleep(Duration::from_millis(5));
    assert_eq!(clock.unix_secs(), first);

    clock.advance(Duration::from_secs(90));
    assert_eq!(clock.unix_secs(), first + 90);
}
