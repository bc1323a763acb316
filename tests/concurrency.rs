//! Many callers hammering one throttle from separate threads.

use adaptive_throttle::infrastructure::mocks::{FixedSample, MockClock};
use adaptive_throttle::{AttemptError, Clock, Outcome, RollingWindow, Throttle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

const THREADS: usize = 16;
const ATTEMPTS_PER_THREAD: usize = 2_000;

#[test]
fn test_concurrent_attempts_keep_counts_consistent() {
    let throttle = Throttle::new();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let throttle = throttle.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ATTEMPTS_PER_THREAD {
                    let healthy = rand::random::<f64>() < 0.3;
                    let _: Result<(), AttemptError<()>> =
                        throttle.try_attempt(|| if healthy { Ok(()) } else { Err(()) });
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Nothing can expire within the test, so the window holds every outcome
    let counts = throttle.refresh();
    let metrics = throttle.metrics().snapshot();
    let total = (THREADS * ATTEMPTS_PER_THREAD) as u64;

    assert_eq!(metrics.total_attempts(), total);
    assert_eq!(counts.total(), total);
    assert_eq!(counts.successes, metrics.operations_succeeded);
    assert_eq!(
        counts.failures,
        metrics.operations_failed + metrics.attempts_rejected
    );
    assert!(metrics.attempts_rejected > 0);
}

#[test]
fn test_concurrent_drains_never_wrap() {
    let clock = MockClock::new(Instant::now());
    let window = Arc::new(RollingWindow::new());
    let done = Arc::new(AtomicBool::new(false));
    let recorded = (THREADS * ATTEMPTS_PER_THREAD) as u64;

    let writers: Vec<_> = (0..THREADS)
        .map(|i| {
            let window = Arc::clone(&window);
            let clock = clock.clone();
            thread::spawn(move || {
                for j in 0..ATTEMPTS_PER_THREAD {
                    let outcome = if (i + j) % 3 == 0 {
                        Outcome::Success
                    } else {
                        Outcome::Failure
                    };
                    window.record(outcome, clock.now());
                    if j % 100 == 0 {
                        clock.advance(Duration::from_secs(1));
                    }
                }
            })
        })
        .collect();

    let reader = {
        let window = Arc::clone(&window);
        let clock = clock.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                let counts = window.drain_expired(clock.now());
                // A counter that went below zero would wrap to a huge value
                assert!(counts.successes <= recorded);
                assert!(counts.failures <= recorded);
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::Release);
    reader.join().unwrap();

    // Past every expiry: the window must be exactly empty
    clock.advance(Duration::from_secs(61));
    let counts = window.drain_expired(clock.now());
    assert_eq!(counts.total(), 0);
    assert!(window.is_empty());
}

#[test]
fn test_shared_throttle_across_threads_with_mock_time() {
    let clock = MockClock::new(Instant::now());
    let throttle = Throttle::builder()
        .with_overhead(1.0)
        .with_clock(Arc::new(clock.clone()))
        .with_random_source(Arc::new(FixedSample::new(1.0)))
        .build()
        .unwrap();

    // One failure closes the gate for everyone
    let _: Result<(), AttemptError<()>> = throttle.try_attempt(|| Err(()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let throttle = throttle.clone();
            thread::spawn(move || (0..50).filter(|_| throttle.run(|| ()).is_err()).count())
        })
        .collect();
    let rejected: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(rejected, 400);
    assert_eq!(throttle.live_counts().failures, 401);

    clock.advance(Duration::from_secs(60));
    assert_eq!(throttle.refresh().total(), 0);
    assert_eq!(throttle.run(|| "recovered"), Ok("recovered"));
}
