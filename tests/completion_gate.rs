// tests/completion_gate.rs

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use initiator::engine::{CompletionGate, WaitOutcome};

#[test]
fn zero_count_completes_immediately() {
    let gate = CompletionGate::new(0);
    let started = Instant::now();

    assert_eq!(gate.wait_timeout(Duration::from_secs(5)), WaitOutcome::Completed);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn decrement_saturates_at_zero() {
    let gate = CompletionGate::new(2);

    assert_eq!(gate.decrement(), 1);
    assert_eq!(gate.decrement(), 0);
    assert_eq!(gate.decrement(), 0);
    assert_eq!(gate.count(), 0);
}

#[test]
fn concurrent_decrements_release_the_waiter() {
    let gate = Arc::new(CompletionGate::new(8));

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(5 * i));
                gate.decrement();
            })
        })
        .collect();

    let outcome = gate.wait_timeout(Duration::from_secs(5));
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(outcome, WaitOutcome::Completed);
    assert_eq!(gate.count(), 0);
}

#[test]
fn timeout_reports_remaining_and_respects_the_bound() {
    let gate = CompletionGate::new(3);
    gate.decrement();

    let timeout = Duration::from_millis(150);
    let started = Instant::now();
    let outcome = gate.wait_timeout(timeout);
    let elapsed = started.elapsed();

    assert_eq!(outcome, WaitOutcome::TimedOut { remaining: 2 });
    assert!(elapsed >= timeout, "returned early after {elapsed:?}");
    assert!(
        elapsed < timeout + Duration::from_millis(500),
        "returned late after {elapsed:?}"
    );
}

#[test]
fn late_decrement_after_timeout_does_not_go_negative() {
    let gate = CompletionGate::new(1);
    assert!(!gate.wait_timeout(Duration::from_millis(10)).is_completed());

    gate.decrement();
    gate.decrement();
    assert_eq!(gate.count(), 0);
    assert!(gate.wait_timeout(Duration::from_millis(10)).is_completed());
}

#[test]
fn unbounded_timeout_waits_without_a_deadline() {
    let gate = Arc::new(CompletionGate::new(1));

    let worker = {
        let gate = Arc::clone(&gate);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            gate.decrement();
        })
    };

    assert_eq!(gate.wait_timeout(Duration::MAX), WaitOutcome::Completed);
    worker.join().unwrap();
}

#[test]
fn unbounded_timeout_with_zero_count_returns_at_once() {
    let gate = CompletionGate::new(0);
    assert_eq!(gate.wait_timeout(Duration::MAX), WaitOutcome::Completed);
}

#[test]
fn interrupt_releases_a_waiter_with_the_remaining_count() {
    let gate = Arc::new(CompletionGate::new(2));

    let worker = {
        let gate = Arc::clone(&gate);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            gate.interrupt();
        })
    };

    let started = Instant::now();
    let outcome = gate.wait_timeout(Duration::MAX);
    worker.join().unwrap();

    assert_eq!(outcome, WaitOutcome::Interrupted { remaining: 2 });
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn interrupt_before_waiting_is_not_lost() {
    let gate = CompletionGate::new(1);
    gate.interrupt();

    assert_eq!(
        gate.wait_timeout(Duration::from_secs(5)),
        WaitOutcome::Interrupted { remaining: 1 }
    );

    gate.decrement();
    assert_eq!(gate.wait_timeout(Duration::from_secs(5)), WaitOutcome::Completed);
}
