// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the per-model circuit breaker.

use std::sync::Arc;

use steer_resilience::{CircuitState, HealthTracker, FAILURE_THRESHOLD};
use tracing_test::traced_test;

#[test]
#[traced_test]
fn opening_the_circuit_is_logged() {
    let tracker = HealthTracker::new(["zai/glm-4.7-flash"]);
    for _ in 0..FAILURE_THRESHOLD {
        tracker.record_failure("zai/glm-4.7-flash");
    }
    assert!(tracker.is_unhealthy("zai/glm-4.7-flash"));
    assert!(logs_contain("circuit opened"));
}

#[test]
fn concurrent_failures_are_not_lost() {
    let tracker = Arc::new(HealthTracker::new(["a"]));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    tracker.record_failure("a");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let health = tracker.health("a").unwrap();
    assert_eq!(health.consecutive_failures, 400);
    assert_eq!(health.state(), CircuitState::Open);
}

#[test]
fn exactly_one_probe_ticket_under_contention() {
    let tracker = Arc::new(HealthTracker::new(["a"]));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                (0..10)
                    .filter(|_| tracker.record_failure("a").probe.is_some())
                    .count()
            })
        })
        .collect();
    let tickets: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(tickets, 1);
}

#[test]
fn snapshot_serializes_state_fields() {
    let tracker = HealthTracker::new(["b", "a"]);
    tracker.record_failure("a");

    let snapshot = tracker.snapshot();
    let ids: Vec<&String> = snapshot.keys().collect();
    assert_eq!(ids, ["a", "b"]);

    let json = serde_json::to_value(&snapshot["a"]).unwrap();
    assert_eq!(json["consecutive_failures"], 1);
    assert_eq!(json["is_unhealthy"], false);
    assert_eq!(json["probe_scheduled"], false);
    assert!(json.get("probe_generation").is_none());
}
