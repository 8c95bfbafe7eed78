use provenant::core::heartbeat::{DEFAULT_STALE_THRESHOLD_MS, HeartbeatTracker};
use provenant::core::revision::RevisionTracker;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn revision_cas_first_writer_wins() {
    let tracker = RevisionTracker::new();
    assert_eq!(tracker.current_revision("p1", "doc"), 0);

    let win = tracker.try_advance("p1", "doc", 0);
    assert!(win.ok);
    assert_eq!(win.current_revision, 1);

    // Second writer raced on the same expected revision and must lose.
    let lose = tracker.try_advance("p1", "doc", 0);
    assert!(!lose.ok);
    assert_eq!(lose.current_revision, 1);

    // After re-reading the current revision, the retry succeeds.
    let retry = tracker.try_advance("p1", "doc", lose.current_revision);
    assert!(retry.ok);
    assert_eq!(retry.current_revision, 2);
}

#[test]
fn revision_keys_are_independent() {
    let tracker = RevisionTracker::new();
    tracker.try_advance("p1", "a", 0);
    tracker.try_advance("p1", "b", 0);
    tracker.try_advance("p2", "a", 0);
    tracker.try_advance("p1", "a", 1);

    assert_eq!(tracker.current_revision("p1", "a"), 2);
    assert_eq!(tracker.current_revision("p1", "b"), 1);
    assert_eq!(tracker.current_revision("p2", "a"), 1);

    let all = tracker.all_revisions("p1");
    assert_eq!(all.len(), 2);
    assert_eq!(all["a"], 2);
    assert_eq!(all["b"], 1);
}

#[test]
fn concurrent_cas_admits_exactly_one_winner() {
    let tracker = Arc::new(RevisionTracker::new());
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                tracker.try_advance("p1", "doc", 0)
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread completes"))
        .collect();

    let winners = outcomes.iter().filter(|o| o.ok).count();
    assert_eq!(winners, 1);
    assert!(outcomes.iter().all(|o| o.current_revision == 1));
    assert_eq!(tracker.current_revision("p1", "doc"), 1);
}

#[test]
fn concurrent_retry_loops_serialize_cleanly() {
    let tracker = Arc::new(RevisionTracker::new());
    let threads = 4;
    let advances_each = 25;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..advances_each {
                    // Advisory protocol: re-read and retry on conflict.
                    loop {
                        let expected = tracker.current_revision("p1", "doc");
                        if tracker.try_advance("p1", "doc", expected).ok {
                            break;
                        }
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread completes");
    }

    assert_eq!(
        tracker.current_revision("p1", "doc"),
        (threads * advances_each) as u64
    );
}

#[test]
fn reset_is_scoped_to_one_project() {
    let tracker = RevisionTracker::new();
    tracker.try_advance("p1", "a", 0);
    tracker.try_advance("p2", "a", 0);
    tracker.reset("p1");
    assert!(tracker.all_revisions("p1").is_empty());
    assert_eq!(tracker.current_revision("p2", "a"), 1);
}

#[test]
fn heartbeat_staleness_threshold_boundary() {
    let tracker = HeartbeatTracker::new();
    let t = 1_000_000;
    tracker.record_at("p1", "agent-a", t);

    assert!(
        tracker
            .find_stale_at("p1", DEFAULT_STALE_THRESHOLD_MS, t + DEFAULT_STALE_THRESHOLD_MS - 1)
            .is_empty()
    );
    assert_eq!(
        tracker.find_stale_at("p1", DEFAULT_STALE_THRESHOLD_MS, t + DEFAULT_STALE_THRESHOLD_MS + 1),
        vec!["agent-a".to_string()]
    );
}

#[test]
fn heartbeat_overwrite_refreshes_liveness() {
    let tracker = HeartbeatTracker::new();
    tracker.record_at("p1", "agent-a", 1_000);
    tracker.record_at("p1", "agent-b", 1_000);
    // agent-a reconnects much later; only agent-b goes stale.
    tracker.record_at("p1", "agent-a", 200_000);

    let stale = tracker.find_stale_at("p1", DEFAULT_STALE_THRESHOLD_MS, 200_500);
    assert_eq!(stale, vec!["agent-b".to_string()]);

    let all = tracker.all_heartbeats("p1");
    assert_eq!(all.len(), 2);
    assert_eq!(all["agent-a"], 200_000);
    assert_eq!(all["agent-b"], 1_000);
}

#[test]
fn heartbeat_record_reports_distinct_agent_count() {
    let tracker = HeartbeatTracker::new();
    assert_eq!(tracker.record_at("p1", "a", 1).agent_count, 1);
    assert_eq!(tracker.record_at("p1", "b", 2).agent_count, 2);
    assert_eq!(tracker.record_at("p1", "a", 3).agent_count, 2);
    assert_eq!(tracker.record_at("p2", "a", 4).agent_count, 1);
}

#[test]
fn live_record_is_not_immediately_stale() {
    let tracker = HeartbeatTracker::new();
    let ack = tracker.record("p1", "agent-a");
    assert!(ack.last_heartbeat_ms > 0);
    assert!(tracker.find_stale("p1", DEFAULT_STALE_THRESHOLD_MS).is_empty());
}
