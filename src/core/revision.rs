//! Optimistic concurrency control for multi-agent artifact writes.
//!
//! Revisions are advisory lost-update prevention, not durable state: each
//! `(project, artifact)` pair carries a counter starting at 0, and a write is
//! admitted only when the writer presents the counter it last read. A losing
//! writer gets the actual current revision back and is expected to re-read
//! and retry; nothing blocks.
//!
//! The tracker is an owned state object. The hosting service decides its
//! lifecycle (one per process, one per test); there are no global singletons.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Result of a compare-and-increment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdvanceOutcome {
    pub ok: bool,
    /// The revision after the call: the new value on success, the actual
    /// current value on a stale-expectation rejection.
    pub current_revision: u64,
}

/// Per-project, per-artifact optimistic-lock revision counters.
#[derive(Debug, Default)]
pub struct RevisionTracker {
    // project -> artifact -> revision. One lock covers the whole table; every
    // operation is a map lookup plus at most one write, so there is no
    // contention worth sharding for.
    revisions: Mutex<HashMap<String, HashMap<String, u64>>>,
}

impl RevisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, HashMap<String, u64>>> {
        // The table holds plain integers; a panic mid-operation cannot leave
        // it torn, so a poisoned lock is recoverable.
        self.revisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Current revision for an artifact; 0 if never written.
    pub fn current_revision(&self, project_id: &str, artifact_id: &str) -> u64 {
        self.lock()
            .get(project_id)
            .and_then(|artifacts| artifacts.get(artifact_id))
            .copied()
            .unwrap_or(0)
    }

    /// Snapshot of every tracked artifact revision in a project.
    pub fn all_revisions(&self, project_id: &str) -> HashMap<String, u64> {
        self.lock().get(project_id).cloned().unwrap_or_default()
    }

    /// Compare-and-increment. Succeeds and bumps the revision only when
    /// `expected_revision` matches the tracked value; otherwise rejects and
    /// reports the actual current revision. The read/compare/write sequence
    /// runs under one lock acquisition, so two callers presenting the same
    /// expected revision cannot both win.
    pub fn try_advance(
        &self,
        project_id: &str,
        artifact_id: &str,
        expected_revision: u64,
    ) -> AdvanceOutcome {
        let mut revisions = self.lock();
        let current = revisions
            .entry(project_id.to_string())
            .or_default()
            .entry(artifact_id.to_string())
            .or_insert(0);

        if *current == expected_revision {
            *current += 1;
            AdvanceOutcome {
                ok: true,
                current_revision: *current,
            }
        } else {
            AdvanceOutcome {
                ok: false,
                current_revision: *current,
            }
        }
    }

    /// Discard all revision state for a project (e.g. on project reload).
    pub fn reset(&self, project_id: &str) {
        self.lock().remove(project_id);
    }
}
