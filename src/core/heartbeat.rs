//! Agent liveness tracking.
//!
//! Every agent contact overwrites the agent's last-seen timestamp for the
//! project; staleness is a pure query against those timestamps. Heartbeats
//! carry no ordering guarantee across agents and are never persisted.

use crate::core::time;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Default staleness threshold: one minute without contact.
pub const DEFAULT_STALE_THRESHOLD_MS: u64 = 60_000;

/// Acknowledgement returned for each recorded heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeartbeatAck {
    /// The just-stored timestamp, unix-epoch milliseconds.
    pub last_heartbeat_ms: u64,
    /// Distinct agents seen for the project so far.
    pub agent_count: usize,
}

/// Per-project, per-agent last-seen timestamps.
#[derive(Debug, Default)]
pub struct HeartbeatTracker {
    heartbeats: Mutex<HashMap<String, HashMap<String, u64>>>,
}

impl HeartbeatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, HashMap<String, u64>>> {
        self.heartbeats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a contact from an agent at the current wall-clock time.
    pub fn record(&self, project_id: &str, agent_id: &str) -> HeartbeatAck {
        self.record_at(project_id, agent_id, time::now_epoch_ms())
    }

    /// Record a contact at an explicit timestamp. Later writes simply replace
    /// earlier ones.
    pub fn record_at(&self, project_id: &str, agent_id: &str, now_ms: u64) -> HeartbeatAck {
        let mut heartbeats = self.lock();
        let project = heartbeats.entry(project_id.to_string()).or_default();
        project.insert(agent_id.to_string(), now_ms);
        HeartbeatAck {
            last_heartbeat_ms: now_ms,
            agent_count: project.len(),
        }
    }

    /// Snapshot of every agent's last heartbeat for a project.
    pub fn all_heartbeats(&self, project_id: &str) -> HashMap<String, u64> {
        self.lock().get(project_id).cloned().unwrap_or_default()
    }

    /// Agents whose last heartbeat is older than `stale_threshold_ms`.
    /// Pure query; nothing is evicted.
    pub fn find_stale(&self, project_id: &str, stale_threshold_ms: u64) -> Vec<String> {
        self.find_stale_at(project_id, stale_threshold_ms, time::now_epoch_ms())
    }

    /// Staleness relative to an explicit `now`.
    pub fn find_stale_at(
        &self,
        project_id: &str,
        stale_threshold_ms: u64,
        now_ms: u64,
    ) -> Vec<String> {
        let heartbeats = self.lock();
        let Some(project) = heartbeats.get(project_id) else {
            return Vec::new();
        };
        let mut stale: Vec<String> = project
            .iter()
            .filter(|&(_, &last)| now_ms.saturating_sub(last) > stale_threshold_ms)
            .map(|(agent, _)| agent.clone())
            .collect();
        stale.sort();
        stale
    }
}
