//! Tamper-evident governance ledger.
//!
//! The ledger is an append-only, hash-chained sequence of governance events.
//! Each entry's `hash` covers every field except itself, and each entry's
//! `prev_hash` pins the preceding entry's `hash` (the first entry pins the
//! all-zero genesis sentinel). Verification recomputes the whole chain and
//! reports every violation found; it never mutates the ledger and never stops
//! at the first failure.

use crate::core::digest::{self, GENESIS_HASH};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One governance event in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    /// Zero-based position; must equal the entry's index in the ledger.
    pub sequence: u64,
    /// Event kind tag (e.g. `decision.recorded`, `waiver.granted`).
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Event-specific data; arbitrary JSON.
    pub payload: Value,
    /// ISO-8601 timestamp; non-decreasing across the ledger.
    pub timestamp: String,
    /// Human or agent that produced the entry.
    pub actor_id: String,
    /// Hex digest of the preceding entry's `hash`, or the genesis sentinel.
    pub prev_hash: String,
    /// Digest over the hashable projection; never covers itself.
    pub hash: String,
}

impl LedgerEntry {
    /// The fields covered by `hash`, in canonical form.
    pub fn hashable_projection(&self) -> Value {
        json!({
            "sequence": self.sequence,
            "type": self.entry_type,
            "payload": self.payload,
            "timestamp": self.timestamp,
            "actor_id": self.actor_id,
            "prev_hash": self.prev_hash,
        })
    }

    /// Recompute the digest this entry should carry.
    pub fn compute_hash(&self) -> String {
        digest::hash_value(&self.hashable_projection())
    }

    /// Build a correctly chained entry. The single construction path writers
    /// should use; `hash` is derived, never supplied.
    pub fn chained(
        sequence: u64,
        entry_type: &str,
        payload: Value,
        timestamp: &str,
        actor_id: &str,
        prev_hash: &str,
    ) -> Self {
        let mut entry = LedgerEntry {
            sequence,
            entry_type: entry_type.to_string(),
            payload,
            timestamp: timestamp.to_string(),
            actor_id: actor_id.to_string(),
            prev_hash: prev_hash.to_string(),
            hash: String::new(),
        };
        entry.hash = entry.compute_hash();
        entry
    }
}

/// In-memory append-only ledger writer.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new event, chaining it to the current head.
    pub fn append(
        &mut self,
        entry_type: &str,
        payload: Value,
        actor_id: &str,
        timestamp: &str,
    ) -> &LedgerEntry {
        let prev_hash = self
            .entries
            .last()
            .map(|e| e.hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());
        let entry = LedgerEntry::chained(
            self.entries.len() as u64,
            entry_type,
            payload,
            timestamp,
            actor_id,
            &prev_hash,
        );
        self.entries.push(entry);
        self.entries.last().expect("entry just pushed")
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which chain invariant a check exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainCheck {
    Sequence,
    ChainLink,
    SelfHash,
    Timestamp,
}

/// One failed invariant at one entry.
#[derive(Debug, Clone, Serialize)]
pub struct ChainFailure {
    pub check: ChainCheck,
    pub expected: String,
    pub actual: String,
    pub reason: String,
}

/// Per-entry verification outcome.
#[derive(Debug, Clone, Serialize)]
pub struct EntryDiagnostic {
    pub index: usize,
    pub status: String,
    pub failures: Vec<ChainFailure>,
}

/// Whole-chain verification report.
#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub valid: bool,
    pub entries: usize,
    pub results: Vec<EntryDiagnostic>,
}

/// Verify an ordered ledger. An empty ledger is vacuously valid. Every
/// failing check across every entry is reported; a single failure anywhere
/// makes the overall report invalid.
pub fn verify_chain(entries: &[LedgerEntry]) -> ChainReport {
    let mut results = Vec::with_capacity(entries.len());
    let mut valid = true;

    for (i, entry) in entries.iter().enumerate() {
        let mut failures = Vec::new();

        if entry.sequence != i as u64 {
            failures.push(ChainFailure {
                check: ChainCheck::Sequence,
                expected: i.to_string(),
                actual: entry.sequence.to_string(),
                reason: "sequence does not match ledger position".to_string(),
            });
        }

        let expected_prev = if i == 0 {
            GENESIS_HASH
        } else {
            entries[i - 1].hash.as_str()
        };
        if entry.prev_hash != expected_prev {
            failures.push(ChainFailure {
                check: ChainCheck::ChainLink,
                expected: expected_prev.to_string(),
                actual: entry.prev_hash.clone(),
                reason: if i == 0 {
                    "first entry must chain to the genesis sentinel".to_string()
                } else {
                    "prev_hash does not match preceding entry hash".to_string()
                },
            });
        }

        let recomputed = entry.compute_hash();
        if entry.hash != recomputed {
            failures.push(ChainFailure {
                check: ChainCheck::SelfHash,
                expected: recomputed,
                actual: entry.hash.clone(),
                reason: "stored hash does not match recomputed digest".to_string(),
            });
        }

        // ISO-8601 with fixed-width fields sorts lexicographically the same
        // as chronologically, so string comparison is sufficient here.
        if i > 0 && entry.timestamp < entries[i - 1].timestamp {
            failures.push(ChainFailure {
                check: ChainCheck::Timestamp,
                expected: format!(">= {}", entries[i - 1].timestamp),
                actual: entry.timestamp.clone(),
                reason: "timestamp decreased relative to preceding entry".to_string(),
            });
        }

        if !failures.is_empty() {
            valid = false;
        }
        results.push(EntryDiagnostic {
            index: i,
            status: if failures.is_empty() {
                "pass".to_string()
            } else {
                "fail".to_string()
            },
            failures,
        });
    }

    ChainReport {
        valid,
        entries: entries.len(),
        results,
    }
}
