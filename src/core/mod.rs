//! Core verification and coordination primitives.
//!
//! Everything here is either a pure computation over an in-memory input
//! (canonical encoding, digests, chain/bundle/signature verification) or an
//! owned, lock-protected state object (revision and heartbeat trackers).

pub mod bundle;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod heartbeat;
pub mod ledger;
pub mod report;
pub mod revision;
pub mod signature;
pub mod time;
