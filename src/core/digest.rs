//! SHA-256 digests over canonical bytes.

use crate::core::canonical;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hex length of a SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// `prev_hash` sentinel for the first ledger entry.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Lowercase hex SHA-256 of raw bytes.
pub fn sha256_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    format!("{:x}", hasher.finalize())
}

/// Digest of a JSON value's canonical encoding.
pub fn hash_value(value: &Value) -> String {
    sha256_hex(&canonical::canonical_bytes(value))
}
