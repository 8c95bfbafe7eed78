//! Canonical JSON encoding.
//!
//! Every hash and signature in Provenant is computed over the output of this
//! module and nothing else. Two bundles that are deeply equal under
//! key-order-independent comparison must canonicalize to identical bytes, so
//! digests recomputed on another machine (or in another language) match
//! bit-for-bit.
//!
//! Rules:
//! - Object keys are sorted ascending by byte value before encoding.
//! - Array order is preserved (array order is significant).
//! - No whitespace anywhere.
//! - Scalars render in their standard JSON textual form.

use serde_json::Value;

/// Encode a JSON value into its canonical textual form.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// Canonical encoding as UTF-8 bytes, the direct input to hashing and signing.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    canonical_json(value).into_bytes()
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        // serde_json's Display for Number matches JSON's textual form.
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&escape_string(s)),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&escape_string(key));
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
    }
}

fn escape_string(s: &str) -> String {
    // Reuse serde_json's JSON string escaping rather than hand-rolling it.
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}
