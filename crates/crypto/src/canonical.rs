//! Canonical byte encoding for signed payloads.
//!
//! Signing and verification only agree if both sides serialize a payload to
//! the exact same bytes. This module produces a deterministic encoding of a
//! `serde_json::Value`: object keys sorted lexicographically, no whitespace,
//! stable string escaping and number rendering. The output is a pure
//! function of the field values, independent of field insertion order.

use serde_json::Value;
use std::collections::BTreeMap;

/// Produce the canonical byte encoding of a JSON value.
///
/// Two values with identical contents canonicalize to identical bytes
/// regardless of how their objects were constructed.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            // Sorted key order is the whole point of this encoding.
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            out.push(b'{');
            for (i, (key, item)) in sorted.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(key, out);
                out.push(b':');
                write_value(item, out);
            }
            out.push(b'}');
        }
    }
}

fn write_string(s: &str, out: &mut Vec<u8>) {
    // serde_json's escaping is deterministic for a given string value.
    let escaped = serde_json::to_string(s).unwrap_or_else(|_| String::from("\"\""));
    out.extend_from_slice(escaped.as_bytes());
}
