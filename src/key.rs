//! Key encoding: the bit-exact keyspace layout and the
//! sort-order-preserving value encoding everything else in this crate is
//! built on.
//!
//! Keyspace layout (three disjoint prefixes):
//!
//! - document row:   `doc:<collection>:<id>`
//! - index row:      `idx:<collection>:<field>:<encodedValue><US><id>`
//! - metadata row:    `meta:collection:<name>`
//!
//! `US` is the unit separator byte `0x1F`, chosen because it cannot appear
//! inside a value encoding (values are hex/tagged-ascii) or inside a
//! collection/field name (both reject `:`, and in practice reject control
//! bytes via the name validator in `collection.rs`).

use crate::value::Value;
use bson::Bson;

pub const UNIT_SEPARATOR: u8 = 0x1F;

/// Builds a document row key: `doc:<collection>:<id>`.
pub fn doc_key(collection: &str, id: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + collection.len() + 1 + id.len());
    out.extend_from_slice(b"doc:");
    out.extend_from_slice(collection.as_bytes());
    out.push(b':');
    out.extend_from_slice(id.as_bytes());
    out
}

/// Builds the `doc:<collection>:` prefix used for collection scans.
pub fn doc_prefix(collection: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + collection.len() + 1);
    out.extend_from_slice(b"doc:");
    out.extend_from_slice(collection.as_bytes());
    out.push(b':');
    out
}

/// Builds the `idx:<collection>:<field>:` prefix an index's rows all share.
pub fn index_prefix(collection: &str, field: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + collection.len() + 1 + field.len() + 1);
    out.extend_from_slice(b"idx:");
    out.extend_from_slice(collection.as_bytes());
    out.push(b':');
    out.extend_from_slice(field.as_bytes());
    out.push(b':');
    out
}

/// Builds a full index row key: `idx:<collection>:<field>:<encodedValue><US><id>`.
pub fn index_key(collection: &str, field: &str, encoded_value: &[u8], id: &str) -> Vec<u8> {
    let mut out = index_prefix(collection, field);
    out.extend_from_slice(encoded_value);
    out.push(UNIT_SEPARATOR);
    out.extend_from_slice(id.as_bytes());
    out
}

/// Builds a metadata row key: `meta:collection:<name>`.
pub fn meta_key(name: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + name.len());
    out.extend_from_slice(b"meta:collection:");
    out.extend_from_slice(name.as_bytes());
    out
}

/// Advances a scan cursor strictly past `key` on an inclusive-start scan:
/// the chunking rule every chunked scan in this crate uses to page forward
/// is `startKey = lastSeenKey ∥ 0x00`.
pub fn next_after(key: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.len() + 1);
    out.extend_from_slice(key);
    out.push(0x00);
    out
}

/// Decodes an index key's `(encoded_value, id)` tail. Given the key, finds
/// the third `:` from the left (ending the `idx:<collection>:<field>:`
/// prefix); the tail is `<encodedValue><US><id>`, split on the *last*
/// `0x1F` (a value encoding never itself contains `0x1F`). Returns `None`
/// if the key is malformed.
pub fn decode_index_key(key: &[u8]) -> Option<(&[u8], &str)> {
    let mut colons_seen = 0;
    let mut tail_start = None;
    for (i, b) in key.iter().enumerate() {
        if *b == b':' {
            colons_seen += 1;
            if colons_seen == 3 {
                tail_start = Some(i + 1);
                break;
            }
        }
    }
    let tail = &key[tail_start?..];
    let sep_pos = tail.iter().rposition(|b| *b == UNIT_SEPARATOR)?;
    let encoded_value = &tail[..sep_pos];
    let id = std::str::from_utf8(&tail[sep_pos + 1..]).ok()?;
    Some((encoded_value, id))
}

/// Decodes a document key's `id` suffix. Finds the second `:` (ending
/// `doc:<collection>:`); everything after it is the id.
pub fn decode_doc_key(key: &[u8]) -> Option<&str> {
    let mut colons_seen = 0;
    for (i, b) in key.iter().enumerate() {
        if *b == b':' {
            colons_seen += 1;
            if colons_seen == 2 {
                return std::str::from_utf8(&key[i + 1..]).ok();
            }
        }
    }
    None
}

/// Sort-order-preserving encoding of a single value. The
/// produced byte string's lexicographic order matches the cross-type order
/// `null < boolean < number < string < date`, and within each type, the
/// type's own intended order.
///
/// Returns `Err` if a string value exceeds the configured length cap — this
/// is surfaced by callers as an index/`BadValue` error, not a panic, since
/// it is reachable from untrusted document content.
pub fn encode_value(value: &Value, max_string_bytes: usize) -> Result<Vec<u8>, String> {
    match value {
        Bson::Null => Ok(b"0:".to_vec()),
        Bson::Boolean(b) => Ok(if *b { b"1:1".to_vec() } else { b"1:0".to_vec() }),
        Bson::Double(d) => Ok(encode_number(*d)),
        Bson::Int32(i) => Ok(encode_number(*i as f64)),
        Bson::Int64(i) => Ok(encode_number(*i as f64)),
        Bson::String(s) => {
            if s.len() > max_string_bytes {
                return Err(format!(
                    "indexed string value exceeds the maximum length of {max_string_bytes} bytes"
                ));
            }
            let mut out = Vec::with_capacity(2 + s.len());
            out.extend_from_slice(b"3:");
            out.extend_from_slice(s.as_bytes());
            Ok(out)
        }
        Bson::DateTime(dt) => {
            let millis = dt.timestamp_millis();
            if millis < 0 {
                return Err("dates before 1970 are not supported for indexing".to_string());
            }
            let mut out = Vec::with_capacity(18);
            out.extend_from_slice(b"4:");
            out.extend_from_slice(format!("{:016x}", millis as u64).as_bytes());
            Ok(out)
        }
        other => Err(format!(
            "value of type {other:?} is not indexable (expected null, boolean, number, string, \
             or date)"
        )),
    }
}

/// The IEEE-754 order-preserving transform: finite doubles
/// are written big-endian, then the sign bit is flipped (positive) or the
/// whole 64 bits are inverted (negative), so that unsigned-byte comparison
/// of the result matches numeric order. `NaN`/`+inf`/`-inf` get fixed
/// sentinel encodings that are pinned by this crate as:
/// `-inf < every finite < +inf < NaN` (see DESIGN.md Open Question #1).
fn encode_number(n: f64) -> Vec<u8> {
    if n.is_nan() {
        return b"2:N".to_vec();
    }
    if n == f64::INFINITY {
        return b"2:Z".to_vec();
    }
    if n == f64::NEG_INFINITY {
        return b"2:A".to_vec();
    }
    // Normalize -0.0 to +0.0 so they encode identically.
    let n = if n == 0.0 { 0.0_f64 } else { n };
    let bits = n.to_bits();
    let transformed = if n.is_sign_negative() {
        !bits
    } else {
        bits ^ (1u64 << 63)
    };
    let mut out = Vec::with_capacity(18);
    out.extend_from_slice(b"2:");
    out.extend_from_slice(format!("{transformed:016x}").as_bytes());
    out
}

/// An inclusive start / exclusive-ish end key range bracketing every index
/// row a comparison operator matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub start_key: Vec<u8>,
    pub end_key: Vec<u8>,
}

/// One side of a range: `$gt`/`$gte`/`$lt`/`$lte`/`$eq`, each carrying its
/// encoded comparison value.
#[derive(Debug, Clone, Copy)]
pub enum RangeOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Computes the `[startKey, endKey)` range for an index scan given a field,
/// collection, and an optional lower/upper bound. `lower`/`upper` are
/// independent: a filter like `{$gte: 10, $lt: 20}` supplies both.
pub fn index_range(
    collection: &str,
    field: &str,
    lower: Option<(RangeOp, &[u8])>,
    upper: Option<(RangeOp, &[u8])>,
) -> KeyRange {
    let prefix = index_prefix(collection, field);

    let start_key = match lower {
        None => prefix.clone(),
        Some((RangeOp::Gte, enc)) | Some((RangeOp::Eq, enc)) => {
            let mut k = prefix.clone();
            k.extend_from_slice(enc);
            k.push(UNIT_SEPARATOR);
            k
        }
        Some((RangeOp::Gt, enc)) => {
            let mut k = prefix.clone();
            k.extend_from_slice(enc);
            k.push(UNIT_SEPARATOR);
            k.push(0xFF);
            k
        }
        Some((_, enc)) => {
            // Lt/Lte passed as a lower bound make no sense; treat as open.
            let _ = enc;
            prefix.clone()
        }
    };

    let end_key = match upper {
        None => {
            let mut k = prefix.clone();
            k.push(0xFF);
            k
        }
        Some((RangeOp::Eq, enc)) | Some((RangeOp::Lte, enc)) => {
            let mut k = prefix.clone();
            k.extend_from_slice(enc);
            k.push(UNIT_SEPARATOR);
            k.push(0xFF);
            k
        }
        Some((RangeOp::Lt, enc)) => {
            let mut k = prefix.clone();
            k.extend_from_slice(enc);
            k.push(UNIT_SEPARATOR);
            k
        }
        Some((_, enc)) => {
            let _ = enc;
            let mut k = prefix.clone();
            k.push(0xFF);
            k
        }
    };

    KeyRange { start_key, end_key }
}

/// Convenience: the range for a bare `$eq v` / scalar-shorthand match.
pub fn eq_range(collection: &str, field: &str, encoded_value: &[u8]) -> KeyRange {
    index_range(
        collection,
        field,
        Some((RangeOp::Eq, encoded_value)),
        Some((RangeOp::Eq, encoded_value)),
    )
}
