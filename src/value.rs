//! The document data model.
//!
//! This crate does not invent its own JSON-like value type: `bson::Bson`
//! already models null, bool, int32/int64, double, string, UTC datetime,
//! array, and nested document — exactly the value union this engine's
//! documents are built from. `Document` is `bson::Document`, an ordered
//! field-name -> value map.

use bson::{Bson, Document};

use crate::error::{Error, Result};

/// A document value. Alias kept distinct from `bson::Bson` so call sites in
/// this crate read in terms of this crate's own vocabulary.
pub type Value = Bson;

pub use bson::Document as Doc;

/// Serializes a document to the bytes stored under a `doc:` row. Binary
/// BSON, not the wire protocol's framing — the document store never speaks
/// `OP_MSG`.
pub fn encode_document(doc: &Document) -> Result<Vec<u8>> {
    bson::to_vec(doc).map_err(|e| Error::internal(format!("failed to serialize document: {e}")))
}

pub fn decode_document(bytes: &[u8]) -> Result<Document> {
    bson::from_slice(bytes)
        .map_err(|e| Error::internal(format!("failed to deserialize document: {e}")))
}

/// Deep structural equality, used by `$eq`/`$ne`/`$in`/`$nin` and by the
/// index manager's old-vs-new comparison on update.
pub fn deep_eq(a: &Value, b: &Value) -> bool {
    a == b
}

/// True if the value is BSON null or otherwise absent; both are treated
/// identically by index maintenance and range filters.
pub fn is_nullish(v: Option<&Value>) -> bool {
    matches!(v, None | Some(Bson::Null))
}

/// Attempts to view a value as a finite `f64` for numeric comparison.
/// Returns `None` for non-numeric values; NaN/∞ are numeric but are left to
/// the caller to special-case since range operators never match them
/// sensibly.
pub fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Bson::Double(d) => Some(*d),
        Bson::Int32(i) => Some(*i as f64),
        Bson::Int64(i) => Some(*i as f64),
        _ => None,
    }
}

/// True if the value is one of the numeric BSON variants.
pub fn is_number(v: &Value) -> bool {
    matches!(v, Bson::Double(_) | Bson::Int32(_) | Bson::Int64(_))
}

/// Stringifies a value the way the residual filter's string-comparison
/// fallback does for two non-numeric, same-shape values.
pub fn stringify(v: &Value) -> Option<String> {
    match v {
        Bson::String(s) => Some(s.clone()),
        Bson::Boolean(b) => Some(b.to_string()),
        Bson::DateTime(dt) => Some(dt.to_string()),
        _ => None,
    }
}

/// Descends a dotted field path (`a.b.c`) through nested documents and,
/// when a path segment parses as an array index, through arrays. Returns
/// `None` if any segment is missing.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = doc.get(first)?;
    for segment in segments {
        current = match current {
            Bson::Document(d) => d.get(segment)?,
            Bson::Array(arr) => {
                let idx: usize = segment.parse().ok()?;
                arr.get(idx)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Like [`get_path`] but also reports whether the field was present at all
/// (needed by `$exists` and `$ne`, which distinguish "absent" from
/// "present and null").
pub fn path_exists(doc: &Document, path: &str) -> bool {
    get_path(doc, path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn dotted_path_descends_nested_documents() {
        let d = doc! { "a": { "b": 7 } };
        assert_eq!(get_path(&d, "a.b"), Some(&Bson::Int32(7)));
        assert_eq!(get_path(&d, "a.c"), None);
        assert_eq!(get_path(&d, "x"), None);
    }

    #[test]
    fn dotted_path_descends_arrays_by_index() {
        let d = doc! { "a": [ { "b": 1 }, { "b": 2 } ] };
        assert_eq!(get_path(&d, "a.1.b"), Some(&Bson::Int32(2)));
        assert_eq!(get_path(&d, "a.5.b"), None);
    }

    #[test]
    fn nullish_treats_missing_and_null_the_same() {
        assert!(is_nullish(None));
        assert!(is_nullish(Some(&Bson::Null)));
        assert!(!is_nullish(Some(&Bson::Int32(0))));
    }
}
