//! Input sanitization. Every externally supplied document,
//! filter, update, or subcomponent is recursively inspected for keys in the
//! "dangerous set" — `__proto__`, `constructor`, `prototype` — left over
//! from the wire protocol's JS-object heritage; rejecting them here means
//! nothing downstream has to care. Recursion is capped to bound the cost
//! of a pathological payload.

use bson::{Bson, Document};

use crate::error::{Error, Result};

const DANGEROUS_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// Recursively checks `doc` for dangerous keys at any depth, up to
/// `max_depth`. Returns `BadValue` on the first violation or on exceeding
/// the depth cap.
pub fn sanitize_document(doc: &Document, max_depth: usize) -> Result<()> {
    check_document(doc, 0, max_depth)
}

fn check_document(doc: &Document, depth: usize, max_depth: usize) -> Result<()> {
    if depth > max_depth {
        return Err(Error::bad_value(format!(
            "document nesting exceeds the maximum depth of {max_depth}"
        )));
    }
    for (key, value) in doc.iter() {
        if DANGEROUS_KEYS.contains(&key.as_str()) {
            return Err(Error::bad_value(format!(
                "field name {key:?} is not allowed"
            )));
        }
        check_value(value, depth + 1, max_depth)?;
    }
    Ok(())
}

fn check_value(value: &Bson, depth: usize, max_depth: usize) -> Result<()> {
    match value {
        Bson::Document(d) => check_document(d, depth, max_depth),
        Bson::Array(arr) => {
            if depth > max_depth {
                return Err(Error::bad_value(format!(
                    "document nesting exceeds the maximum depth of {max_depth}"
                )));
            }
            for item in arr {
                check_value(item, depth + 1, max_depth)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn accepts_ordinary_documents() {
        let d = doc! { "name": "Alice", "age": 30 };
        assert!(sanitize_document(&d, 20).is_ok());
    }

    #[test]
    fn rejects_dangerous_keys_at_top_level() {
        let d = doc! { "__proto__": 1 };
        assert!(sanitize_document(&d, 20).is_err());
    }

    #[test]
    fn rejects_dangerous_keys_nested_in_documents() {
        let d = doc! { "a": { "constructor": 1 } };
        assert!(sanitize_document(&d, 20).is_err());
    }

    #[test]
    fn rejects_dangerous_keys_nested_in_arrays() {
        let d = doc! { "a": [ { "prototype": 1 } ] };
        assert!(sanitize_document(&d, 20).is_err());
    }

    #[test]
    fn rejects_excessive_nesting_depth() {
        let mut inner = doc! { "leaf": 1 };
        for _ in 0..25 {
            inner = doc! { "wrap": inner };
        }
        assert!(sanitize_document(&inner, 20).is_err());
    }
}
