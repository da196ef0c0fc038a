//! Stable multi-key result sorting. Applied by the executor
//! after a scan (and any residual filtering) has produced the candidate set,
//! never pushed into the storage layer.

use std::cmp::Ordering;

use bson::Document;

use crate::value::{self, Value};

/// A sort specification: ordered `(path, ascending)` pairs, evaluated left
/// to right, ties broken by the next key.
pub type SortSpec = Vec<(String, bool)>;

/// Sorts `docs` in place per `spec`. The sort is stable, so documents tied
/// on every key retain their original relative order.
pub fn sort_documents(docs: &mut [Document], spec: &SortSpec) {
    if spec.is_empty() {
        return;
    }
    docs.sort_by(|a, b| compare_by_spec(a, b, spec));
}

fn compare_by_spec(a: &Document, b: &Document, spec: &SortSpec) -> Ordering {
    for (path, ascending) in spec {
        let av = value::get_path(a, path);
        let bv = value::get_path(b, path);
        let ordering = compare_values(av, bv);
        if ordering != Ordering::Equal {
            return if *ascending { ordering } else { ordering.reverse() };
        }
    }
    Ordering::Equal
}

/// Orders two optional field values: missing *or explicitly null* sorts
/// before any non-null value; numbers compare numerically; everything else
/// that can be stringified compares lexicographically; otherwise values are
/// treated as tied (stable order is preserved by the caller).
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a_nullish = value::is_nullish(a);
    let b_nullish = value::is_nullish(b);
    match (a_nullish, b_nullish) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            let (a, b) = (a.unwrap(), b.unwrap());
            if let (Some(x), Some(y)) = (value::as_f64(a), value::as_f64(b)) {
                return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            }
            if let (Some(x), Some(y)) = (value::stringify(a), value::stringify(b)) {
                return x.cmp(&y);
            }
            Ordering::Equal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn sorts_ascending_by_single_numeric_key() {
        let mut docs = vec![doc! { "age": 30 }, doc! { "age": 10 }, doc! { "age": 20 }];
        sort_documents(&mut docs, &vec![("age".to_string(), true)]);
        let ages: Vec<i32> = docs.iter().map(|d| d.get_i32("age").unwrap()).collect();
        assert_eq!(ages, vec![10, 20, 30]);
    }

    #[test]
    fn sorts_descending_when_requested() {
        let mut docs = vec![doc! { "age": 10 }, doc! { "age": 30 }, doc! { "age": 20 }];
        sort_documents(&mut docs, &vec![("age".to_string(), false)]);
        let ages: Vec<i32> = docs.iter().map(|d| d.get_i32("age").unwrap()).collect();
        assert_eq!(ages, vec![30, 20, 10]);
    }

    #[test]
    fn secondary_key_breaks_ties() {
        let mut docs = vec![
            doc! { "a": 1, "b": 2 },
            doc! { "a": 1, "b": 1 },
            doc! { "a": 0, "b": 9 },
        ];
        sort_documents(
            &mut docs,
            &vec![("a".to_string(), true), ("b".to_string(), true)],
        );
        let pairs: Vec<(i32, i32)> = docs
            .iter()
            .map(|d| (d.get_i32("a").unwrap(), d.get_i32("b").unwrap()))
            .collect();
        assert_eq!(pairs, vec![(0, 9), (1, 1), (1, 2)]);
    }

    #[test]
    fn missing_field_sorts_before_present() {
        let mut docs = vec![doc! { "a": 1 }, doc! { "b": 1 }];
        sort_documents(&mut docs, &vec![("a".to_string(), true)]);
        assert!(docs[0].get("a").is_none());
    }

    #[test]
    fn explicit_null_sorts_before_present_like_missing() {
        use bson::Bson;
        let mut docs = vec![
            doc! { "a": 1 },
            doc! { "a": Bson::Null },
            doc! { "a": -5 },
        ];
        sort_documents(&mut docs, &vec![("a".to_string(), true)]);
        assert_eq!(docs[0].get("a"), Some(&Bson::Null));
        assert_eq!(docs[1].get_i32("a").unwrap(), -5);
        assert_eq!(docs[2].get_i32("a").unwrap(), 1);
    }

    #[test]
    fn ties_preserve_original_order() {
        let mut docs = vec![
            doc! { "a": 1, "tag": "first" },
            doc! { "a": 1, "tag": "second" },
        ];
        sort_documents(&mut docs, &vec![("a".to_string(), true)]);
        assert_eq!(docs[0].get_str("tag").unwrap(), "first");
        assert_eq!(docs[1].get_str("tag").unwrap(), "second");
    }
}
