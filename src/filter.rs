//! Residual filter evaluation: the operators the executor
//! evaluates against a candidate document after a plan-chosen scan has
//! narrowed the candidate set (or, for a collection scan, against every
//! document).
//!
//! Dotted field paths are supported here (but not by the planner's index
//! selection — see `planner.rs`).

use bson::{Bson, Document};

use crate::error::{Error, Result};
use crate::value::{self, Value};

const RANGE_OPS: [&str; 4] = ["$gt", "$gte", "$lt", "$lte"];

/// Evaluates `filter` against `doc` using the supported operator table.
/// An empty filter always matches.
pub fn eval_filter(filter: &Document, doc: &Document, max_in_array_len: usize) -> Result<bool> {
    for (key, clause) in filter.iter() {
        let matched = match key.as_str() {
            "$and" => eval_logical(clause, doc, max_in_array_len, true)?,
            "$or" => eval_logical(clause, doc, max_in_array_len, false)?,
            _ if key.starts_with('$') => {
                return Err(Error::bad_value(format!(
                    "unsupported top-level operator {key:?}"
                )));
            }
            path => eval_field_clause(path, clause, doc, max_in_array_len)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn eval_logical(
    clause: &Bson,
    doc: &Document,
    max_in_array_len: usize,
    is_and: bool,
) -> Result<bool> {
    let Bson::Array(sub_filters) = clause else {
        return Err(Error::bad_value(format!(
            "{} requires an array of sub-filters",
            if is_and { "$and" } else { "$or" }
        )));
    };
    if sub_filters.is_empty() {
        if is_and {
            // Vacuously true, matching a conjunction of no constraints.
            return Ok(true);
        }
        return Err(Error::bad_value("$or requires a non-empty array"));
    }
    for sub in sub_filters {
        let Bson::Document(sub_doc) = sub else {
            return Err(Error::bad_value("$and/$or entries must be documents"));
        };
        let matched = eval_filter(sub_doc, doc, max_in_array_len)?;
        if is_and && !matched {
            return Ok(false);
        }
        if !is_and && matched {
            return Ok(true);
        }
    }
    Ok(is_and)
}

fn eval_field_clause(
    path: &str,
    clause: &Bson,
    doc: &Document,
    max_in_array_len: usize,
) -> Result<bool> {
    let actual = value::get_path(doc, path);
    let exists = value::path_exists(doc, path);

    match clause {
        Bson::Document(ops) if ops.keys().any(|k| k.starts_with('$')) => {
            for (op, target) in ops.iter() {
                if !eval_operator(op, target, actual, exists, max_in_array_len)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        scalar => Ok(matches_eq(actual, scalar)),
    }
}

fn matches_eq(actual: Option<&Value>, target: &Value) -> bool {
    match actual {
        Some(v) => value::deep_eq(v, target),
        None => matches!(target, Bson::Null),
    }
}

fn eval_operator(
    op: &str,
    target: &Bson,
    actual: Option<&Value>,
    exists: bool,
    max_in_array_len: usize,
) -> Result<bool> {
    match op {
        "$eq" => Ok(matches_eq(actual, target)),
        // An absent field always satisfies $ne, regardless of the target
        // value — including a literal null target.
        "$ne" => Ok(!exists || !matches_eq(actual, target)),
        "$exists" => {
            let want_present = !is_falsy(target);
            Ok(exists == want_present)
        }
        op if RANGE_OPS.contains(&op) => eval_range(op, target, actual),
        "$in" => eval_in(target, actual, max_in_array_len, false),
        "$nin" => eval_in(target, actual, max_in_array_len, true),
        other => Err(Error::bad_value(format!("unsupported operator {other:?}"))),
    }
}

fn is_falsy(v: &Bson) -> bool {
    matches!(v, Bson::Boolean(false) | Bson::Null) || matches!(v, Bson::Int32(0) | Bson::Int64(0))
}

/// `$gt/$gte/$lt/$lte`: numeric comparison when both sides coerce to
/// finite numbers, otherwise string comparison by code point — but only
/// when both sides are the *same* non-numeric shape (DESIGN.md Open
/// Question #2: this rewrite rejects cross-type range comparisons rather
/// than falling back to stringifying mismatched types). A null/absent
/// document value never matches a range predicate.
fn eval_range(op: &str, target: &Value, actual: Option<&Value>) -> Result<bool> {
    let Some(actual) = actual else {
        return Ok(false);
    };
    if matches!(actual, Bson::Null) {
        return Ok(false);
    }

    let ordering = if let (Some(a), Some(b)) = (value::as_f64(actual), value::as_f64(target)) {
        a.partial_cmp(&b)
    } else {
        match (value::stringify(actual), value::stringify(target)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        }
    };

    let Some(ordering) = ordering else {
        return Ok(false);
    };

    use std::cmp::Ordering::*;
    Ok(match op {
        "$gt" => ordering == Greater,
        "$gte" => ordering == Greater || ordering == Equal,
        "$lt" => ordering == Less,
        "$lte" => ordering == Less || ordering == Equal,
        _ => unreachable!(),
    })
}

fn eval_in(
    target: &Bson,
    actual: Option<&Value>,
    max_in_array_len: usize,
    negate: bool,
) -> Result<bool> {
    let Bson::Array(candidates) = target else {
        return Err(Error::bad_value(format!(
            "{} requires an array argument",
            if negate { "$nin" } else { "$in" }
        )));
    };
    if candidates.len() > max_in_array_len {
        return Err(Error::bad_value(format!(
            "{} array exceeds the maximum length of {max_in_array_len} elements",
            if negate { "$nin" } else { "$in" }
        )));
    }
    let any_match = candidates.iter().any(|c| matches_eq(actual, c));
    if negate {
        // A missing field counts as matching $nin.
        Ok(actual.is_none() || !any_match)
    } else {
        Ok(any_match)
    }
}
