//! Update operator application: `$set`, `$inc`, `$unset`,
//! plus the filter-to-base-document derivation used by upsert.

use bson::{Bson, Document};

use crate::error::{Error, Result};

const SUPPORTED_OPS: [&str; 3] = ["$set", "$inc", "$unset"];

/// Validates that `update` contains only `$set`/`$inc`/`$unset` top-level
/// keys, each an object, and that it is not empty.
pub fn validate_update(update: &Document) -> Result<()> {
    if update.is_empty() {
        return Err(Error::bad_value("update document must not be empty"));
    }
    for (op, payload) in update.iter() {
        if !SUPPORTED_OPS.contains(&op.as_str()) {
            return Err(Error::bad_value(format!("unsupported update operator {op:?}")));
        }
        if !matches!(payload, Bson::Document(_)) {
            return Err(Error::bad_value(format!(
                "{op} requires an object of field updates"
            )));
        }
    }
    Ok(())
}

/// Applies `update`'s `$set`/`$inc`/`$unset` clauses to a clone of `doc`.
/// Returns `(new_doc, changed)`; `changed` is used for `modifiedCount`.
pub fn apply_update(doc: &Document, update: &Document) -> Result<(Document, bool)> {
    let mut out = doc.clone();
    let mut changed = false;

    if let Some(Bson::Document(set)) = update.get("$set") {
        for (field, value) in set.iter() {
            if out.get(field) != Some(value) {
                changed = true;
            }
            out.insert(field.clone(), value.clone());
        }
    }

    if let Some(Bson::Document(inc)) = update.get("$inc") {
        for (field, delta) in inc.iter() {
            let delta = as_f64(delta).ok_or_else(|| {
                Error::bad_value(format!("$inc requires a numeric amount for field {field:?}"))
            })?;
            let current = out.get(field).and_then(as_f64).unwrap_or(0.0);
            let updated = current + delta;
            out.insert(field.clone(), numeric_result(delta, current, updated));
            changed = true;
        }
    }

    if let Some(Bson::Document(unset)) = update.get("$unset") {
        for field in unset.keys() {
            if out.remove(field).is_some() {
                changed = true;
            }
        }
    }

    Ok((out, changed))
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(d) => Some(*d),
        Bson::Int32(i) => Some(*i as f64),
        Bson::Int64(i) => Some(*i as f64),
        _ => None,
    }
}

/// Preserves integer typing when both the increment and the prior value are
/// integral, matching the intuitive "+1 on a missing field is an int" case.
fn numeric_result(delta: f64, current: f64, updated: f64) -> Bson {
    let delta_is_int = delta.fract() == 0.0;
    let current_is_int = current.fract() == 0.0;
    if delta_is_int && current_is_int && updated.abs() < i64::MAX as f64 {
        Bson::Int64(updated as i64)
    } else {
        Bson::Double(updated)
    }
}

/// Builds the base document for an upsert: strips operator keys (top-level
/// keys starting with `$`) and operator-object values (e.g. `{$gte: x}`)
/// from `filter`, then merges in `$set` and `$inc` target values from
/// `update`.
pub fn base_document_for_upsert(filter: &Document, update: &Document) -> Document {
    let mut base = Document::new();

    for (key, value) in filter.iter() {
        if key.starts_with('$') {
            continue;
        }
        if matches!(value, Bson::Document(d) if d.keys().any(|k| k.starts_with('$'))) {
            continue;
        }
        base.insert(key.clone(), value.clone());
    }

    if let Some(Bson::Document(set)) = update.get("$set") {
        for (field, value) in set.iter() {
            base.insert(field.clone(), value.clone());
        }
    }
    if let Some(Bson::Document(inc)) = update.get("$inc") {
        for (field, value) in inc.iter() {
            if !base.contains_key(field) {
                base.insert(field.clone(), value.clone());
            }
        }
    }

    base
}
