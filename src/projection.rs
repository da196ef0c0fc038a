//! Result projection: applied last, after sort/skip/limit,
//! to trim each returned document down to the requested field set.

use bson::Document;

use crate::error::{Error, Result};

/// A parsed, validated projection spec: either an include list (plus an
/// explicit `_id` inclusion flag) or an exclude list. Mixing inclusion and
/// exclusion in one spec is rejected at parse time.
#[derive(Debug, Clone)]
pub enum Projection {
    Include { fields: Vec<String>, include_id: bool },
    Exclude { fields: Vec<String> },
}

/// Parses a raw `{field: 0|1, ...}` projection document. `_id` is exempt
/// from the all-include/all-exclude rule: `{_id: 0, name: 1}` is a pure
/// include projection that additionally drops `_id`.
pub fn parse_projection(spec: &Document) -> Result<Option<Projection>> {
    if spec.is_empty() {
        return Ok(None);
    }

    let mut include_id = true;
    let mut saw_include = false;
    let mut saw_exclude = false;
    let mut fields = Vec::new();

    for (field, flag) in spec.iter() {
        let included = is_truthy_flag(flag)?;
        if field == "_id" {
            include_id = included;
            continue;
        }
        if included {
            saw_include = true;
        } else {
            saw_exclude = true;
        }
        fields.push(field.clone());
    }

    if saw_include && saw_exclude {
        return Err(Error::bad_value(
            "projection cannot mix inclusion and exclusion of fields other than _id",
        ));
    }

    if saw_exclude {
        return Ok(Some(Projection::Exclude { fields }));
    }

    if !saw_include && !include_id {
        // No field other than `_id` was mentioned, and `_id` was excluded:
        // a pure `{_id: 0}` spec. This is a single-field exclude, not an
        // empty include — it must drop only `_id` and keep everything else.
        return Ok(Some(Projection::Exclude { fields }));
    }

    Ok(Some(Projection::Include { fields, include_id }))
}

fn is_truthy_flag(value: &bson::Bson) -> Result<bool> {
    use bson::Bson;
    match value {
        Bson::Int32(0) | Bson::Int64(0) | Bson::Boolean(false) | Bson::Double(0.0) => Ok(false),
        Bson::Int32(_) | Bson::Int64(_) | Bson::Boolean(_) | Bson::Double(_) => Ok(true),
        other => Err(Error::bad_value(format!(
            "projection values must be 0 or 1, got {other:?}"
        ))),
    }
}

/// Applies a parsed projection to `doc`, returning the trimmed document.
pub fn apply_projection(doc: &Document, projection: &Projection) -> Document {
    match projection {
        Projection::Include { fields, include_id } => {
            let mut out = Document::new();
            if *include_id {
                if let Some(id) = doc.get("_id") {
                    out.insert("_id", id.clone());
                }
            }
            for field in fields {
                if let Some(v) = doc.get(field) {
                    out.insert(field.clone(), v.clone());
                }
            }
            out
        }
        Projection::Exclude { fields } => {
            let mut out = doc.clone();
            for field in fields {
                out.remove(field);
            }
            out
        }
    }
}
