//! Query planning: choosing between a collection scan and a
//! single-field index scan. A single-field index is always a safe
//! lower-bound-selectivity choice; multi-index intersection and compound
//! keys are out of scope.

use bson::{Bson, Document};

use crate::collection::Index;
use crate::key::{self, KeyRange, RangeOp};

const RANGE_OPS: [&str; 5] = ["$eq", "$gt", "$gte", "$lt", "$lte"];
const NON_RANGE_OPS: [&str; 4] = ["$ne", "$in", "$nin", "$exists"];

#[derive(Debug, Clone)]
pub enum PlanKind {
    CollectionScan,
    IndexScan {
        field: String,
        index_name: String,
        range: KeyRange,
    },
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub kind: PlanKind,
    pub needs_post_filter: bool,
    /// Informational only; never used for correctness.
    pub cost_estimate: u64,
}

impl Plan {
    fn collection_scan(needs_post_filter: bool) -> Self {
        Plan {
            kind: PlanKind::CollectionScan,
            needs_post_filter,
            cost_estimate: 1_000,
        }
    }
}

/// Chooses a plan for `filter` against `indexes` on `collection`, following
/// a five-step selection rule (see the module doc comment).
pub fn select_plan(
    filter: &Document,
    indexes: &[Index],
    collection: &str,
    max_string_bytes: usize,
) -> Plan {
    if filter.is_empty() {
        return Plan::collection_scan(false);
    }

    // Step 2: first eligible top-level field entry, in insertion order.
    if let Some(plan) = scan_entries(filter.iter(), indexes, collection, max_string_bytes, false) {
        return plan;
    }

    // Step 3: recurse into $and sub-filters.
    if let Some(Bson::Array(sub_filters)) = filter.get("$and") {
        for sub in sub_filters {
            if let Bson::Document(sub_doc) = sub {
                if let Some(plan) =
                    scan_entries(sub_doc.iter(), indexes, collection, max_string_bytes, true)
                {
                    return plan;
                }
            }
        }
    }

    // Step 4: recurse into $or sub-filters.
    if let Some(Bson::Array(sub_filters)) = filter.get("$or") {
        for sub in sub_filters {
            if let Bson::Document(sub_doc) = sub {
                if let Some(plan) =
                    scan_entries(sub_doc.iter(), indexes, collection, max_string_bytes, true)
                {
                    return plan;
                }
            }
        }
    }

    // Step 5: no usable index.
    Plan::collection_scan(true)
}

fn scan_entries<'a>(
    entries: impl Iterator<Item = (&'a String, &'a Bson)>,
    indexes: &[Index],
    collection: &str,
    max_string_bytes: usize,
    force_post_filter: bool,
) -> Option<Plan> {
    let entries: Vec<(&String, &Bson)> = entries.collect();
    for (key, clause) in &entries {
        if key.starts_with('$') {
            continue;
        }
        let Some(index) = indexes.iter().find(|i| &i.field == *key) else {
            continue;
        };
        let Some((range, only_range_ops)) =
            field_range(clause, collection, &index.field, max_string_bytes)
        else {
            continue;
        };
        let other_fields_present = entries
            .iter()
            .any(|(k, _)| !k.starts_with('$') && *k != key);
        let needs_post_filter = force_post_filter || other_fields_present || !only_range_ops;
        return Some(Plan {
            kind: PlanKind::IndexScan {
                field: index.field.clone(),
                index_name: index.name.clone(),
                range,
            },
            needs_post_filter,
            cost_estimate: 10,
        });
    }
    None
}

/// Computes the key range for a field's filter clause if it is range
/// eligible (a bare scalar, or an object containing at least one of `$eq`,
/// `$gt`, `$gte`, `$lt`, `$lte`). Returns `(range, true)` when the clause
/// contains *only* range operators (so no post-filter is needed purely for
/// this field), or `(range, false)` when other operators ride along (e.g.
/// `{$gte: 1, $ne: 5}`).
fn field_range(
    clause: &Bson,
    collection: &str,
    field: &str,
    max_string_bytes: usize,
) -> Option<(KeyRange, bool)> {
    match clause {
        Bson::Document(ops) if ops.keys().any(|k| k.starts_with('$')) => {
            let mut lower: Option<(RangeOp, Vec<u8>)> = None;
            let mut upper: Option<(RangeOp, Vec<u8>)> = None;
            let mut saw_range_op = false;
            let mut only_range_ops = true;

            for (op, value) in ops.iter() {
                if NON_RANGE_OPS.contains(&op.as_str()) {
                    only_range_ops = false;
                    continue;
                }
                if !RANGE_OPS.contains(&op.as_str()) {
                    // Unknown operator: not eligible for index selection at
                    // all; bail out entirely and let the caller fall back.
                    continue;
                }
                let encoded = crate::key::encode_value(value, max_string_bytes).ok()?;
                saw_range_op = true;
                match op.as_str() {
                    "$eq" => {
                        lower = Some((RangeOp::Eq, encoded.clone()));
                        upper = Some((RangeOp::Eq, encoded));
                    }
                    "$gt" => lower = Some((RangeOp::Gt, encoded)),
                    "$gte" => lower = Some((RangeOp::Gte, encoded)),
                    "$lt" => upper = Some((RangeOp::Lt, encoded)),
                    "$lte" => upper = Some((RangeOp::Lte, encoded)),
                    _ => unreachable!(),
                }
            }

            if !saw_range_op {
                return None;
            }

            let range = key::index_range(
                collection,
                field,
                lower.as_ref().map(|(op, enc)| (*op, enc.as_slice())),
                upper.as_ref().map(|(op, enc)| (*op, enc.as_slice())),
            );
            Some((range, only_range_ops))
        }
        Bson::Document(_) => None,
        scalar => {
            let encoded = crate::key::encode_value(scalar, max_string_bytes).ok()?;
            Some((key::eq_range(collection, field, &encoded), true))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn indexes() -> Vec<Index> {
        vec![Index::id_index(), Index::for_field("age", false)]
    }

    #[test]
    fn empty_filter_is_collection_scan_without_post_filter() {
        let plan = select_plan(&doc! {}, &indexes(), "users", 1024);
        assert!(matches!(plan.kind, PlanKind::CollectionScan));
        assert!(!plan.needs_post_filter);
    }

    #[test]
    fn scalar_on_indexed_field_chooses_index_scan() {
        let plan = select_plan(&doc! { "age": 30 }, &indexes(), "users", 1024);
        assert!(matches!(plan.kind, PlanKind::IndexScan { .. }));
        assert!(!plan.needs_post_filter);
    }

    #[test]
    fn range_clause_on_indexed_field_chooses_index_scan() {
        let plan = select_plan(
            &doc! { "age": { "$gte": 25, "$lt": 40 } },
            &indexes(),
            "users",
            1024,
        );
        assert!(matches!(plan.kind, PlanKind::IndexScan { .. }));
        assert!(!plan.needs_post_filter);
    }

    #[test]
    fn non_range_operator_forces_post_filter() {
        let plan = select_plan(
            &doc! { "age": { "$gte": 25, "$ne": 30 } },
            &indexes(),
            "users",
            1024,
        );
        assert!(matches!(plan.kind, PlanKind::IndexScan { .. }));
        assert!(plan.needs_post_filter);
    }

    #[test]
    fn extra_non_operator_field_forces_post_filter() {
        let plan = select_plan(
            &doc! { "age": 30, "name": "Alice" },
            &indexes(),
            "users",
            1024,
        );
        assert!(matches!(plan.kind, PlanKind::IndexScan { .. }));
        assert!(plan.needs_post_filter);
    }

    #[test]
    fn unindexed_field_falls_back_to_collection_scan() {
        let plan = select_plan(&doc! { "name": "Alice" }, &indexes(), "users", 1024);
        assert!(matches!(plan.kind, PlanKind::CollectionScan));
        assert!(plan.needs_post_filter);
    }

    #[test]
    fn and_recurses_to_find_an_indexable_branch() {
        let plan = select_plan(
            &doc! { "$and": [ { "name": "Alice" }, { "age": 30 } ] },
            &indexes(),
            "users",
            1024,
        );
        assert!(matches!(plan.kind, PlanKind::IndexScan { .. }));
        assert!(plan.needs_post_filter);
    }

    #[test]
    fn or_recurses_and_always_forces_post_filter() {
        let plan = select_plan(
            &doc! { "$or": [ { "age": 30 }, { "name": "Alice" } ] },
            &indexes(),
            "users",
            1024,
        );
        assert!(matches!(plan.kind, PlanKind::IndexScan { .. }));
        assert!(plan.needs_post_filter);
    }
}
