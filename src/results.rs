//! Result types returned by the operations in `operation/`: plain
//! serializable structs, one per operation family, documented field by
//! field.

use serde::{Deserialize, Serialize};

/// The result of an `insert` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct InsertManyResult {
    pub acknowledged: bool,
    /// The `_id` of every document inserted, in insertion order.
    pub inserted_ids: Vec<String>,
    pub inserted_count: usize,
}

/// The result of an `updateOne`/`updateMany` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
    /// Set when the update triggered an upsert insert.
    pub upserted_id: Option<String>,
}

/// The result of a `deleteOne`/`deleteMany` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// The result of a `createIndex` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CreateIndexResult {
    pub index_name: String,
}

/// One entry of a `listIndexes` result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct IndexSummary {
    pub name: String,
    pub field: String,
    pub unique: bool,
}

/// One entry of a `listCollections` result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CollectionSummary {
    pub name: String,
    pub document_count: u64,
    pub index_count: usize,
    pub created_at: i64,
}

/// The result of a `getStats` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CollectionStats {
    pub document_count: u64,
    pub index_count: usize,
    pub storage_size_bytes: u64,
}

impl From<crate::store::InsertResult> for InsertManyResult {
    fn from(r: crate::store::InsertResult) -> Self {
        InsertManyResult {
            acknowledged: r.acknowledged,
            inserted_ids: r.inserted_ids,
            inserted_count: r.inserted_count,
        }
    }
}

impl From<crate::store::UpdateResult> for UpdateResult {
    fn from(r: crate::store::UpdateResult) -> Self {
        UpdateResult {
            matched_count: r.matched_count,
            modified_count: r.modified_count,
            upserted_id: r.upserted_id,
        }
    }
}

impl From<crate::store::DeleteResult> for DeleteResult {
    fn from(r: crate::store::DeleteResult) -> Self {
        DeleteResult {
            deleted_count: r.deleted_count,
        }
    }
}

impl From<crate::collection::Index> for IndexSummary {
    fn from(i: crate::collection::Index) -> Self {
        IndexSummary {
            name: i.name,
            field: i.field,
            unique: i.unique,
        }
    }
}

impl From<crate::collection::CollectionMetadata> for CollectionSummary {
    fn from(m: crate::collection::CollectionMetadata) -> Self {
        CollectionSummary {
            name: m.name,
            document_count: m.document_count,
            index_count: m.indexes.len(),
            created_at: m.created_at,
        }
    }
}

impl From<crate::store::Stats> for CollectionStats {
    fn from(s: crate::store::Stats) -> Self {
        CollectionStats {
            document_count: s.document_count,
            index_count: s.index_count,
            storage_size_bytes: s.storage_size_bytes,
        }
    }
}
