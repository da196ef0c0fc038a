//! Collections, indexes, and collection metadata.

use serde::{Deserialize, Serialize};

/// A secondary index on one top-level field. Every collection
/// owns an implicit `_id_` index that is always unique and can never be
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub field: String,
    pub unique: bool,
}

impl Index {
    /// The implicit index every collection owns on `_id`.
    pub fn id_index() -> Self {
        Index {
            name: "_id_".to_string(),
            field: "_id".to_string(),
            unique: true,
        }
    }

    /// User-created indexes are named `<field>_1`.
    pub fn for_field(field: &str, unique: bool) -> Self {
        Index {
            name: format!("{field}_1"),
            field: field.to_string(),
            unique,
        }
    }

    pub fn is_id_index(&self) -> bool {
        self.name == "_id_"
    }
}

/// Collection metadata: `{name, indexes[], createdAt,
/// schemaVersion, documentCount}`. `document_count` is an
/// eventually-accurate counter maintained by CRUD operations — it must
/// never be trusted for filtered counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub name: String,
    pub indexes: Vec<Index>,
    /// Unix-millisecond creation timestamp.
    pub created_at: i64,
    pub schema_version: u32,
    /// Eventually-consistent document count. Never read for filtered-count
    /// correctness; see `CountDocuments` in `operation/count.rs`.
    pub document_count: u64,
}

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

impl CollectionMetadata {
    pub fn new(name: impl Into<String>, created_at: i64) -> Self {
        CollectionMetadata {
            name: name.into(),
            indexes: vec![Index::id_index()],
            created_at,
            schema_version: CURRENT_SCHEMA_VERSION,
            document_count: 0,
        }
    }

    pub fn index_by_field(&self, field: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.field == field)
    }

    pub fn index_by_name(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }
}

/// Validates a collection name: non-empty, at most 120 characters,
/// contains none of `: / \ NUL`, does not contain `..`, is not only
/// whitespace, and does not start with `system.`.
pub fn is_valid_collection_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 120 {
        return false;
    }
    if name.trim().is_empty() {
        return false;
    }
    if name.starts_with("system.") {
        return false;
    }
    if name.contains("..") {
        return false;
    }
    if name.contains([':', '/', '\\', '\0']) {
        return false;
    }
    true
}

/// Validates a field name used as an index key: non-empty, and — like
/// collection names — excludes `:`, since field names appear unescaped in
/// index keys.
pub fn is_valid_field_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(':')
}
