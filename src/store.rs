//! The document store: the orchestrator every operation in
//! `operation/` is a thin wrapper around. Validates inputs, allocates ids,
//! serializes per-collection mutations, and keeps collection metadata in
//! sync with the index manager and raw document rows.

use std::collections::HashMap;
use std::sync::Arc;

use bson::Document;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::cancel::Cancel;
use crate::collection::{self, CollectionMetadata, Index};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::executor;
use crate::id;
use crate::index_manager;
use crate::key;
use crate::kv::{Batch, KvStore};
use crate::planner;
use crate::projection::{self, Projection};
use crate::sanitize;
use crate::sort::SortSpec;
use crate::update_ops;
use crate::value;

/// Options accepted by `find`/`find_one`.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub projection: Option<Document>,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
    pub skip: usize,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub upsert: bool,
}

/// The per-collection FIFO serialization primitive.
/// Implemented as a lazily-populated map of `tokio::sync::Mutex`es behind a
/// single coarse `std::sync::Mutex` guarding the map itself — the map is
/// lazily populated and never shrunk.
#[derive(Debug, Default)]
struct LockTable {
    locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockTable {
    async fn acquire(&self, collection: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            locks
                .entry(collection.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        #[cfg(feature = "tracing-unstable")]
        tracing::debug!(collection, "acquiring collection lock");
        lock.lock_owned().await
    }
}

/// The storage engine core's entry point: one instance per KV substrate,
/// shared across every collection.
pub struct DocumentStore {
    kv: Arc<dyn KvStore>,
    config: StoreConfig,
    locks: LockTable,
}

impl DocumentStore {
    pub fn new(kv: Arc<dyn KvStore>, config: StoreConfig) -> Self {
        DocumentStore {
            kv,
            config,
            locks: LockTable::default(),
        }
    }

    fn validate_collection_name(name: &str) -> Result<()> {
        if !collection::is_valid_collection_name(name) {
            return Err(Error::namespace_invalid(name));
        }
        Ok(())
    }

    async fn load_metadata(&self, collection: &str) -> Result<Option<CollectionMetadata>> {
        match self.kv.get(&key::meta_key(collection)).await? {
            Some(bytes) => {
                let metadata = bson::from_slice(&bytes)
                    .map_err(|e| Error::internal(format!("corrupt collection metadata: {e}")))?;
                Ok(Some(metadata))
            }
            None => Ok(None),
        }
    }

    async fn save_metadata(&self, metadata: &CollectionMetadata) -> Result<()> {
        let bytes = bson::to_vec(metadata)
            .map_err(|e| Error::internal(format!("failed to serialize metadata: {e}")))?;
        self.kv.put(key::meta_key(&metadata.name), bytes).await
    }

    async fn get_or_create_metadata(&self, collection: &str, now_millis: i64) -> Result<CollectionMetadata> {
        if let Some(metadata) = self.load_metadata(collection).await? {
            return Ok(metadata);
        }
        let metadata = CollectionMetadata::new(collection, now_millis);
        self.save_metadata(&metadata).await?;
        Ok(metadata)
    }

    /// `Insert(collection, documents[])`.
    pub async fn insert(
        &self,
        collection: &str,
        documents: Vec<Document>,
        now_millis: i64,
        cancel: &Cancel,
    ) -> Result<InsertResult> {
        Self::validate_collection_name(collection)?;
        for doc in &documents {
            sanitize::sanitize_document(doc, self.config.max_sanitize_depth)?;
        }

        let _guard = self.locks.acquire(collection).await;
        let mut metadata = self.get_or_create_metadata(collection, now_millis).await?;

        let mut inserted_ids = Vec::with_capacity(documents.len());
        for chunk in documents.chunks(self.config.scan_chunk_size) {
            for doc in chunk {
                cancel.check()?;
                let (id, result) = self
                    .insert_one_locked(collection, &mut metadata, doc, now_millis)
                    .await;
                match result {
                    Ok(()) => inserted_ids.push(id),
                    Err(e) => {
                        #[cfg(feature = "tracing-unstable")]
                        tracing::warn!(collection, error = %e, "insert violated a constraint");
                        self.save_metadata(&metadata).await?;
                        return Err(e);
                    }
                }
            }
        }

        self.save_metadata(&metadata).await?;
        Ok(InsertResult {
            acknowledged: true,
            inserted_count: inserted_ids.len(),
            inserted_ids,
        })
    }

    async fn insert_one_locked(
        &self,
        collection: &str,
        metadata: &mut CollectionMetadata,
        doc: &Document,
        now_millis: i64,
    ) -> (String, Result<()>) {
        let mut doc = doc.clone();
        let assigned_id = match doc.get("_id") {
            Some(bson::Bson::String(s)) => s.clone(),
            Some(other) => {
                return (
                    String::new(),
                    Err(Error::bad_value(format!(
                        "_id must be a string, got {other:?}"
                    ))),
                );
            }
            None => {
                let generated = id::generate(now_millis);
                doc.insert("_id", generated.clone());
                generated
            }
        };

        let result = self
            .write_new_document(collection, metadata, &doc, &assigned_id)
            .await;
        (assigned_id, result)
    }

    async fn write_new_document(
        &self,
        collection: &str,
        metadata: &mut CollectionMetadata,
        doc: &Document,
        id: &str,
    ) -> Result<()> {
        if !id::is_valid_length(id) {
            return Err(Error::invalid_length(format!(
                "_id must be between 1 and 256 characters, got {} characters",
                id.len()
            )));
        }
        let encoded = value::encode_document(doc)?;
        if encoded.len() > self.config.max_document_bytes {
            return Err(Error::document_too_large(encoded.len(), self.config.max_document_bytes));
        }

        let index_puts = index_manager::on_insert(
            self.kv.as_ref(),
            collection,
            &metadata.indexes,
            doc,
            id,
            &self.config,
        )
        .await?;

        let mut batch = Batch::new();
        for (k, v) in index_puts {
            batch.put(k, v);
        }
        batch.put(key::doc_key(collection, id), encoded);
        self.kv.batch_write(batch).await?;

        metadata.document_count += 1;
        Ok(())
    }

    /// `Find(collection, filter, opts)`.
    pub async fn find(
        &self,
        collection: &str,
        filter: &Document,
        opts: FindOptions,
        cancel: &Cancel,
    ) -> Result<Vec<Document>> {
        Self::validate_collection_name(collection)?;
        sanitize::sanitize_document(filter, self.config.max_sanitize_depth)?;

        let Some(metadata) = self.load_metadata(collection).await? else {
            return Ok(Vec::new());
        };

        let projection = match &opts.projection {
            Some(spec) => projection::parse_projection(spec)?,
            None => None,
        };

        let effective_limit = opts
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(self.config.default_find_limit)
            .min(self.config.max_find_limit);

        let plan = planner::select_plan(
            filter,
            &metadata.indexes,
            collection,
            self.config.max_index_string_bytes,
        );
        let docs = executor::execute_plan(
            self.kv.as_ref(),
            collection,
            &plan,
            filter,
            &self.config,
            opts.sort.as_ref(),
            opts.skip,
            effective_limit,
            cancel,
        )
        .await?;

        Ok(match &projection {
            Some(p) => docs.iter().map(|d| projection::apply_projection(d, p)).collect(),
            None => docs,
        })
    }

    /// `FindOne(collection, filter, opts)`.
    pub async fn find_one(
        &self,
        collection: &str,
        filter: &Document,
        projection: Option<Document>,
        cancel: &Cancel,
    ) -> Result<Option<Document>> {
        let opts = FindOptions {
            projection,
            sort: None,
            limit: Some(1),
            skip: 0,
        };
        let mut docs = self.find(collection, filter, opts, cancel).await?;
        Ok(if docs.is_empty() { None } else { Some(docs.remove(0)) })
    }

    /// `CountDocuments(collection, filter)`: an empty filter
    /// reads the eventually-consistent counter; a non-empty filter executes
    /// a bounded scan instead.
    pub async fn count_documents(
        &self,
        collection: &str,
        filter: &Document,
        cancel: &Cancel,
    ) -> Result<u64> {
        Self::validate_collection_name(collection)?;
        sanitize::sanitize_document(filter, self.config.max_sanitize_depth)?;

        let Some(metadata) = self.load_metadata(collection).await? else {
            return Ok(0);
        };

        if filter.is_empty() {
            return Ok(metadata.document_count);
        }

        let plan = planner::select_plan(
            filter,
            &metadata.indexes,
            collection,
            self.config.max_index_string_bytes,
        );
        let docs = executor::execute_plan(
            self.kv.as_ref(),
            collection,
            &plan,
            filter,
            &self.config,
            None,
            0,
            self.config.count_filtered_cap,
            cancel,
        )
        .await?;
        Ok(docs.len() as u64)
    }

    /// `UpdateOne`/`UpdateMany`.
    pub async fn update(
        &self,
        collection: &str,
        filter: &Document,
        update: &Document,
        opts: UpdateOptions,
        many: bool,
        now_millis: i64,
        cancel: &Cancel,
    ) -> Result<UpdateResult> {
        Self::validate_collection_name(collection)?;
        sanitize::sanitize_document(filter, self.config.max_sanitize_depth)?;
        sanitize::sanitize_document(update, self.config.max_sanitize_depth)?;
        update_ops::validate_update(update)?;

        let _guard = self.locks.acquire(collection).await;
        let mut metadata = match self.load_metadata(collection).await? {
            Some(m) => m,
            None if opts.upsert => {
                self.get_or_create_metadata(collection, now_millis).await?
            }
            None => {
                return Ok(UpdateResult {
                    matched_count: 0,
                    modified_count: 0,
                    upserted_id: None,
                })
            }
        };

        let limit = if many { self.config.update_many_cap } else { 1 };
        let plan = planner::select_plan(
            filter,
            &metadata.indexes,
            collection,
            self.config.max_index_string_bytes,
        );
        let candidates = executor::execute_plan(
            self.kv.as_ref(),
            collection,
            &plan,
            filter,
            &self.config,
            None,
            0,
            limit,
            cancel,
        )
        .await?;

        if candidates.is_empty() && opts.upsert {
            let base = update_ops::base_document_for_upsert(filter, update);
            let (id, result) = self
                .insert_one_locked(collection, &mut metadata, &base, now_millis)
                .await;
            result?;
            self.save_metadata(&metadata).await?;
            return Ok(UpdateResult {
                matched_count: 0,
                modified_count: 0,
                upserted_id: Some(id),
            });
        }

        let mut modified_count = 0;
        for old_doc in &candidates {
            cancel.check()?;
            let id = old_doc
                .get_str("_id")
                .map(|s| s.to_string())
                .unwrap_or_else(|_| old_doc.get("_id").map(|v| v.to_string()).unwrap_or_default());
            let (new_doc, changed) = update_ops::apply_update(old_doc, update)?;

            let (deletes, puts) = index_manager::on_update(
                self.kv.as_ref(),
                collection,
                &metadata.indexes,
                old_doc,
                &new_doc,
                &id,
                &self.config,
            )
            .await?;

            let encoded = value::encode_document(&new_doc)?;
            if encoded.len() > self.config.max_document_bytes {
                return Err(Error::document_too_large(encoded.len(), self.config.max_document_bytes));
            }

            let mut batch = Batch::new();
            for d in deletes {
                batch.delete(d);
            }
            for (k, v) in puts {
                batch.put(k, v);
            }
            batch.put(key::doc_key(collection, &id), encoded);
            self.kv.batch_write(batch).await?;

            if changed {
                modified_count += 1;
            }
        }

        self.save_metadata(&metadata).await?;
        Ok(UpdateResult {
            matched_count: candidates.len() as u64,
            modified_count,
            upserted_id: None,
        })
    }

    /// `DeleteOne`/`DeleteMany`.
    pub async fn delete(
        &self,
        collection: &str,
        filter: &Document,
        many: bool,
        cancel: &Cancel,
    ) -> Result<DeleteResult> {
        Self::validate_collection_name(collection)?;
        sanitize::sanitize_document(filter, self.config.max_sanitize_depth)?;

        let _guard = self.locks.acquire(collection).await;
        let Some(mut metadata) = self.load_metadata(collection).await? else {
            return Ok(DeleteResult { deleted_count: 0 });
        };

        let mut total_deleted: u64 = 0;
        loop {
            cancel.check()?;
            let limit = if many { self.config.scan_chunk_size } else { 1 };
            let plan = planner::select_plan(
                filter,
                &metadata.indexes,
                collection,
                self.config.max_index_string_bytes,
            );
            let candidates = executor::execute_plan(
                self.kv.as_ref(),
                collection,
                &plan,
                filter,
                &self.config,
                None,
                0,
                limit,
                cancel,
            )
            .await?;
            if candidates.is_empty() {
                break;
            }
            let got = candidates.len();

            let mut batch = Batch::new();
            for doc in &candidates {
                let id = doc
                    .get_str("_id")
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| doc.get("_id").map(|v| v.to_string()).unwrap_or_default());
                for d in index_manager::on_delete(collection, &metadata.indexes, doc, &id, &self.config)? {
                    batch.delete(d);
                }
                batch.delete(key::doc_key(collection, &id));
            }
            self.kv.batch_write(batch).await?;
            total_deleted += got as u64;

            if !many || got < limit {
                break;
            }
        }

        metadata.document_count = metadata.document_count.saturating_sub(total_deleted);
        self.save_metadata(&metadata).await?;
        Ok(DeleteResult {
            deleted_count: total_deleted,
        })
    }

    /// `CreateIndex(collection, field, unique)`.
    pub async fn create_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
        now_millis: i64,
        cancel: &Cancel,
    ) -> Result<Index> {
        Self::validate_collection_name(collection)?;
        if !collection::is_valid_field_name(field) {
            return Err(Error::bad_value(format!("invalid field name {field:?}")));
        }

        let _guard = self.locks.acquire(collection).await;
        let mut metadata = self.get_or_create_metadata(collection, now_millis).await?;

        if let Some(existing) = metadata.index_by_field(field) {
            return Ok(existing.clone());
        }

        #[cfg(feature = "tracing-unstable")]
        tracing::debug!(collection, field, unique, "building index retroactively");

        let index = index_manager::build_index(
            self.kv.as_ref(),
            collection,
            field,
            unique,
            &self.config,
            cancel,
        )
        .await?;
        metadata.indexes.push(index.clone());
        self.save_metadata(&metadata).await?;
        Ok(index)
    }

    /// `DropIndex(collection, name)`.
    pub async fn drop_index(&self, collection: &str, name: &str, cancel: &Cancel) -> Result<bool> {
        Self::validate_collection_name(collection)?;
        if name == "_id_" {
            return Err(Error::invalid_length("the _id_ index cannot be dropped"));
        }

        let _guard = self.locks.acquire(collection).await;
        let Some(mut metadata) = self.load_metadata(collection).await? else {
            return Err(Error::index_not_found(collection, name));
        };
        let Some(index) = metadata.index_by_name(name).cloned() else {
            return Err(Error::index_not_found(collection, name));
        };

        index_manager::drop_index(self.kv.as_ref(), collection, &index.field, &self.config, cancel)
            .await?;
        metadata.indexes.retain(|i| i.name != name);
        self.save_metadata(&metadata).await?;
        Ok(true)
    }

    /// `ListIndexes(collection)`.
    pub async fn list_indexes(&self, collection: &str) -> Result<Vec<Index>> {
        Self::validate_collection_name(collection)?;
        match self.load_metadata(collection).await? {
            Some(metadata) => Ok(metadata.indexes),
            None => Ok(Vec::new()),
        }
    }

    /// `ListCollections()`: scans every `meta:collection:` row.
    pub async fn list_collections(&self) -> Result<Vec<CollectionMetadata>> {
        let rows = self
            .kv
            .scan(crate::kv::ScanOptions {
                prefix: Some(b"meta:collection:".to_vec()),
                ..Default::default()
            })
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let metadata: CollectionMetadata = bson::from_slice(&row.value)
                .map_err(|e| Error::internal(format!("corrupt collection metadata: {e}")))?;
            out.push(metadata);
        }
        Ok(out)
    }

    /// `DropCollection(collection)`.
    pub async fn drop_collection(&self, collection: &str, cancel: &Cancel) -> Result<bool> {
        Self::validate_collection_name(collection)?;
        let _guard = self.locks.acquire(collection).await;
        let Some(metadata) = self.load_metadata(collection).await? else {
            return Ok(false);
        };

        let prefix = key::doc_prefix(collection);
        loop {
            cancel.check()?;
            let chunk = self
                .kv
                .scan(crate::kv::ScanOptions {
                    prefix: Some(prefix.clone()),
                    limit: Some(self.config.scan_chunk_size),
                    ..Default::default()
                })
                .await?;
            if chunk.is_empty() {
                break;
            }
            let chunk_len = chunk.len();
            let mut batch = Batch::new();
            for entry in chunk {
                batch.delete(entry.key);
            }
            self.kv.batch_write(batch).await?;
            if chunk_len < self.config.scan_chunk_size {
                break;
            }
        }

        index_manager::drop_all_indexes(
            self.kv.as_ref(),
            collection,
            &metadata.indexes,
            &self.config,
            cancel,
        )
        .await?;
        self.kv.delete(&key::meta_key(collection)).await?;
        Ok(true)
    }

    /// `GetStats(collection)`.
    pub async fn get_stats(&self, collection: &str) -> Result<Stats> {
        Self::validate_collection_name(collection)?;
        let Some(metadata) = self.load_metadata(collection).await? else {
            return Err(Error::namespace_not_found(collection));
        };

        let mut storage_size_bytes = self
            .sum_prefix_bytes(&key::doc_prefix(collection))
            .await?;
        for index in &metadata.indexes {
            storage_size_bytes += self
                .sum_prefix_bytes(&key::index_prefix(collection, &index.field))
                .await?;
        }

        Ok(Stats {
            document_count: metadata.document_count,
            index_count: metadata.indexes.len(),
            storage_size_bytes,
        })
    }

    /// Sums `key.len() + value.len()` for every row under `prefix`, paging
    /// in `scan_chunk_size` chunks so a large collection doesn't require an
    /// unbounded scan. Used only for `GetStats`'s informational byte tally,
    /// never for query correctness.
    async fn sum_prefix_bytes(&self, prefix: &[u8]) -> Result<u64> {
        let mut total = 0u64;
        let mut cursor = prefix.to_vec();
        loop {
            let chunk = self
                .kv
                .scan(crate::kv::ScanOptions {
                    prefix: Some(prefix.to_vec()),
                    start_key: Some(cursor.clone()),
                    limit: Some(self.config.scan_chunk_size),
                    ..Default::default()
                })
                .await?;
            if chunk.is_empty() {
                break;
            }
            let chunk_len = chunk.len();
            for entry in &chunk {
                total += (entry.key.len() + entry.value.len()) as u64;
            }
            if chunk_len < self.config.scan_chunk_size {
                break;
            }
            cursor = key::next_after(&chunk.last().unwrap().key);
        }
        Ok(total)
    }
}

#[derive(Debug, Clone)]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_ids: Vec<String>,
    pub inserted_count: usize,
}

#[derive(Debug, Clone)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// `GetStats`'s output shape. `storage_size_bytes` is the
/// sum of `key.len() + value.len()` across every document and index row
/// currently scanned for the collection — an approximation a real storage
/// engine would instead report from its own page/segment accounting, which
/// is out of scope for this crate.
#[derive(Debug, Clone)]
pub struct Stats {
    pub document_count: u64,
    pub index_count: usize,
    pub storage_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::memory::InMemoryKvStore;
    use bson::doc;

    fn new_store() -> DocumentStore {
        DocumentStore::new(Arc::new(InMemoryKvStore::new()), StoreConfig::default())
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let store = new_store();
        store
            .insert(
                "users",
                vec![doc! { "_id": "1", "name": "Alice", "age": 30 }],
                0,
                &Cancel::none(),
            )
            .await
            .unwrap();
        let docs = store
            .find("users", &doc! { "name": "Alice" }, FindOptions::default(), &Cancel::none())
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get_i32("age").unwrap(), 30);
    }

    #[tokio::test]
    async fn unique_index_violation_reports_and_keeps_one_document() {
        let store = new_store();
        store
            .create_index("users", "email", true, 0, &Cancel::none())
            .await
            .unwrap();
        store
            .insert("users", vec![doc! { "email": "a@x" }], 0, &Cancel::none())
            .await
            .unwrap();
        let err = store
            .insert("users", vec![doc! { "email": "a@x" }], 0, &Cancel::none())
            .await;
        assert!(err.is_err());
        let count = store
            .count_documents("users", &doc! {}, &Cancel::none())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn update_changes_indexed_field_and_old_value_stops_matching() {
        let store = new_store();
        store
            .create_index("users", "email", true, 0, &Cancel::none())
            .await
            .unwrap();
        store
            .insert("users", vec![doc! { "_id": "u1", "email": "old" }], 0, &Cancel::none())
            .await
            .unwrap();
        store
            .update(
                "users",
                &doc! { "_id": "u1" },
                &doc! { "$set": { "email": "new" } },
                UpdateOptions::default(),
                false,
                0,
                &Cancel::none(),
            )
            .await
            .unwrap();
        assert!(store
            .find("users", &doc! { "email": "old" }, FindOptions::default(), &Cancel::none())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            store
                .find("users", &doc! { "email": "new" }, FindOptions::default(), &Cancel::none())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn upsert_creates_document_with_synthesized_id() {
        let store = new_store();
        let result = store
            .update(
                "users",
                &doc! { "name": "X" },
                &doc! { "$set": { "age": 10 } },
                UpdateOptions { upsert: true },
                false,
                0,
                &Cancel::none(),
            )
            .await
            .unwrap();
        assert!(result.upserted_id.is_some());
        let docs = store
            .find("users", &doc! { "name": "X" }, FindOptions::default(), &Cancel::none())
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get_i32("age").unwrap(), 10);
    }

    #[tokio::test]
    async fn delete_removes_document_and_index_rows() {
        let store = new_store();
        store
            .create_index("users", "email", false, 0, &Cancel::none())
            .await
            .unwrap();
        store
            .insert("users", vec![doc! { "_id": "1", "email": "a@x" }], 0, &Cancel::none())
            .await
            .unwrap();
        let result = store
            .delete("users", &doc! { "_id": "1" }, false, &Cancel::none())
            .await
            .unwrap();
        assert_eq!(result.deleted_count, 1);
        assert!(store
            .find("users", &doc! {}, FindOptions::default(), &Cancel::none())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn drop_index_refuses_to_remove_id_index() {
        let store = new_store();
        store
            .insert("users", vec![doc! { "_id": "1" }], 0, &Cancel::none())
            .await
            .unwrap();
        assert!(store.drop_index("users", "_id_", &Cancel::none()).await.is_err());
    }

    #[tokio::test]
    async fn drop_collection_removes_everything() {
        let store = new_store();
        store
            .create_index("users", "email", false, 0, &Cancel::none())
            .await
            .unwrap();
        store
            .insert("users", vec![doc! { "_id": "1", "email": "a@x" }], 0, &Cancel::none())
            .await
            .unwrap();
        assert!(store.drop_collection("users", &Cancel::none()).await.unwrap());
        assert!(store.list_indexes("users").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn range_scan_via_index_preserves_numeric_order() {
        let store = new_store();
        store
            .create_index("users", "age", false, 0, &Cancel::none())
            .await
            .unwrap();
        for age in [18, 25, 30, 35, 40] {
            store
                .insert("users", vec![doc! { "age": age }], 0, &Cancel::none())
                .await
                .unwrap();
        }
        let docs = store
            .find(
                "users",
                &doc! { "age": { "$gte": 25, "$lt": 40 } },
                FindOptions::default(),
                &Cancel::none(),
            )
            .await
            .unwrap();
        assert_eq!(docs.len(), 3);
    }

    #[tokio::test]
    async fn get_stats_reports_counts_and_nonzero_storage_size() {
        let store = new_store();
        store
            .create_index("users", "email", false, 0, &Cancel::none())
            .await
            .unwrap();
        store
            .insert("users", vec![doc! { "email": "a@x" }], 0, &Cancel::none())
            .await
            .unwrap();
        let stats = store.get_stats("users").await.unwrap();
        assert_eq!(stats.document_count, 1);
        assert_eq!(stats.index_count, 2);
        assert!(stats.storage_size_bytes > 0);
    }

    #[tokio::test]
    async fn get_stats_on_missing_collection_is_namespace_not_found() {
        let store = new_store();
        let err = store.get_stats("ghosts").await.unwrap_err();
        assert_eq!(err.code(), 26);
    }
}
