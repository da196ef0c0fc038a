//! Secondary index lifecycle and write hooks. Owns no state
//! of its own — every fact it reasons about lives in the KV substrate; the
//! document store is the only caller, and it alone owns collection
//! metadata.

use std::collections::HashSet;

use bson::Document;

use crate::cancel::Cancel;
use crate::collection::Index;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::key;
use crate::kv::{Batch, KvStore, ScanOptions};
use crate::value;

/// Builds a new index on `field` by scanning every existing document in
/// `collection`. Does not touch collection
/// metadata — the caller persists the returned `Index` itself.
pub async fn build_index(
    kv: &dyn KvStore,
    collection: &str,
    field: &str,
    unique: bool,
    config: &StoreConfig,
    cancel: &Cancel,
) -> Result<Index> {
    let index = Index::for_field(field, unique);
    let prefix = key::doc_prefix(collection);
    let mut cursor = prefix.clone();
    let mut seen: HashSet<Vec<u8>> = HashSet::new();
    let mut puts = Vec::new();

    loop {
        cancel.check()?;
        let chunk = kv
            .scan(ScanOptions {
                prefix: Some(prefix.clone()),
                start_key: Some(cursor.clone()),
                limit: Some(config.scan_chunk_size),
                ..Default::default()
            })
            .await?;
        if chunk.is_empty() {
            break;
        }
        let chunk_len = chunk.len();
        let last_key = chunk.last().unwrap().key.clone();

        for entry in &chunk {
            let doc = value::decode_document(&entry.value)?;
            let Some(id) = key::decode_doc_key(&entry.key) else {
                continue;
            };
            let Some(raw_value) = doc.get(field) else {
                continue;
            };
            if matches!(raw_value, bson::Bson::Null) {
                continue;
            }
            let encoded = key::encode_value(raw_value, config.max_index_string_bytes)
                .map_err(Error::bad_value)?;

            if unique && !seen.insert(encoded.clone()) {
                return Err(Error::duplicate_key(
                    collection,
                    index.name.clone(),
                    field,
                    describe_value(raw_value),
                ));
            }

            puts.push(key::index_key(collection, field, &encoded, id));
        }

        if chunk_len < config.scan_chunk_size {
            break;
        }
        cursor = key::next_after(&last_key);
    }

    let mut batch = Batch::new();
    for put_key in puts {
        batch.put(put_key, vec![1]);
    }
    if !batch.is_empty() {
        kv.batch_write(batch).await?;
    }

    Ok(index)
}

/// Deletes every index row for `field` on `collection`. Does not touch metadata.
pub async fn drop_index(
    kv: &dyn KvStore,
    collection: &str,
    field: &str,
    config: &StoreConfig,
    cancel: &Cancel,
) -> Result<()> {
    let prefix = key::index_prefix(collection, field);
    delete_by_prefix(kv, &prefix, config, cancel).await
}

/// Deletes every index row for every index on `collection`.
pub async fn drop_all_indexes(
    kv: &dyn KvStore,
    collection: &str,
    indexes: &[Index],
    config: &StoreConfig,
    cancel: &Cancel,
) -> Result<()> {
    for index in indexes {
        drop_index(kv, collection, &index.field, config, cancel).await?;
    }
    Ok(())
}

async fn delete_by_prefix(
    kv: &dyn KvStore,
    prefix: &[u8],
    config: &StoreConfig,
    cancel: &Cancel,
) -> Result<()> {
    loop {
        cancel.check()?;
        let chunk = kv
            .scan(ScanOptions {
                prefix: Some(prefix.to_vec()),
                limit: Some(config.scan_chunk_size),
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
        kv.batch_write(batch).await?;
        if chunk_len < config.scan_chunk_size {
            break;
        }
    }
    Ok(())
}

/// `onInsert`: checks uniqueness for every unique index up
/// front, then returns the index puts for the caller to apply alongside the
/// document put. The caller is responsible for ordering the document put
/// last when not batching.
pub async fn on_insert(
    kv: &dyn KvStore,
    collection: &str,
    indexes: &[Index],
    doc: &Document,
    id: &str,
    config: &StoreConfig,
) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
    let mut puts = Vec::new();
    for index in indexes {
        let Some(raw_value) = doc.get(&index.field) else {
            continue;
        };
        if matches!(raw_value, bson::Bson::Null) {
            continue;
        }
        let encoded = key::encode_value(raw_value, config.max_index_string_bytes)
            .map_err(Error::bad_value)?;
        if index.unique {
            check_unique(kv, collection, &index.field, &index.name, &encoded, Some(id)).await?;
        }
        puts.push((
            key::index_key(collection, &index.field, &encoded, id),
            vec![1],
        ));
    }
    Ok(puts)
}

/// `onUpdate`: compares old/new values per index by
/// structural equality, returns the deletes and puts the caller should
/// apply (deletes before puts).
pub async fn on_update(
    kv: &dyn KvStore,
    collection: &str,
    indexes: &[Index],
    old_doc: &Document,
    new_doc: &Document,
    id: &str,
    config: &StoreConfig,
) -> Result<(Vec<Vec<u8>>, Vec<(Vec<u8>, Vec<u8>)>)> {
    let mut deletes = Vec::new();
    let mut puts = Vec::new();

    for index in indexes {
        let old_value = old_doc.get(&index.field);
        let new_value = new_doc.get(&index.field);
        if old_value == new_value {
            continue;
        }

        if let Some(old_value) = old_value {
            if !matches!(old_value, bson::Bson::Null) {
                let encoded = key::encode_value(old_value, config.max_index_string_bytes)
                    .map_err(Error::bad_value)?;
                deletes.push(key::index_key(collection, &index.field, &encoded, id));
            }
        }

        if let Some(new_value) = new_value {
            if !matches!(new_value, bson::Bson::Null) {
                let encoded = key::encode_value(new_value, config.max_index_string_bytes)
                    .map_err(Error::bad_value)?;
                if index.unique {
                    check_unique(kv, collection, &index.field, &index.name, &encoded, Some(id))
                        .await?;
                }
                puts.push((
                    key::index_key(collection, &index.field, &encoded, id),
                    vec![1],
                ));
            }
        }
    }

    Ok((deletes, puts))
}

/// `onDelete`: every index row a doc holds a value for.
pub fn on_delete(
    collection: &str,
    indexes: &[Index],
    doc: &Document,
    id: &str,
    config: &StoreConfig,
) -> Result<Vec<Vec<u8>>> {
    let mut deletes = Vec::new();
    for index in indexes {
        let Some(raw_value) = doc.get(&index.field) else {
            continue;
        };
        if matches!(raw_value, bson::Bson::Null) {
            continue;
        }
        let encoded = key::encode_value(raw_value, config.max_index_string_bytes)
            .map_err(Error::bad_value)?;
        deletes.push(key::index_key(collection, &index.field, &encoded, id));
    }
    Ok(deletes)
}

/// Uniqueness check: scans the `<v><US>` bucket with
/// `limit=2`; any row other than `exclude_id`'s own proves a violation.
async fn check_unique(
    kv: &dyn KvStore,
    collection: &str,
    field: &str,
    index_name: &str,
    encoded_value: &[u8],
    exclude_id: Option<&str>,
) -> Result<()> {
    let mut prefix = key::index_prefix(collection, field);
    prefix.extend_from_slice(encoded_value);
    prefix.push(key::UNIT_SEPARATOR);

    let rows = kv
        .scan(ScanOptions {
            prefix: Some(prefix),
            limit: Some(2),
            ..Default::default()
        })
        .await?;

    for row in rows {
        let Some((_, row_id)) = key::decode_index_key(&row.key) else {
            continue;
        };
        if exclude_id == Some(row_id) {
            continue;
        }
        return Err(Error::duplicate_key(
            collection,
            index_name,
            field,
            hex::encode(encoded_value),
        ));
    }
    Ok(())
}

fn describe_value(value: &bson::Bson) -> String {
    match value {
        bson::Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::memory::InMemoryKvStore;
    use bson::doc;

    async fn insert_doc(kv: &InMemoryKvStore, collection: &str, doc: &Document, id: &str) {
        kv.put(key::doc_key(collection, id), value::encode_document(doc).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn build_index_writes_one_row_per_non_null_value() {
        let kv = InMemoryKvStore::new();
        insert_doc(&kv, "users", &doc! { "_id": "1", "age": 30 }, "1").await;
        insert_doc(&kv, "users", &doc! { "_id": "2" }, "2").await;
        let config = StoreConfig::default();
        let index = build_index(&kv, "users", "age", false, &config, &Cancel::none())
            .await
            .unwrap();
        assert_eq!(index.name, "age_1");
        let count = kv
            .count(Some(&key::index_prefix("users", "age")))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn build_index_detects_duplicate_values_when_unique() {
        let kv = InMemoryKvStore::new();
        insert_doc(&kv, "users", &doc! { "_id": "1", "email": "a@x" }, "1").await;
        insert_doc(&kv, "users", &doc! { "_id": "2", "email": "a@x" }, "2").await;
        let config = StoreConfig::default();
        let result = build_index(&kv, "users", "email", true, &config, &Cancel::none()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn on_insert_enforces_uniqueness() {
        let kv = InMemoryKvStore::new();
        let config = StoreConfig::default();
        let indexes = vec![Index::for_field("email", true)];
        insert_doc(&kv, "users", &doc! { "_id": "1", "email": "a@x" }, "1").await;
        on_insert(&kv, "users", &indexes, &doc! { "_id": "1", "email": "a@x" }, "1", &config)
            .await
            .unwrap();
        let err = on_insert(
            &kv,
            "users",
            &indexes,
            &doc! { "_id": "2", "email": "a@x" },
            "2",
            &config,
        )
        .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn on_update_skips_unchanged_fields_and_errors_on_new_duplicate() {
        let kv = InMemoryKvStore::new();
        let config = StoreConfig::default();
        let indexes = vec![Index::for_field("email", true)];
        on_insert(
            &kv,
            "users",
            &indexes,
            &doc! { "_id": "1", "email": "a@x" },
            "1",
            &config,
        )
        .await
        .unwrap();
        on_insert(
            &kv,
            "users",
            &indexes,
            &doc! { "_id": "2", "email": "b@x" },
            "2",
            &config,
        )
        .await
        .unwrap();

        let (deletes, puts) = on_update(
            &kv,
            "users",
            &indexes,
            &doc! { "_id": "1", "email": "a@x" },
            &doc! { "_id": "1", "email": "a@x" },
            "1",
            &config,
        )
        .await
        .unwrap();
        assert!(deletes.is_empty());
        assert!(puts.is_empty());

        let err = on_update(
            &kv,
            "users",
            &indexes,
            &doc! { "_id": "1", "email": "a@x" },
            &doc! { "_id": "1", "email": "b@x" },
            "1",
            &config,
        )
        .await;
        assert!(err.is_err());
    }

    #[test]
    fn on_delete_returns_a_delete_for_every_non_null_indexed_field() {
        let config = StoreConfig::default();
        let indexes = vec![Index::for_field("email", false), Index::for_field("age", false)];
        let deletes = on_delete(
            "users",
            &indexes,
            &doc! { "_id": "1", "email": "a@x" },
            "1",
            &config,
        )
        .unwrap();
        assert_eq!(deletes.len(), 1);
    }
}
