//! Query execution: drives the plan the planner chose
//! against the KV substrate in bounded chunks, decodes documents, applies
//! the residual filter, then sort/skip/limit. Projection is applied by the
//! caller afterward (`projection.rs`) since it is a pure per-document
//! transform independent of scan order.

use bson::Document;

use crate::cancel::Cancel;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::filter;
use crate::key;
use crate::kv::{KvStore, ScanOptions};
use crate::planner::{Plan, PlanKind};
use crate::sort::{self, SortSpec};
use crate::value;

/// Executes `plan` against `kv`, returning documents with sort/skip/limit
/// already applied.
#[allow(clippy::too_many_arguments)]
pub async fn execute_plan(
    kv: &dyn KvStore,
    collection: &str,
    plan: &Plan,
    filter: &Document,
    config: &StoreConfig,
    sort: Option<&SortSpec>,
    skip: usize,
    limit: usize,
    cancel: &Cancel,
) -> Result<Vec<Document>> {
    let needed = match sort {
        Some(_) => config.sort_eval_cap,
        None => skip.saturating_add(limit),
    };

    let mut candidates = match &plan.kind {
        PlanKind::IndexScan { range, .. } => {
            scan_index(kv, collection, &range.start_key, &range.end_key, plan.needs_post_filter, filter, config, needed, cancel).await?
        }
        PlanKind::CollectionScan => {
            scan_collection(kv, collection, plan.needs_post_filter, filter, config, needed, cancel).await?
        }
    };

    if let Some(sort_spec) = sort {
        sort::sort_documents(&mut candidates, sort_spec);
    }

    Ok(candidates.into_iter().skip(skip).take(limit).collect())
}

#[allow(clippy::too_many_arguments)]
async fn scan_index(
    kv: &dyn KvStore,
    collection: &str,
    start_key: &[u8],
    end_key: &[u8],
    needs_post_filter: bool,
    filter: &Document,
    config: &StoreConfig,
    needed: usize,
    cancel: &Cancel,
) -> Result<Vec<Document>> {
    let mut out = Vec::new();
    let mut cursor = start_key.to_vec();

    loop {
        cancel.check()?;
        if out.len() >= needed {
            break;
        }
        let chunk = kv
            .scan(ScanOptions {
                start_key: Some(cursor.clone()),
                end_key: Some(end_key.to_vec()),
                limit: Some(config.scan_chunk_size),
                ..Default::default()
            })
            .await?;
        if chunk.is_empty() {
            break;
        }
        let chunk_len = chunk.len();
        let last_key = chunk.last().map(|e| e.key.clone());

        for entry in &chunk {
            let Some((_, id)) = key::decode_index_key(&entry.key) else {
                continue;
            };
            let doc_key = key::doc_key(collection, id);
            let Some(bytes) = kv.get(&doc_key).await? else {
                // Document row hasn't landed yet, or this is an orphaned
                // index row from a crash/partial write.
                continue;
            };
            let doc = value::decode_document(&bytes)?;
            if needs_post_filter && !filter::eval_filter(filter, &doc, config.max_in_array_len)? {
                continue;
            }
            out.push(doc);
            if out.len() >= needed {
                break;
            }
        }

        if chunk_len < config.scan_chunk_size {
            break;
        }
        cursor = key::next_after(&last_key.unwrap());
    }

    Ok(out)
}

async fn scan_collection(
    kv: &dyn KvStore,
    collection: &str,
    needs_post_filter: bool,
    filter: &Document,
    config: &StoreConfig,
    needed: usize,
    cancel: &Cancel,
) -> Result<Vec<Document>> {
    let prefix = key::doc_prefix(collection);
    let mut out = Vec::new();
    let mut cursor = prefix.clone();

    loop {
        cancel.check()?;
        if out.len() >= needed {
            break;
        }
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
        let last_key = chunk.last().map(|e| e.key.clone());

        for entry in &chunk {
            let doc = value::decode_document(&entry.value)?;
            if needs_post_filter && !filter::eval_filter(filter, &doc, config.max_in_array_len)? {
                continue;
            }
            out.push(doc);
            if out.len() >= needed {
                break;
            }
        }

        if chunk_len < config.scan_chunk_size {
            break;
        }
        cursor = key::next_after(&last_key.unwrap());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Index;
    use crate::kv::memory::InMemoryKvStore;
    use crate::planner;
    use bson::doc;

    async fn seed(kv: &InMemoryKvStore, collection: &str, ages: &[i32]) {
        for (i, age) in ages.iter().enumerate() {
            let id = format!("id{i}");
            let doc = doc! { "_id": id.clone(), "age": *age };
            kv.put(
                key::doc_key(collection, &id),
                value::encode_document(&doc).unwrap(),
            )
            .await
            .unwrap();
            let encoded = key::encode_value(&bson::Bson::Int32(*age), 1024).unwrap();
            kv.put(key::index_key(collection, "age", &encoded, &id), vec![1])
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn index_scan_respects_range_and_returns_in_key_order() {
        let kv = InMemoryKvStore::new();
        seed(&kv, "users", &[18, 25, 30, 35, 40]).await;
        let indexes = vec![Index::id_index(), Index::for_field("age", false)];
        let filter = doc! { "age": { "$gte": 25, "$lt": 40 } };
        let plan = planner::select_plan(&filter, &indexes, "users", 1024);
        let config = StoreConfig::default();
        let docs = execute_plan(
            &kv,
            "users",
            &plan,
            &filter,
            &config,
            None,
            0,
            100,
            &Cancel::none(),
        )
        .await
        .unwrap();
        let ages: Vec<i32> = docs.iter().map(|d| d.get_i32("age").unwrap()).collect();
        assert_eq!(ages, vec![25, 30, 35]);
    }

    #[tokio::test]
    async fn collection_scan_applies_residual_filter() {
        let kv = InMemoryKvStore::new();
        seed(&kv, "users", &[18, 25, 30]).await;
        let indexes = vec![Index::id_index()];
        let filter = doc! { "age": { "$gte": 20 } };
        let plan = planner::select_plan(&filter, &indexes, "users", 1024);
        let config = StoreConfig::default();
        let docs = execute_plan(
            &kv,
            "users",
            &plan,
            &filter,
            &config,
            None,
            0,
            100,
            &Cancel::none(),
        )
        .await
        .unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn limit_and_skip_apply_after_scan() {
        let kv = InMemoryKvStore::new();
        seed(&kv, "users", &[1, 2, 3, 4, 5]).await;
        let indexes = vec![Index::id_index()];
        let filter = doc! {};
        let plan = planner::select_plan(&filter, &indexes, "users", 1024);
        let config = StoreConfig::default();
        let docs = execute_plan(
            &kv,
            "users",
            &plan,
            &filter,
            &config,
            None,
            2,
            2,
            &Cancel::none(),
        )
        .await
        .unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn cancelled_token_aborts_execution() {
        let kv = InMemoryKvStore::new();
        seed(&kv, "users", &[1, 2, 3]).await;
        let indexes = vec![Index::id_index()];
        let filter = doc! {};
        let plan = planner::select_plan(&filter, &indexes, "users", 1024);
        let config = StoreConfig::default();
        let (cancel, handle) = Cancel::new();
        handle.cancel();
        let result = execute_plan(&kv, "users", &plan, &filter, &config, None, 0, 100, &cancel).await;
        assert!(result.is_err());
    }
}
