//! End-to-end coverage of `DocumentStore` through the public `operation`
//! surface, against the in-memory `KvStore` reference implementation.
//! Unlike the unit tests colocated with each module, these exercise whole
//! request/response round trips the way a front end would drive them.

use std::sync::{Arc, Once};

use bson::doc;
use pretty_assertions::assert_eq;

use mongo_storage_core::operation::{
    CountDocuments, CreateIndex, DeleteMany, Find, FindOne, Insert, ListCollections, ListIndexes,
    UpdateMany, UpdateOne,
};
use mongo_storage_core::operation::find::FindOptions;
use mongo_storage_core::operation::update::UpdateOptions;
use mongo_storage_core::{Cancel, DocumentStore, InMemoryKvStore, StoreConfig};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

fn new_store() -> DocumentStore {
    init_tracing();
    DocumentStore::new(Arc::new(InMemoryKvStore::new()), StoreConfig::default())
}

#[tokio::test]
async fn insert_find_update_delete_round_trip() {
    let store = new_store();
    let cancel = Cancel::none();

    let inserted = Insert::new(
        "users",
        vec![
            doc! { "name": "Alice", "age": 30 },
            doc! { "name": "Bob", "age": 25 },
        ],
    )
    .execute(&store, 1_700_000_000_000, &cancel)
    .await
    .unwrap();
    assert_eq!(inserted.inserted_count, 2);
    assert_eq!(inserted.inserted_ids.len(), 2);

    let found = Find::new("users", doc! { "age": { "$gte": 26 } }, FindOptions::default())
        .execute(&store, &cancel)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get_str("name").unwrap(), "Alice");

    UpdateMany::new(
        "users",
        doc! {},
        doc! { "$inc": { "age": 1 } },
        UpdateOptions::default(),
    )
    .execute(&store, 1_700_000_000_000, &cancel)
    .await
    .unwrap();

    let bob = FindOne::new("users", doc! { "name": "Bob" }, None)
        .execute(&store, &cancel)
        .await
        .unwrap()
        .expect("bob should still be present");
    assert_eq!(bob.get_i32("age").unwrap(), 26);

    let deleted = DeleteMany::new("users", doc! { "age": { "$gte": 26 } })
        .execute(&store, &cancel)
        .await
        .unwrap();
    assert_eq!(deleted.deleted_count, 2);

    let remaining = CountDocuments::new("users", doc! {})
        .execute(&store, &cancel)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn upsert_via_update_one_creates_a_document_once() {
    let store = new_store();
    let cancel = Cancel::none();

    let first = UpdateOne::new(
        "carts",
        doc! { "user_id": "u1" },
        doc! { "$set": { "total": 42 } },
        UpdateOptions::builder().upsert(true).build(),
    )
    .execute(&store, 1_700_000_000_000, &cancel)
    .await
    .unwrap();
    assert_eq!(first.matched_count, 0);
    assert_eq!(first.modified_count, 0);
    assert!(first.upserted_id.is_some());

    let second = UpdateOne::new(
        "carts",
        doc! { "user_id": "u1" },
        doc! { "$set": { "total": 43 } },
        UpdateOptions::builder().upsert(true).build(),
    )
    .execute(&store, 1_700_000_000_000, &cancel)
    .await
    .unwrap();
    assert_eq!(second.matched_count, 1);
    assert_eq!(second.modified_count, 1);
    assert!(second.upserted_id.is_none());

    let count = CountDocuments::new("carts", doc! {})
        .execute(&store, &cancel)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn unique_index_rejects_duplicate_and_list_operations_reflect_it() {
    let store = new_store();
    let cancel = Cancel::none();

    let index = CreateIndex::new("accounts", "email", true)
        .execute(&store, 1_700_000_000_000, &cancel)
        .await
        .unwrap();
    assert_eq!(index.index_name, "email_1");

    Insert::new("accounts", vec![doc! { "email": "a@example.com" }])
        .execute(&store, 1_700_000_000_000, &cancel)
        .await
        .unwrap();

    let err = Insert::new("accounts", vec![doc! { "email": "a@example.com" }])
        .execute(&store, 1_700_000_000_000, &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.code(), 11000);

    let indexes = ListIndexes::new("accounts").execute(&store).await.unwrap();
    assert_eq!(indexes.len(), 2);
    assert!(indexes.iter().any(|i| i.name == "email_1" && i.unique));

    let collections = ListCollections::new().execute(&store).await.unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].name, "accounts");
    assert_eq!(collections[0].document_count, 1);
}

#[tokio::test]
async fn generated_ids_are_timestamped_from_the_caller_supplied_clock() {
    let store = new_store();
    let cancel = Cancel::none();
    let now_millis = 1_700_000_000_000_i64;

    let inserted = Insert::new("events", vec![doc! { "kind": "click" }])
        .execute(&store, now_millis, &cancel)
        .await
        .unwrap();
    let id = &inserted.inserted_ids[0];

    let collections = ListCollections::new().execute(&store).await.unwrap();
    let created_at = collections[0].created_at;

    let id_secs = i64::from_str_radix(&id[0..8], 16).unwrap();
    assert_eq!(id_secs, created_at / 1000);
}
