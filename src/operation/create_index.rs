//! `CreateIndex(coll, field, unique)`.

use crate::cancel::Cancel;
use crate::error::Result;
use crate::results::CreateIndexResult;
use crate::store::DocumentStore;

pub struct CreateIndex {
    collection: String,
    field: String,
    unique: bool,
}

impl CreateIndex {
    pub fn new(collection: impl Into<String>, field: impl Into<String>, unique: bool) -> Self {
        CreateIndex {
            collection: collection.into(),
            field: field.into(),
            unique,
        }
    }

    pub async fn execute(
        self,
        store: &DocumentStore,
        now_millis: i64,
        cancel: &Cancel,
    ) -> Result<CreateIndexResult> {
        let index = store
            .create_index(&self.collection, &self.field, self.unique, now_millis, cancel)
            .await?;
        Ok(CreateIndexResult {
            index_name: index.name,
        })
    }
}
