//! `ListIndexes(coll)`.

use crate::error::Result;
use crate::results::IndexSummary;
use crate::store::DocumentStore;

pub struct ListIndexes {
    collection: String,
}

impl ListIndexes {
    pub fn new(collection: impl Into<String>) -> Self {
        ListIndexes {
            collection: collection.into(),
        }
    }

    pub async fn execute(self, store: &DocumentStore) -> Result<Vec<IndexSummary>> {
        let indexes = store.list_indexes(&self.collection).await?;
        Ok(indexes.into_iter().map(Into::into).collect())
    }
}
