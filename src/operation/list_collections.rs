//! `ListCollections()`.

use crate::error::Result;
use crate::results::CollectionSummary;
use crate::store::DocumentStore;

#[derive(Default)]
pub struct ListCollections;

impl ListCollections {
    pub fn new() -> Self {
        ListCollections
    }

    pub async fn execute(self, store: &DocumentStore) -> Result<Vec<CollectionSummary>> {
        let collections = store.list_collections().await?;
        Ok(collections.into_iter().map(Into::into).collect())
    }
}
