//! `GetStats(coll)`.

use crate::error::Result;
use crate::results::CollectionStats;
use crate::store::DocumentStore;

pub struct GetStats {
    collection: String,
}

impl GetStats {
    pub fn new(collection: impl Into<String>) -> Self {
        GetStats {
            collection: collection.into(),
        }
    }

    pub async fn execute(self, store: &DocumentStore) -> Result<CollectionStats> {
        let stats = store.get_stats(&self.collection).await?;
        Ok(stats.into())
    }
}
