//! `DropCollection(coll)`.

use crate::cancel::Cancel;
use crate::error::Result;
use crate::store::DocumentStore;

pub struct DropCollection {
    collection: String,
}

impl DropCollection {
    pub fn new(collection: impl Into<String>) -> Self {
        DropCollection {
            collection: collection.into(),
        }
    }

    pub async fn execute(self, store: &DocumentStore, cancel: &Cancel) -> Result<bool> {
        store.drop_collection(&self.collection, cancel).await
    }
}
