//! `DropIndex(coll, name)`.

use crate::cancel::Cancel;
use crate::error::Result;
use crate::store::DocumentStore;

pub struct DropIndex {
    collection: String,
    name: String,
}

impl DropIndex {
    pub fn new(collection: impl Into<String>, name: impl Into<String>) -> Self {
        DropIndex {
            collection: collection.into(),
            name: name.into(),
        }
    }

    pub async fn execute(self, store: &DocumentStore, cancel: &Cancel) -> Result<bool> {
        store.drop_index(&self.collection, &self.name, cancel).await
    }
}
