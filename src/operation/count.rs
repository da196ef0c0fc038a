//! `CountDocuments(coll, f)`. Distinct from `find` — see
//! `DocumentStore::count_documents` for the empty-filter fast path.

use bson::Document;

use crate::cancel::Cancel;
use crate::error::Result;
use crate::store::DocumentStore;

pub struct CountDocuments {
    collection: String,
    filter: Document,
}

impl CountDocuments {
    pub fn new(collection: impl Into<String>, filter: Document) -> Self {
        CountDocuments {
            collection: collection.into(),
            filter,
        }
    }

    pub async fn execute(self, store: &DocumentStore, cancel: &Cancel) -> Result<u64> {
        store.count_documents(&self.collection, &self.filter, cancel).await
    }
}
