//! `DeleteOne(coll, f)` / `DeleteMany(coll, f)`.

use bson::Document;

use crate::cancel::Cancel;
use crate::error::Result;
use crate::results::DeleteResult;
use crate::store::DocumentStore;

pub struct DeleteOne {
    collection: String,
    filter: Document,
}

impl DeleteOne {
    pub fn new(collection: impl Into<String>, filter: Document) -> Self {
        DeleteOne {
            collection: collection.into(),
            filter,
        }
    }

    pub async fn execute(self, store: &DocumentStore, cancel: &Cancel) -> Result<DeleteResult> {
        let result = store.delete(&self.collection, &self.filter, false, cancel).await?;
        Ok(result.into())
    }
}

pub struct DeleteMany {
    collection: String,
    filter: Document,
}

impl DeleteMany {
    pub fn new(collection: impl Into<String>, filter: Document) -> Self {
        DeleteMany {
            collection: collection.into(),
            filter,
        }
    }

    pub async fn execute(self, store: &DocumentStore, cancel: &Cancel) -> Result<DeleteResult> {
        let result = store.delete(&self.collection, &self.filter, true, cancel).await?;
        Ok(result.into())
    }
}
