//! `Insert(coll, docs[])`.

use bson::Document;

use crate::cancel::Cancel;
use crate::error::Result;
use crate::results::InsertManyResult;
use crate::store::DocumentStore;

pub struct Insert {
    collection: String,
    documents: Vec<Document>,
}

impl Insert {
    pub fn new(collection: impl Into<String>, documents: Vec<Document>) -> Self {
        Insert {
            collection: collection.into(),
            documents,
        }
    }

    pub async fn execute(
        self,
        store: &DocumentStore,
        now_millis: i64,
        cancel: &Cancel,
    ) -> Result<InsertManyResult> {
        let result = store
            .insert(&self.collection, self.documents, now_millis, cancel)
            .await?;
        Ok(result.into())
    }
}
