//! `UpdateOne(coll, f, u, o)` / `UpdateMany(coll, f, u, o)`.

use bson::Document;
use typed_builder::TypedBuilder;

use crate::cancel::Cancel;
use crate::error::Result;
use crate::results::UpdateResult;
use crate::store::{DocumentStore, UpdateOptions as StoreUpdateOptions};

#[derive(Clone, Debug, Default, TypedBuilder)]
pub struct UpdateOptions {
    #[builder(default)]
    pub upsert: bool,
}

impl From<UpdateOptions> for StoreUpdateOptions {
    fn from(o: UpdateOptions) -> Self {
        StoreUpdateOptions { upsert: o.upsert }
    }
}

pub struct UpdateOne {
    collection: String,
    filter: Document,
    update: Document,
    options: UpdateOptions,
}

impl UpdateOne {
    pub fn new(
        collection: impl Into<String>,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Self {
        UpdateOne {
            collection: collection.into(),
            filter,
            update,
            options,
        }
    }

    pub async fn execute(
        self,
        store: &DocumentStore,
        now_millis: i64,
        cancel: &Cancel,
    ) -> Result<UpdateResult> {
        let result = store
            .update(
                &self.collection,
                &self.filter,
                &self.update,
                self.options.into(),
                false,
                now_millis,
                cancel,
            )
            .await?;
        Ok(result.into())
    }
}

pub struct UpdateMany {
    collection: String,
    filter: Document,
    update: Document,
    options: UpdateOptions,
}

impl UpdateMany {
    pub fn new(
        collection: impl Into<String>,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Self {
        UpdateMany {
            collection: collection.into(),
            filter,
            update,
            options,
        }
    }

    pub async fn execute(
        self,
        store: &DocumentStore,
        now_millis: i64,
        cancel: &Cancel,
    ) -> Result<UpdateResult> {
        let result = store
            .update(
                &self.collection,
                &self.filter,
                &self.update,
                self.options.into(),
                true,
                now_millis,
                cancel,
            )
            .await?;
        Ok(result.into())
    }
}
