//! `Find(coll, filter, opts)` / `FindOne(coll, filter, opts)`.

use bson::Document;
use typed_builder::TypedBuilder;

use crate::cancel::Cancel;
use crate::error::Result;
use crate::sort::SortSpec;
use crate::store::{DocumentStore, FindOptions as StoreFindOptions};

/// Options accepted by [`Find`].
#[derive(Clone, Debug, Default, TypedBuilder)]
pub struct FindOptions {
    #[builder(default, setter(strip_option))]
    pub projection: Option<Document>,
    #[builder(default, setter(strip_option))]
    pub sort: Option<SortSpec>,
    #[builder(default, setter(strip_option))]
    pub limit: Option<usize>,
    #[builder(default)]
    pub skip: usize,
}

impl From<FindOptions> for StoreFindOptions {
    fn from(o: FindOptions) -> Self {
        StoreFindOptions {
            projection: o.projection,
            sort: o.sort,
            limit: o.limit,
            skip: o.skip,
        }
    }
}

pub struct Find {
    collection: String,
    filter: Document,
    options: FindOptions,
}

impl Find {
    pub fn new(collection: impl Into<String>, filter: Document, options: FindOptions) -> Self {
        Find {
            collection: collection.into(),
            filter,
            options,
        }
    }

    pub async fn execute(self, store: &DocumentStore, cancel: &Cancel) -> Result<Vec<Document>> {
        store
            .find(&self.collection, &self.filter, self.options.into(), cancel)
            .await
    }
}

pub struct FindOne {
    collection: String,
    filter: Document,
    projection: Option<Document>,
}

impl FindOne {
    pub fn new(collection: impl Into<String>, filter: Document, projection: Option<Document>) -> Self {
        FindOne {
            collection: collection.into(),
            filter,
            projection,
        }
    }

    pub async fn execute(self, store: &DocumentStore, cancel: &Cancel) -> Result<Option<Document>> {
        store
            .find_one(&self.collection, &self.filter, self.projection, cancel)
            .await
    }
}
