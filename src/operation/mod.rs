//! One struct per operation this crate exposes to front ends, one file per
//! command. Each struct captures its inputs at construction time and
//! exposes an `execute` method that drives the [`crate::store::DocumentStore`].

pub mod count;
pub mod create_index;
pub mod delete;
pub mod drop_collection;
pub mod drop_index;
pub mod find;
pub mod insert;
pub mod list_collections;
pub mod list_indexes;
pub mod stats;
pub mod update;

pub use count::CountDocuments;
pub use create_index::CreateIndex;
pub use delete::{DeleteMany, DeleteOne};
pub use drop_collection::DropCollection;
pub use drop_index::DropIndex;
pub use find::{Find, FindOne};
pub use insert::Insert;
pub use list_collections::ListCollections;
pub use list_indexes::ListIndexes;
pub use stats::GetStats;
pub use update::{UpdateMany, UpdateOne};
