#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::cast_possible_truncation)]
#![warn(clippy::cast_possible_wrap)]

//! Storage engine core for a MongoDB-compatible document database, built
//! atop a generic ordered key-value substrate. Everything
//! outside this crate — HTTP and wire-protocol front ends, the KV
//! substrate's concrete backing store, metrics, SDKs — is an external
//! collaborator reached only through the [`kv::KvStore`] trait this crate
//! consumes and the [`operation`]/[`store::DocumentStore`] surface it
//! exposes.

pub mod cancel;
pub mod collection;
pub mod config;
pub mod error;
mod executor;
mod filter;
mod id;
mod index_manager;
mod key;
pub mod kv;
pub mod operation;
mod planner;
pub mod projection;
pub mod results;
mod sanitize;
pub mod sort;
pub mod store;
mod update_ops;
pub mod value;

pub use bson;

pub use crate::cancel::{Cancel, CancelHandle};
pub use crate::collection::{CollectionMetadata, Index};
pub use crate::config::StoreConfig;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::kv::memory::InMemoryKvStore;
pub use crate::kv::{Batch, KvEntry, KvStore, ScanOptions};
pub use crate::projection::Projection;
pub use crate::sort::SortSpec;
pub use crate::store::{DocumentStore, FindOptions, UpdateOptions};
pub use crate::value::{Doc, Value};
