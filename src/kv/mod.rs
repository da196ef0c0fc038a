//! The ordered KV substrate interface this crate is built on.
//! The substrate itself — in-memory sorted map, or a remote store — is an
//! external collaborator and out of scope for this crate's core; only the
//! trait contract it must satisfy lives here. [`memory`] ships one
//! reference implementation so the rest of the crate is runnable and
//! testable standalone.

pub mod memory;

use crate::error::Result;
use async_trait::async_trait;

/// One `(key, value)` pair as returned by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Options for a range/prefix scan. Ascending by default.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// When set, matches only keys starting with this byte string. Mutually
    /// exclusive with `start_key`/`end_key` in spirit, but a substrate may
    /// combine `prefix` with `start_key` for chunked resumption.
    pub prefix: Option<Vec<u8>>,
    /// Inclusive lower bound.
    pub start_key: Option<Vec<u8>>,
    /// Exclusive upper bound.
    pub end_key: Option<Vec<u8>>,
    /// Caps the number of entries returned; `None` means unbounded (callers
    /// in this crate never actually leave this unset — every scan site
    /// supplies its own chunk size).
    pub limit: Option<usize>,
    pub reverse: bool,
}

/// A batch of puts and deletes applied atomically when the substrate
/// supports it.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub puts: Vec<(Vec<u8>, Vec<u8>)>,
    pub deletes: Vec<Vec<u8>>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.puts.push((key, value));
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.deletes.push(key);
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }
}

/// The ordered key-value substrate contract every other module in this
/// crate is written against. A conforming implementation need not be
/// persistent or replicated — it only needs to preserve byte-lexicographic
/// key order and point-in-time semantics: no long-lived cursors, every
/// call is a single bounded round trip.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<()>;

    /// Returns whether the key existed prior to deletion.
    async fn delete(&self, key: &[u8]) -> Result<bool>;

    async fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Ordered entries matching `options`, ascending unless `reverse` is set.
    async fn scan(&self, options: ScanOptions) -> Result<Vec<KvEntry>>;

    /// Number of keys under `prefix`, or the total key count if `prefix` is
    /// `None`. Used only for informational stats, never for query
    /// correctness.
    async fn count(&self, prefix: Option<&[u8]>) -> Result<u64>;

    /// Removes every key. Used only by tests and teardown.
    async fn clear(&self) -> Result<()>;

    /// Applies every put and delete in `batch`. When the substrate supports
    /// atomic batches this is all-or-nothing; the in-memory reference
    /// implementation applies deletes then puts under a single write lock,
    /// which is atomic with respect to readers taking the same lock.
    async fn batch_write(&self, batch: Batch) -> Result<()>;
}
