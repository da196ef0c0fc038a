//! `InMemoryKvStore`: the reference `KvStore` implementation this crate
//! ships so it is buildable, testable, and embeddable standalone. A
//! `BTreeMap` keeps keys in byte order for free; an `RwLock` serializes
//! mutation while letting reads run concurrently — a reader can observe a
//! put that lands between two of a batch's writes only if it doesn't go
//! through `batch_write`, which this implementation applies under one
//! write-lock acquisition.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Batch, KvEntry, KvStore, ScanOptions};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
        // Smallest key that is strictly greater than every key starting
        // with `prefix`: increment the last byte that isn't already 0xFF,
        // dropping any trailing 0xFF bytes. `None` means "no upper bound"
        // (prefix is all 0xFF bytes, vanishingly unlikely for our text
        // prefixes).
        let mut end = prefix.to_vec();
        while let Some(&last) = end.last() {
            if last == 0xFF {
                end.pop();
            } else {
                *end.last_mut().unwrap() += 1;
                return Some(end);
            }
        }
        None
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().unwrap().get(key).cloned())
    }

    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        self.data.write().unwrap().insert(key, value);
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<bool> {
        Ok(self.data.write().unwrap().remove(key).is_some())
    }

    async fn scan(&self, options: ScanOptions) -> Result<Vec<KvEntry>> {
        let data = self.data.read().unwrap();

        let start_bound = match (&options.prefix, &options.start_key) {
            (_, Some(start)) => Bound::Included(start.clone()),
            (Some(prefix), None) => Bound::Included(prefix.clone()),
            (None, None) => Bound::Unbounded,
        };
        let end_bound = match (&options.prefix, &options.end_key) {
            (_, Some(end)) => Bound::Excluded(end.clone()),
            (Some(prefix), None) => match Self::prefix_end(prefix) {
                Some(end) => Bound::Excluded(end),
                None => Bound::Unbounded,
            },
            (None, None) => Bound::Unbounded,
        };

        let range = data.range((start_bound, end_bound));
        let mut entries: Vec<KvEntry> = if options.reverse {
            range
                .rev()
                .map(|(k, v)| KvEntry {
                    key: k.clone(),
                    value: v.clone(),
                })
                .collect()
        } else {
            range
                .map(|(k, v)| KvEntry {
                    key: k.clone(),
                    value: v.clone(),
                })
                .collect()
        };

        if let Some(limit) = options.limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }

    async fn count(&self, prefix: Option<&[u8]>) -> Result<u64> {
        let data = self.data.read().unwrap();
        match prefix {
            None => Ok(data.len() as u64),
            Some(prefix) => Ok(data.keys().filter(|k| k.starts_with(prefix)).count() as u64),
        }
    }

    async fn clear(&self) -> Result<()> {
        self.data.write().unwrap().clear();
        Ok(())
    }

    async fn batch_write(&self, batch: Batch) -> Result<()> {
        let mut data = self.data.write().unwrap();
        for key in batch.deletes {
            data.remove(&key);
        }
        for (key, value) in batch.puts {
            data.insert(key, value);
        }
        Ok(())
    }
}
