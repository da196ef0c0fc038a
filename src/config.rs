//! Tunables for the document store, collected in one place rather than
//! scattered across call sites as inline constants.

use typed_builder::TypedBuilder;

/// Configuration for a [`crate::store::DocumentStore`].
/// `StoreConfig::default()` reproduces the engine's stock limits.
#[derive(Clone, Debug, TypedBuilder)]
#[builder(field_defaults(default))]
pub struct StoreConfig {
    /// Maximum serialized size of a single document. Default 1 MiB.
    #[builder(default = 1024 * 1024)]
    pub max_document_bytes: usize,

    /// Maximum length of a string value's index encoding. Default 1024.
    #[builder(default = 1024)]
    pub max_index_string_bytes: usize,

    /// Row count per chunk for index builds, drop scans, and collection
    /// scans. Default 5000.
    #[builder(default = 5000)]
    pub scan_chunk_size: usize,

    /// Default `find` limit when the caller specifies none. Default 1000.
    #[builder(default = 1000)]
    pub default_find_limit: usize,

    /// Hard ceiling an explicit `find` limit is clamped to. Default 5000.
    #[builder(default = 5000)]
    pub max_find_limit: usize,

    /// Cap on documents scanned before an in-memory sort is applied.
    /// Default 50,000.
    #[builder(default = 50_000)]
    pub sort_eval_cap: usize,

    /// Cap on documents touched by a single `updateMany`. Default 50,000.
    #[builder(default = 50_000)]
    pub update_many_cap: usize,

    /// Cap on documents scanned by `countDocuments` with a non-empty
    /// filter. Default 100,000.
    #[builder(default = 100_000)]
    pub count_filtered_cap: usize,

    /// Maximum number of elements accepted in an `$in`/`$nin` array.
    /// Default 2000.
    #[builder(default = 2000)]
    pub max_in_array_len: usize,

    /// Maximum recursion depth for input sanitization. Default 20.
    #[builder(default = 20)]
    pub max_sanitize_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::builder().build()
    }
}
