// Durable storage
//
// Two stores back the service:
// - DocumentStore: one table of TranslationRecord keyed by id, with
//   secondary indexes on targetLanguage, sourceLanguage and timestamp
// - KeyValueStore: plain string slots, used for the cache blob
//
// Both have an in-memory implementation for tests and embedding, and a
// file-backed implementation used by the CLI.

pub mod json_file;
pub mod kv;
pub mod memory;
pub mod record;
pub mod table;

use async_trait::async_trait;

pub use json_file::JsonFileStore;
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use memory::MemoryStore;
pub use record::{TranslationRecord, TranslationStats};
pub use table::RecordTable;
use crate::error::Result;

/// Name of the record table
pub const STORE_NAME: &str = "translations";

/// Indexed fields of the record table
pub const INDEXES: [&str; 3] = ["targetLanguage", "sourceLanguage", "timestamp"];

/// Durable record store shared across sessions
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or replace by `record.id`
    async fn put(&self, record: TranslationRecord) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<TranslationRecord>>;

    /// Every record, oldest first
    async fn get_all(&self) -> Result<Vec<TranslationRecord>>;

    async fn by_target_language(&self, code: &str) -> Result<Vec<TranslationRecord>>;

    async fn by_source_language(&self, code: &str) -> Result<Vec<TranslationRecord>>;

    /// Up to `limit` records, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<TranslationRecord>>;
}
