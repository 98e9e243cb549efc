use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Result, LinguaError};
use super::{DocumentStore, INDEXES, RecordTable, STORE_NAME, TranslationRecord};

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    store: String,
    version: u32,
    key_path: String,
    indexes: Vec<String>,
    #[serde(default)]
    records: Vec<TranslationRecord>,
}

impl StoreFile {
    fn new(records: Vec<TranslationRecord>) -> Self {
        Self {
            store: STORE_NAME.to_string(),
            version: SCHEMA_VERSION,
            key_path: "id".to_string(),
            indexes: INDEXES.iter().map(|index| index.to_string()).collect(),
            records,
        }
    }
}

/// Record store persisted as a single JSON document.
///
/// The whole table is held in memory and the file is rewritten on every put
/// through a temporary file and a rename, so readers never see a torn write.
pub struct JsonFileStore {
    path: PathBuf,
    table: Mutex<RecordTable>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating the file and schema on first use.
    /// Opening an existing store leaves it untouched.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let table = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            let file: StoreFile = serde_json::from_str(&content).map_err(|e| {
                LinguaError::Store(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            if file.store != STORE_NAME {
                return Err(LinguaError::Store(format!(
                    "{} holds store '{}', expected '{}'",
                    path.display(), file.store, STORE_NAME
                )));
            }
            debug!("Opened record store {} with {} records", path.display(), file.records.len());
            RecordTable::from_records(file.records)
        } else {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            write_atomically(&path, &StoreFile::new(Vec::new())).await?;
            info!("Created record store at {}", path.display());
            RecordTable::default()
        };

        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn write_atomically(path: &Path, file: &StoreFile) -> Result<()> {
    let content = serde_json::to_string_pretty(file)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn put(&self, record: TranslationRecord) -> Result<()> {
        // Lock held through the write so concurrent puts land in order
        let mut table = self.table.lock().await;
        table.upsert(record);
        write_atomically(&self.path, &StoreFile::new(table.all())).await
    }

    async fn get(&self, id: &str) -> Result<Option<TranslationRecord>> {
        Ok(self.table.lock().await.get(id))
    }

    async fn get_all(&self) -> Result<Vec<TranslationRecord>> {
        Ok(self.table.lock().await.all())
    }

    async fn by_target_language(&self, code: &str) -> Result<Vec<TranslationRecord>> {
        Ok(self.table.lock().await.by_target_language(code))
    }

    async fn by_source_language(&self, code: &str) -> Result<Vec<TranslationRecord>> {
        Ok(self.table.lock().await.by_source_language(code))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TranslationRecord>> {
        Ok(self.table.lock().await.recent(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    #[tokio::test]
    async fn test_first_open_creates_schema() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("data/translations.json");

        let store = JsonFileStore::open(file.path()).await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("\"store\": \"translations\""));
        assert!(content.contains("targetLanguage"));
    }

    #[tokio::test]
    async fn test_reopen_keeps_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("translations.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.put(TranslationRecord::new("Hello", "Bonjour", "en", "fr")).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let record = reopened.get("en_fr_15fz5e").await.unwrap().unwrap();
        assert_eq!(record.translated_text, "Bonjour");
        assert_eq!(reopened.by_target_language("fr").await.unwrap().len(), 1);

        // Idempotent open of an existing store
        drop(reopened);
        let again = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(again.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_store_name_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("other.json");
        file.write_str(r#"{"store":"orders","version":1,"keyPath":"id","indexes":[],"records":[]}"#)
            .unwrap();

        let result = JsonFileStore::open(file.path()).await;
        assert!(matches!(result, Err(LinguaError::Store(_))));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_store_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("translations.json");
        file.write_str("{not json").unwrap();

        assert!(matches!(JsonFileStore::open(file.path()).await, Err(LinguaError::Store(_))));
    }
}
