use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use super::{DocumentStore, RecordTable, TranslationRecord};

/// Record store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<RecordTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(&self, record: TranslationRecord) -> Result<()> {
        self.table.lock().await.upsert(record);
        Ok(())
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

    #[test]
    fn test_put_get_and_indexes() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store.put(TranslationRecord::new("Hello", "Bonjour", "en", "fr")).await.unwrap();
            store.put(TranslationRecord::new("Hello", "Hallo", "en", "de")).await.unwrap();
            store.put(TranslationRecord::new("Hello", "Salut", "en", "fr")).await.unwrap();

            assert_eq!(store.len().await, 2);
            let record = store.get("en_fr_15fz5e").await.unwrap().unwrap();
            assert_eq!(record.translated_text, "Salut");
            assert_eq!(store.by_source_language("en").await.unwrap().len(), 2);
            assert_eq!(store.recent(1).await.unwrap().len(), 1);
            assert!(store.get("missing").await.unwrap().is_none());
        });
    }
}
