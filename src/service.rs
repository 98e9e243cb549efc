//! Translation service: cache, durable store, offline queue and provider
//! composed into one `translate` call that always yields a string.
//!
//! The application root constructs one service, shares it behind an `Arc`
//! and owns its lifecycle (`init`, `dispose`). Concurrent misses for the same
//! text are not coalesced; both callers reach the provider and the last
//! write wins.

use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntries, TranslationCache, cache_key};
use crate::config::{Config, ProviderConfig};
use crate::connectivity::ConnectivityProvider;
use crate::error::{Result, LinguaError};
use crate::provider::{GeminiProvider, TranslationProvider};
use crate::queue::{OfflineQueue, PendingTranslation};
use crate::store::{DocumentStore, KeyValueStore, TranslationRecord, TranslationStats};
use crate::transfer::ExportBundle;

/// Key-value slot holding the serialized in-memory cache
pub const CACHE_BLOB_KEY: &str = "translation_cache";

/// Outcome of one offline queue drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub processed: usize,
    pub requeued: usize,
}

pub struct TranslationService {
    cache: Mutex<TranslationCache>,
    queue: Mutex<OfflineQueue>,
    /// Serializes snapshot-and-write of the cache blob
    persist_lock: Mutex<()>,
    provider: RwLock<Option<Arc<dyn TranslationProvider>>>,
    store: Arc<dyn DocumentStore>,
    kv: Arc<dyn KeyValueStore>,
    connectivity: Arc<dyn ConnectivityProvider>,
    provider_config: ProviderConfig,
}

impl TranslationService {
    pub fn new(
        config: &Config,
        store: Arc<dyn DocumentStore>,
        kv: Arc<dyn KeyValueStore>,
        connectivity: Arc<dyn ConnectivityProvider>,
    ) -> Self {
        Self {
            cache: Mutex::new(TranslationCache::new(config.cache.max_entries)),
            queue: Mutex::new(OfflineQueue::new(config.queue.max_pending)),
            persist_lock: Mutex::new(()),
            provider: RwLock::new(None),
            store,
            kv,
            connectivity,
            provider_config: config.provider.clone(),
        }
    }

    /// Load the persisted cache blob into memory. Returns the number of entries restored.
    pub async fn restore_cache(&self) -> usize {
        let blob = match self.kv.get(CACHE_BLOB_KEY).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return 0,
            Err(e) => {
                warn!("Failed to read cached translations: {}", e);
                return 0;
            }
        };

        match serde_json::from_str::<CacheEntries>(&blob) {
            Ok(entries) => {
                let mut cache = self.cache.lock().await;
                cache.replace(entries);
                info!("Restored {} cached translations", cache.len());
                cache.len()
            }
            Err(e) => {
                warn!("Ignoring unreadable translation cache blob: {}", e);
                0
            }
        }
    }

    /// Configure the default provider with an API credential
    pub async fn init(&self, api_key: &str) -> Result<()> {
        if api_key.trim().is_empty() {
            return Err(LinguaError::Config("API key must not be empty".to_string()));
        }
        let provider = GeminiProvider::new(api_key, self.provider_config.clone())?;
        self.init_with_provider(Arc::new(provider)).await;
        Ok(())
    }

    pub async fn init_with_provider(&self, provider: Arc<dyn TranslationProvider>) {
        info!("Translation provider '{}' initialized", provider.name());
        *self.provider.write().await = Some(provider);
    }

    pub async fn is_initialized(&self) -> bool {
        self.provider.read().await.is_some()
    }

    /// Drop the provider and flush the cache blob. Queued entries stay in memory.
    pub async fn dispose(&self) {
        self.provider.write().await.take();
        self.persist_cache_blob().await;
        let pending = self.queue.lock().await.len();
        if pending > 0 {
            warn!("Translation service disposed with {} pending translations", pending);
        }
        info!("Translation service disposed");
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Translate `text`, degrading to the original text when no translation
    /// can be produced right now. Never fails.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> String {
        if text.trim().is_empty() || source_language.eq_ignore_ascii_case(target_language) {
            return text.to_string();
        }

        if let Some(cached) = self.lookup(text, target_language, source_language).await {
            return cached;
        }

        match self.translate_live(text, target_language, source_language).await {
            Ok(translated) => translated,
            Err(e) => {
                match &e {
                    LinguaError::Offline | LinguaError::ProviderUnavailable => {
                        debug!("Queueing translation to {}: {}", target_language, e)
                    }
                    _ => warn!("Translation to {} failed, queueing: {}", target_language, e),
                }
                self.queue.lock().await.enqueue(text, target_language, source_language);
                text.to_string()
            }
        }
    }

    /// Translate each text in order, one provider call at a time
    pub async fn translate_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        target_language: &str,
        source_language: &str,
    ) -> Vec<String> {
        self.translate_batch_with_progress(texts, target_language, source_language, |_| {})
            .await
    }

    /// `translate_batch`, calling `on_item` with the index of each finished text
    pub async fn translate_batch_with_progress<S, F>(
        &self,
        texts: &[S],
        target_language: &str,
        source_language: &str,
        mut on_item: F,
    ) -> Vec<String>
    where
        S: AsRef<str>,
        F: FnMut(usize),
    {
        let mut translated = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            translated.push(self.translate(text.as_ref(), target_language, source_language).await);
            on_item(index);
        }
        translated
    }

    /// Cached translation from memory, falling back to the durable store
    pub async fn lookup(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Option<String> {
        let key = cache_key(text, source_language, target_language);

        if let Some(hit) = self.cache.lock().await.get_by_key(&key) {
            debug!("Translation cache hit: {}", key);
            return Some(hit);
        }

        let mut record = match self.store.get(&key).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read stored translation {}: {}", key, e);
                return None;
            }
        };

        debug!("Stored translation hit: {}", key);
        record.usage_count += 1;
        let translated = record.translated_text.clone();
        self.cache.lock().await.put_by_key(key.clone(), translated.clone());
        if let Err(e) = self.store.put(record).await {
            warn!("Failed to update usage of {}: {}", key, e);
        }
        Some(translated)
    }

    /// Retry every queued translation once. Entries that fail again go back on the queue.
    pub async fn process_queue(&self) -> DrainReport {
        let pending = self.queue.lock().await.take_all();
        let mut report = DrainReport::default();
        if pending.is_empty() {
            return report;
        }

        info!("Processing {} queued translations", pending.len());
        for entry in pending {
            if self.lookup(&entry.text, &entry.target_language, &entry.source_language).await.is_some() {
                report.processed += 1;
                continue;
            }

            match self.translate_live(&entry.text, &entry.target_language, &entry.source_language).await {
                Ok(_) => report.processed += 1,
                Err(e) => {
                    debug!("Queued translation to {} failed again: {}", entry.target_language, e);
                    self.queue.lock().await.requeue(entry);
                    report.requeued += 1;
                }
            }
        }
        report
    }

    pub async fn stats(&self, recent: usize) -> TranslationStats {
        let records = self.store.get_all().await.unwrap_or_else(|e| {
            warn!("Failed to read stored translations: {}", e);
            Vec::new()
        });
        let newest = self.store.recent(recent).await.unwrap_or_else(|e| {
            warn!("Failed to read recent translations: {}", e);
            Vec::new()
        });

        let mut stats = TranslationStats::from_records(&records, newest);
        stats.cache_size = self.cache_len().await;
        stats.queue_size = self.queue_len().await;
        stats
    }

    /// Stored records, optionally narrowed to one target and/or source language
    pub async fn records(
        &self,
        target_language: Option<&str>,
        source_language: Option<&str>,
    ) -> Result<Vec<TranslationRecord>> {
        let mut records = match (target_language, source_language) {
            (Some(target), _) => self.store.by_target_language(target).await?,
            (None, Some(source)) => self.store.by_source_language(source).await?,
            (None, None) => self.store.get_all().await?,
        };
        if let (Some(_), Some(source)) = (target_language, source_language) {
            records.retain(|record| record.source_language == source);
        }
        Ok(records)
    }

    /// Empty the in-memory cache and its persisted blob. Stored records are kept.
    pub async fn clear_cache(&self) {
        let _persist = self.persist_lock.lock().await;
        self.cache.lock().await.clear();
        if let Err(e) = self.kv.remove(CACHE_BLOB_KEY).await {
            warn!("Failed to remove cached translations: {}", e);
        }
        info!("Translation cache cleared");
    }

    pub async fn export(&self) -> Result<ExportBundle> {
        let translations = self.store.get_all().await?;
        let cache = self.cache.lock().await.snapshot();
        Ok(ExportBundle::new(translations, cache))
    }

    /// Upsert every record and, when the bundle carries one, replace the in-memory cache
    pub async fn import(&self, bundle: ExportBundle) -> Result<usize> {
        let count = bundle.translations.len();
        for record in bundle.translations {
            self.store.put(record).await?;
        }

        if let Some(cache) = bundle.cache {
            self.cache.lock().await.replace(cache);
            self.persist_cache_blob().await;
        }

        info!("Imported {} translations", count);
        Ok(count)
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn queue_len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn pending(&self) -> Vec<PendingTranslation> {
        self.queue.lock().await.pending()
    }

    async fn translate_live(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<String> {
        if !self.connectivity.is_online() {
            return Err(LinguaError::Offline);
        }
        let provider = self.provider
            .read()
            .await
            .clone()
            .ok_or(LinguaError::ProviderUnavailable)?;

        let translated = provider.translate(text, target_language, source_language).await?;
        self.remember(text, target_language, source_language, &translated).await;
        Ok(translated)
    }

    async fn remember(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
        translated: &str,
    ) {
        let key = self.cache.lock().await.put(text, source_language, target_language, translated);
        let record = TranslationRecord::new(text, translated, source_language, target_language);
        if let Err(e) = self.store.put(record).await {
            warn!("Failed to persist translation {}: {}", key, e);
        }
        self.persist_cache_blob().await;
    }

    async fn persist_cache_blob(&self) {
        // Held across snapshot and write so an older snapshot never lands last
        let _persist = self.persist_lock.lock().await;
        let snapshot = self.cache.lock().await.snapshot();
        let blob = match serde_json::to_string(&snapshot) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Failed to serialize translation cache: {}", e);
                return;
            }
        };
        if let Err(e) = self.kv.set(CACHE_BLOB_KEY, &blob).await {
            warn!("Failed to persist translation cache: {}", e);
        }
    }
}
