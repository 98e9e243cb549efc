// In-memory translation cache
//
// Keys come from `hash::cache_key`. The map is bounded: once `max_entries`
// is reached the oldest insertion is evicted. Evicted translations are still
// in the durable record store, so the service recovers them on the next miss.

pub mod entries;
pub mod hash;

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub use entries::CacheEntries;
pub use hash::{cache_key, rolling_hash};

#[derive(Debug, Clone)]
struct Slot {
    translated: String,
    sequence: u64,
}

/// Bounded map from cache key to translated text
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<String, Slot>,
    /// Insertion sequence → key, oldest first
    order: BTreeMap<u64, String>,
    next_sequence: u64,
    max_entries: usize,
}

impl TranslationCache {
    /// `max_entries == 0` disables eviction
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::default()
        }
    }

    pub fn get(&self, text: &str, source_language: &str, target_language: &str) -> Option<String> {
        self.get_by_key(&cache_key(text, source_language, target_language))
    }

    pub fn get_by_key(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|slot| slot.translated.clone())
    }

    /// Insert or overwrite; returns the key used
    pub fn put(
        &mut self,
        text: &str,
        source_language: &str,
        target_language: &str,
        translated: &str,
    ) -> String {
        let key = cache_key(text, source_language, target_language);
        self.put_by_key(key.clone(), translated.to_string());
        key
    }

    pub fn put_by_key(&mut self, key: String, translated: String) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if let Some(previous) = self.entries.insert(key.clone(), Slot { translated, sequence }) {
            self.order.remove(&previous.sequence);
        }
        self.order.insert(sequence, key);
        self.evict_overflow();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Key → translation view, oldest insertion first, as persisted in the
    /// cache blob and exports
    pub fn snapshot(&self) -> CacheEntries {
        self.order
            .values()
            .filter_map(|key| {
                self.entries
                    .get(key)
                    .map(|slot| (key.clone(), slot.translated.clone()))
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Replace every entry with `entries` in iteration order, subject to the size bound
    pub fn replace(&mut self, entries: impl IntoIterator<Item = (String, String)>) {
        self.clear();
        for (key, translated) in entries {
            self.put_by_key(key, translated);
        }
    }

    fn evict_overflow(&mut self) {
        if self.max_entries == 0 {
            return;
        }
        while self.entries.len() > self.max_entries {
            let Some((_, oldest)) = self.order.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
            debug!("Evicted translation cache entry {}", oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let mut cache = TranslationCache::new(0);
        let key = cache.put("Hello", "en", "fr", "Bonjour");

        assert_eq!(key, "en_fr_15fz5e");
        assert_eq!(cache.get("Hello", "en", "fr").as_deref(), Some("Bonjour"));
        assert_eq!(cache.get("Hello", "en", "de"), None);
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let mut cache = TranslationCache::new(0);
        cache.put("Hello", "en", "fr", "Bonjour");
        cache.put("Hello", "en", "fr", "Salut");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("Hello", "en", "fr").as_deref(), Some("Salut"));
    }

    #[test]
    fn test_oldest_insertion_evicted_when_full() {
        let mut cache = TranslationCache::new(2);
        cache.put("one", "en", "fr", "un");
        cache.put("two", "en", "fr", "deux");
        cache.put("three", "en", "fr", "trois");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("one", "en", "fr"), None);
        assert!(cache.get("two", "en", "fr").is_some());
        assert!(cache.get("three", "en", "fr").is_some());
    }

    #[test]
    fn test_overwrite_refreshes_position() {
        let mut cache = TranslationCache::new(2);
        cache.put("one", "en", "fr", "un");
        cache.put("two", "en", "fr", "deux");
        cache.put("one", "en", "fr", "un!");
        cache.put("three", "en", "fr", "trois");

        assert_eq!(cache.get("one", "en", "fr").as_deref(), Some("un!"));
        assert_eq!(cache.get("two", "en", "fr"), None);
    }

    #[test]
    fn test_clear_and_replace() {
        let mut cache = TranslationCache::new(0);
        cache.put("Hello", "en", "fr", "Bonjour");
        let snapshot = cache.snapshot();

        cache.clear();
        assert!(cache.is_empty());

        cache.replace(snapshot);
        assert_eq!(cache.get("Hello", "en", "fr").as_deref(), Some("Bonjour"));
    }

    #[test]
    fn test_snapshot_is_oldest_first() {
        let mut cache = TranslationCache::new(0);
        cache.put_by_key("zz".to_string(), "1".to_string());
        cache.put_by_key("aa".to_string(), "2".to_string());
        cache.put_by_key("zz".to_string(), "3".to_string());

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["aa", "zz"]);
        assert_eq!(snapshot.get("zz"), Some("3"));
    }

    #[test]
    fn test_restored_snapshot_evicts_by_age() {
        let mut live = TranslationCache::new(0);
        for key in ["m", "z", "a"] {
            live.put_by_key(key.to_string(), key.to_uppercase());
        }

        let mut restored = TranslationCache::new(2);
        restored.replace(live.snapshot());
        assert!(!restored.contains_key("m"));
        assert!(restored.contains_key("z"));
        assert!(restored.contains_key("a"));
    }

    #[test]
    fn test_replace_respects_bound() {
        let mut cache = TranslationCache::new(1);
        cache.replace(vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key("b"));
    }
}
