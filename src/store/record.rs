use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cache::cache_key;

/// One translated text as kept in the durable store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    /// Same value as the in-memory cache key
    pub id: String,
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(default = "default_usage_count")]
    pub usage_count: u64,
}

fn default_usage_count() -> u64 {
    1
}

impl TranslationRecord {
    pub fn new(
        original_text: &str,
        translated_text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Self {
        Self {
            id: cache_key(original_text, source_language, target_language),
            original_text: original_text.to_string(),
            translated_text: translated_text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            usage_count: 1,
        }
    }
}

/// Aggregate view over the durable store plus the live service state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationStats {
    pub total_translations: usize,
    pub by_target_language: BTreeMap<String, usize>,
    pub by_source_language: BTreeMap<String, usize>,
    /// Newest first
    pub recent: Vec<TranslationRecord>,
    pub cache_size: usize,
    pub queue_size: usize,
}

impl TranslationStats {
    /// Counts over `records`; `recent` is taken as given. Cache and queue sizes are left at zero.
    pub fn from_records(records: &[TranslationRecord], recent: Vec<TranslationRecord>) -> Self {
        let mut stats = Self {
            total_translations: records.len(),
            recent,
            ..Self::default()
        };
        for record in records {
            *stats.by_target_language.entry(record.target_language.clone()).or_insert(0) += 1;
            *stats.by_source_language.entry(record.source_language.clone()).or_insert(0) += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_matches_cache_key() {
        let record = TranslationRecord::new("Hello", "Bonjour", "en", "fr");
        assert_eq!(record.id, "en_fr_15fz5e");
        assert_eq!(record.usage_count, 1);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = TranslationRecord::new("Hello", "Bonjour", "en", "fr");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["originalText"], "Hello");
        assert_eq!(json["translatedText"], "Bonjour");
        assert_eq!(json["targetLanguage"], "fr");
        assert_eq!(json["usageCount"], 1);
    }

    #[test]
    fn test_stats_counts_per_language() {
        let records = vec![
            TranslationRecord::new("Hello", "Bonjour", "en", "fr"),
            TranslationRecord::new("Bye", "Au revoir", "en", "fr"),
            TranslationRecord::new("Hello", "Hola", "en", "es"),
        ];
        let stats = TranslationStats::from_records(&records, Vec::new());

        assert_eq!(stats.total_translations, 3);
        assert_eq!(stats.by_target_language["fr"], 2);
        assert_eq!(stats.by_target_language["es"], 1);
        assert_eq!(stats.by_source_language["en"], 3);
    }
}
