use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::cache::CacheEntries;
use crate::error::{Result, LinguaError};
use crate::service::TranslationService;
use crate::store::TranslationRecord;

pub const EXPORT_VERSION: &str = "1.0";

/// Portable dump of the durable store plus the in-memory cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub translations: Vec<TranslationRecord>,
    /// Missing on import means "leave the in-memory cache alone"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheEntries>,
    #[serde(default)]
    pub export_date: String,
    #[serde(default)]
    pub version: String,
}

impl ExportBundle {
    pub fn new(translations: Vec<TranslationRecord>, cache: CacheEntries) -> Self {
        Self {
            translations,
            cache: Some(cache),
            export_date: chrono::Utc::now().to_rfc3339(),
            version: EXPORT_VERSION.to_string(),
        }
    }

    /// Parse and sanity-check an exported document
    pub fn from_json(content: &str) -> Result<Self> {
        let bundle: ExportBundle = serde_json::from_str(content)
            .map_err(|e| LinguaError::Import(format!("Malformed export file: {}", e)))?;

        if let Some(record) = bundle.translations.iter().find(|r| r.id.trim().is_empty()) {
            return Err(LinguaError::Import(format!(
                "Translation record without id (original text: {:?})",
                record.original_text
            )));
        }
        Ok(bundle)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write every stored translation and the current cache to `path`. Returns the record count.
pub async fn export_to_file<P: AsRef<Path>>(service: &TranslationService, path: P) -> Result<usize> {
    let path = path.as_ref();
    let bundle = service.export().await?;
    tokio::fs::write(path, bundle.to_json()?).await?;
    info!("Exported {} translations to {}", bundle.translations.len(), path.display());
    Ok(bundle.translations.len())
}

/// Load an export produced by `export_to_file` into `service`
pub async fn import_from_file<P: AsRef<Path>>(service: &TranslationService, path: P) -> Result<usize> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LinguaError::Import(format!("Failed to read {}: {}", path.display(), e)))?;
    service.import(ExportBundle::from_json(&content)?).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_shape() {
        let cache = CacheEntries::from(vec![("en_fr_15fz5e".to_string(), "Bonjour".to_string())]);
        let bundle = ExportBundle::new(
            vec![TranslationRecord::new("Hello", "Bonjour", "en", "fr")],
            cache,
        );

        let json: serde_json::Value = serde_json::from_str(&bundle.to_json().unwrap()).unwrap();
        assert_eq!(json["version"], "1.0");
        assert!(json["exportDate"].as_str().unwrap().contains('T'));
        assert_eq!(json["cache"]["en_fr_15fz5e"], "Bonjour");
        assert_eq!(json["translations"][0]["id"], "en_fr_15fz5e");
    }

    #[test]
    fn test_cache_order_kept_on_import() {
        let bundle = ExportBundle::from_json(r#"{"translations":[],"cache":{"b":"2","a":"1"}}"#).unwrap();
        let cache = bundle.cache.unwrap();
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_cache_field_is_optional() {
        let bundle = ExportBundle::from_json(r#"{"translations":[]}"#).unwrap();
        assert!(bundle.cache.is_none());
        assert!(bundle.translations.is_empty());
    }

    #[test]
    fn test_malformed_payloads_rejected() {
        assert!(matches!(ExportBundle::from_json("[]"), Err(LinguaError::Import(_))));
        assert!(matches!(ExportBundle::from_json(r#"{"cache":{}}"#), Err(LinguaError::Import(_))));
        assert!(matches!(
            ExportBundle::from_json(r#"{"translations":[{"id":"x"}]}"#),
            Err(LinguaError::Import(_))
        ));
    }

    #[test]
    fn test_record_without_id_rejected() {
        let payload = r#"{"translations":[{
            "id":"", "originalText":"Hello", "translatedText":"Bonjour",
            "sourceLanguage":"en", "targetLanguage":"fr", "timestamp":1
        }]}"#;
        assert!(matches!(ExportBundle::from_json(payload), Err(LinguaError::Import(_))));
    }
}
