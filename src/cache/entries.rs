use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;

/// Cache contents in insertion order, oldest first.
///
/// Serialized as a plain JSON object of key → translation. The object's
/// member order carries the age of each entry, so a restored cache evicts
/// the same entries the live one would have.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntries(Vec<(String, String)>);

impl CacheEntries {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last value written for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl From<Vec<(String, String)>> for CacheEntries {
    fn from(entries: Vec<(String, String)>) -> Self {
        Self(entries)
    }
}

impl IntoIterator for CacheEntries {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for CacheEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

struct EntriesVisitor;

impl<'de> Visitor<'de> for EntriesVisitor {
    type Value = CacheEntries;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping cache keys to translations")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            entries.push((key, value));
        }
        Ok(CacheEntries(entries))
    }
}

impl<'de> Deserialize<'de> for CacheEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order_survives_json() {
        let entries = CacheEntries::from(vec![
            ("zz".to_string(), "old".to_string()),
            ("aa".to_string(), "new".to_string()),
        ]);

        let json = serde_json::to_string(&entries).unwrap();
        assert_eq!(json, r#"{"zz":"old","aa":"new"}"#);

        let parsed: CacheEntries = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["zz", "aa"]);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(serde_json::from_str::<CacheEntries>("[]").is_err());
        assert!(serde_json::from_str::<CacheEntries>(r#"{"k":1}"#).is_err());
    }
}
