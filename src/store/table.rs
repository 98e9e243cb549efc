use std::collections::{BTreeSet, HashMap};

use super::record::TranslationRecord;

/// Single keyed table of records with non-unique secondary indexes on
/// target language, source language and timestamp
#[derive(Debug, Default)]
pub struct RecordTable {
    records: HashMap<String, TranslationRecord>,
    by_target: HashMap<String, BTreeSet<String>>,
    by_source: HashMap<String, BTreeSet<String>>,
    by_timestamp: BTreeSet<(i64, String)>,
}

impl RecordTable {
    pub fn from_records(records: impl IntoIterator<Item = TranslationRecord>) -> Self {
        let mut table = Self::default();
        for record in records {
            table.upsert(record);
        }
        table
    }

    /// Insert or replace by `id`
    pub fn upsert(&mut self, record: TranslationRecord) {
        if let Some(previous) = self.records.remove(&record.id) {
            self.unindex(&previous);
        }
        self.by_target
            .entry(record.target_language.clone())
            .or_default()
            .insert(record.id.clone());
        self.by_source
            .entry(record.source_language.clone())
            .or_default()
            .insert(record.id.clone());
        self.by_timestamp.insert((record.timestamp, record.id.clone()));
        self.records.insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<TranslationRecord> {
        self.records.get(id).cloned()
    }

    /// All records, oldest first
    pub fn all(&self) -> Vec<TranslationRecord> {
        self.by_timestamp
            .iter()
            .filter_map(|(_, id)| self.records.get(id).cloned())
            .collect()
    }

    pub fn by_target_language(&self, code: &str) -> Vec<TranslationRecord> {
        Self::lookup(&self.records, self.by_target.get(code))
    }

    pub fn by_source_language(&self, code: &str) -> Vec<TranslationRecord> {
        Self::lookup(&self.records, self.by_source.get(code))
    }

    /// Up to `limit` records, newest first
    pub fn recent(&self, limit: usize) -> Vec<TranslationRecord> {
        self.by_timestamp
            .iter()
            .rev()
            .take(limit)
            .filter_map(|(_, id)| self.records.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn lookup(
        records: &HashMap<String, TranslationRecord>,
        ids: Option<&BTreeSet<String>>,
    ) -> Vec<TranslationRecord> {
        ids.map(|ids| ids.iter().filter_map(|id| records.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    fn unindex(&mut self, record: &TranslationRecord) {
        if let Some(ids) = self.by_target.get_mut(&record.target_language) {
            ids.remove(&record.id);
            if ids.is_empty() {
                self.by_target.remove(&record.target_language);
            }
        }
        if let Some(ids) = self.by_source.get_mut(&record.source_language) {
            ids.remove(&record.id);
            if ids.is_empty() {
                self.by_source.remove(&record.source_language);
            }
        }
        self.by_timestamp.remove(&(record.timestamp, record.id.clone()));
    }
}
