use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// A translation that could not be served live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTranslation {
    pub text: String,
    pub target_language: String,
    pub source_language: String,
    /// Epoch milliseconds of the original request
    pub timestamp: i64,
}

impl PendingTranslation {
    pub fn new(text: &str, target_language: &str, source_language: &str) -> Self {
        Self {
            text: text.to_string(),
            target_language: target_language.to_string(),
            source_language: source_language.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// In-memory FIFO of pending translations. Lost on process exit.
///
/// Requests are not deduplicated. When `max_pending` is reached the oldest
/// entry is dropped to make room.
#[derive(Debug, Default)]
pub struct OfflineQueue {
    entries: VecDeque<PendingTranslation>,
    max_pending: usize,
}

impl OfflineQueue {
    /// `max_pending == 0` disables the cap
    pub fn new(max_pending: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_pending,
        }
    }

    pub fn enqueue(&mut self, text: &str, target_language: &str, source_language: &str) {
        self.push(PendingTranslation::new(text, target_language, source_language));
    }

    /// Put back an entry that failed again during a drain
    pub fn requeue(&mut self, entry: PendingTranslation) {
        self.push(entry);
    }

    /// Snapshot the queue and leave it empty
    pub fn take_all(&mut self) -> Vec<PendingTranslation> {
        self.entries.drain(..).collect()
    }

    pub fn pending(&self) -> Vec<PendingTranslation> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: PendingTranslation) {
        if self.max_pending > 0 && self.entries.len() >= self.max_pending {
            if let Some(dropped) = self.entries.pop_front() {
                warn!(
                    "Offline queue full ({} entries), dropping oldest request for {}",
                    self.max_pending, dropped.target_language
                );
            }
        }
        debug!("Queued translation to {} ({} pending)", entry.target_language, self.entries.len() + 1);
        self.entries.push_back(entry);
    }
}
