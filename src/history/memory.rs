use crate::error::PersistenceError;
use crate::history::{
    HistoryEntry, HistoryRecord, HistoryStore, collection_path, sort_newest_first,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use std::time::Duration;

/// In-process history store.
///
/// Can be told to fail every call or to delay appends, which lets tests
/// observe that a run never waits on persistence.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<HistoryRecord>>,
    failure: Option<PersistenceError>,
    delay: Option<Duration>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call with `error`.
    pub fn with_failure(mut self, error: PersistenceError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Fail every call as if security rules rejected it.
    pub fn denying(self) -> Self {
        self.with_failure(PersistenceError::PermissionDenied {
            path: "users/*/history".to_string(),
            operation: "create".to_string(),
        })
    }

    /// Sleep before each append.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of stored records across all users.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(
        &self,
        user_id: &str,
        entry: &HistoryEntry,
    ) -> Result<HistoryRecord, PersistenceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.failure {
            return Err(match error {
                PersistenceError::PermissionDenied { operation, .. } => {
                    PersistenceError::PermissionDenied {
                        path: collection_path(user_id),
                        operation: operation.clone(),
                    }
                }
                other => other.clone(),
            });
        }

        let record = HistoryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            video_name: entry.video_name.clone(),
            translated_text: entry.translated_text.clone(),
            target_language: entry.target_language.clone(),
            created_at: Utc::now(),
        };
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(record)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<HistoryRecord>, PersistenceError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let mut records: Vec<HistoryRecord> = self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut records);
        Ok(records)
    }
}
