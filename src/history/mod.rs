//! Per-user translation history.
//!
//! One record is appended per successful pipeline run. Records are never
//! updated by this crate. The store stamps the creation time.

#[cfg(feature = "http")]
pub mod firestore;
pub mod memory;

use crate::error::PersistenceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(feature = "http")]
pub use firestore::FirestoreHistoryStore;
pub use memory::MemoryHistoryStore;

/// What the caller asks to be remembered about a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub video_name: String,
    pub translated_text: String,
    pub target_language: String,
}

/// A stored history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub user_id: String,
    pub video_name: String,
    pub translated_text: String,
    pub target_language: String,
    pub created_at: DateTime<Utc>,
}

/// Collection path holding one user's records.
pub fn collection_path(user_id: &str) -> String {
    format!("users/{}/history", user_id)
}

/// Append-only history storage.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a record for `user_id`, returning it with its id and creation time.
    async fn append(
        &self,
        user_id: &str,
        entry: &HistoryEntry,
    ) -> Result<HistoryRecord, PersistenceError>;

    /// All records for `user_id`, newest first.
    async fn list(&self, user_id: &str) -> Result<Vec<HistoryRecord>, PersistenceError>;
}

#[async_trait]
impl<T: HistoryStore + ?Sized> HistoryStore for Arc<T> {
    async fn append(
        &self,
        user_id: &str,
        entry: &HistoryEntry,
    ) -> Result<HistoryRecord, PersistenceError> {
        (**self).append(user_id, entry).await
    }

    async fn list(&self, user_id: &str) -> Result<Vec<HistoryRecord>, PersistenceError> {
        (**self).list(user_id).await
    }
}

/// Sort records newest first. Ties keep their relative order.
pub(crate) fn sort_newest_first(records: &mut [HistoryRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
