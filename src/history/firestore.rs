//! History store backed by the Cloud Firestore REST API.
//!
//! Records live under `users/{uid}/history/{id}`. Appends go through a
//! `documents:commit` with a `REQUEST_TIME` transform on `createdAt`, so the
//! server stamps the creation time.

use crate::error::{DublineError, PersistenceError, Result};
use crate::history::{
    HistoryEntry, HistoryRecord, HistoryStore, collection_path, sort_newest_first,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

const PAGE_SIZE: u32 = 300;

pub struct FirestoreHistoryStore {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    auth_token: Option<String>,
}

impl FirestoreHistoryStore {
    /// Create a store for `project_id`.
    ///
    /// `auth_token` is sent as a bearer token; without one, requests only
    /// succeed against open security rules or the emulator.
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(DublineError::ConfigInvalidValue {
                key: "history.project_id".to_string(),
                message: "must be set to store history".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DublineError::capability("firestore", format!("client setup: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id,
            auth_token,
        })
    }

    fn documents_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch_page(
        &self,
        user_id: &str,
        page_token: Option<&str>,
    ) -> std::result::Result<ListResponse, PersistenceError> {
        let path = collection_path(user_id);
        let base = format!("{}/{}/{}", self.base_url, self.documents_root(), path);
        let mut params = vec![("pageSize", PAGE_SIZE.to_string())];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        let url = reqwest::Url::parse_with_params(&base, &params)
            .map_err(|e| unavailable(format!("invalid history URL {base}: {e}")))?;

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| unavailable(format!("list request failed: {e}")))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| unavailable(format!("failed to read list response: {e}")))?;

        if let Some(error) = status_error(status, &text, &path, "list") {
            return Err(error);
        }
        serde_json::from_str(&text)
            .map_err(|e| unavailable(format!("failed to parse list response: {e}")))
    }
}

#[async_trait]
impl HistoryStore for FirestoreHistoryStore {
    async fn append(
        &self,
        user_id: &str,
        entry: &HistoryEntry,
    ) -> std::result::Result<HistoryRecord, PersistenceError> {
        let id = uuid::Uuid::new_v4().to_string();
        let path = collection_path(user_id);
        let name = format!("{}/{}/{}", self.documents_root(), path, id);
        let url = format!("{}/{}:commit", self.base_url, self.documents_root());

        tracing::debug!(%path, %id, "appending history record");

        let response = self
            .authorize(self.client.post(&url))
            .header(CONTENT_TYPE, "application/json")
            .body(commit_body(&name, user_id, entry).to_string())
            .send()
            .await
            .map_err(|e| unavailable(format!("commit request failed: {e}")))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| unavailable(format!("failed to read commit response: {e}")))?;

        if let Some(error) = status_error(status, &text, &path, "create") {
            return Err(error);
        }

        let created_at = commit_timestamp(&text).unwrap_or_else(|| {
            tracing::debug!("commit response had no server timestamp, using local time");
            Utc::now()
        });

        Ok(HistoryRecord {
            id,
            user_id: user_id.to_string(),
            video_name: entry.video_name.clone(),
            translated_text: entry.translated_text.clone(),
            target_language: entry.target_language.clone(),
            created_at,
        })
    }

    async fn list(
        &self,
        user_id: &str,
    ) -> std::result::Result<Vec<HistoryRecord>, PersistenceError> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(user_id, page_token.as_deref()).await?;
            records.extend(
                page.documents
                    .into_iter()
                    .filter_map(|doc| doc.into_record(user_id)),
            );
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        sort_newest_first(&mut records);
        Ok(records)
    }
}

fn unavailable(message: String) -> PersistenceError {
    PersistenceError::Unavailable { message }
}

/// Request body for a single-document commit with a server timestamp.
fn commit_body(document_name: &str, user_id: &str, entry: &HistoryEntry) -> serde_json::Value {
    json!({
        "writes": [{
            "update": {
                "name": document_name,
                "fields": {
                    "videoName": { "stringValue": entry.video_name },
                    "translatedText": { "stringValue": entry.translated_text },
                    "targetLanguage": { "stringValue": entry.target_language },
                    "userId": { "stringValue": user_id },
                }
            },
            "updateTransforms": [{
                "fieldPath": "createdAt",
                "setToServerValue": "REQUEST_TIME"
            }],
            "currentDocument": { "exists": false }
        }]
    })
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Map a non-success response to a persistence error.
///
/// 401/403 (or a `PERMISSION_DENIED`/`UNAUTHENTICATED` status) are permission
/// problems; everything else is reported as unavailable.
fn status_error(status: u16, body: &str, path: &str, operation: &str) -> Option<PersistenceError> {
    if (200..300).contains(&status) {
        return None;
    }

    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let denied = matches!(status, 401 | 403)
        || parsed
            .as_ref()
            .is_some_and(|e| {
                matches!(
                    e.error.status.as_str(),
                    "PERMISSION_DENIED" | "UNAUTHENTICATED"
                )
            });

    if denied {
        return Some(PersistenceError::PermissionDenied {
            path: path.to_string(),
            operation: operation.to_string(),
        });
    }

    let message = match parsed {
        Some(envelope) if !envelope.error.message.is_empty() => {
            format!("HTTP {}: {}", status, envelope.error.message)
        }
        _ => format!("HTTP {}", status),
    };
    Some(unavailable(message))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    string_value: Option<String>,
    timestamp_value: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    write_results: Vec<WriteResult>,
    commit_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteResult {
    #[serde(default)]
    transform_results: Vec<FieldValue>,
}

/// Server-assigned `createdAt`, falling back to the commit time.
fn commit_timestamp(body: &str) -> Option<DateTime<Utc>> {
    let response: CommitResponse = serde_json::from_str(body).ok()?;
    response
        .write_results
        .first()
        .and_then(|w| w.transform_results.first())
        .and_then(|v| v.timestamp_value)
        .or(response.commit_time)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    name: String,
    #[serde(default)]
    fields: HashMap<String, FieldValue>,
    create_time: Option<DateTime<Utc>>,
}

impl Document {
    fn string(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(|v| v.string_value.clone())
    }

    /// Convert to a record; documents missing required fields are skipped.
    fn into_record(self, user_id: &str) -> Option<HistoryRecord> {
        let video_name = self.string("videoName")?;
        let translated_text = self.string("translatedText")?;
        let target_language = self.string("targetLanguage")?;
        let owner = self.string("userId").unwrap_or_else(|| user_id.to_string());
        let created_at = self
            .fields
            .get("createdAt")
            .and_then(|v| v.timestamp_value)
            .or(self.create_time)?;
        let id = self.name.rsplit('/').next().unwrap_or_default().to_string();

        Some(HistoryRecord {
            id,
            user_id: owner,
            video_name,
            translated_text,
            target_language,
            created_at,
        })
    }
}
