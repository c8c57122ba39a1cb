//! Input and output of a pipeline run.

use crate::audio::WavAudio;
use crate::languages::VoiceSelection;
use crate::media::MediaPayload;
use crate::pipeline::timing::StageTimings;
use tokio::task::JoinHandle;

/// Everything one run needs from the caller.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub media: MediaPayload,
    pub target_language: String,
    pub voice: VoiceSelection,
    /// Owner of the history record; `None` skips persistence.
    pub user_id: Option<String>,
}

impl PipelineRequest {
    pub fn new(
        media: MediaPayload,
        target_language: impl Into<String>,
        voice: VoiceSelection,
    ) -> Self {
        Self {
            media,
            target_language: target_language.into(),
            voice,
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// The terminal artifact of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    pub transcription: String,
    pub translated_text: String,
    pub audio: WavAudio,
}

impl PipelineResult {
    /// Translated speech as `data:audio/wav;base64,...`.
    pub fn audio_data_uri(&self) -> String {
        self.audio.to_data_uri()
    }
}

/// Background history write started by a completed run.
///
/// Dropping the handle leaves the write running. Awaiting [`settle`](Self::settle)
/// waits for it; the outcome has already gone to the error reporter.
#[derive(Debug)]
pub struct PersistenceHandle {
    task: Option<JoinHandle<()>>,
}

impl PersistenceHandle {
    pub(crate) fn spawned(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    pub(crate) fn skipped() -> Self {
        Self { task: None }
    }

    /// Whether a history write was started.
    pub fn is_scheduled(&self) -> bool {
        self.task.is_some()
    }

    /// Wait for the write to finish. Never fails.
    pub async fn settle(self) {
        if let Some(task) = self.task
            && let Err(e) = task.await
        {
            tracing::error!(error = %e, "history task did not finish");
        }
    }
}

/// A successful run.
#[derive(Debug)]
pub struct CompletedRun {
    pub result: PipelineResult,
    pub timings: StageTimings,
    pub persistence: PersistenceHandle,
}
