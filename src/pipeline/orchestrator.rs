//! Sequences transcribe → translate → synthesize and hands the result to history.

use crate::error::{DublineError, Result};
use crate::history::{HistoryEntry, HistoryStore};
use crate::pipeline::error::{ErrorReporter, LogReporter, PipelineFailure};
use crate::pipeline::progress::{LogProgress, ProgressReporter};
use crate::pipeline::state::{PipelineState, Stage};
use crate::pipeline::timing::{Clock, StageTimings, SystemClock};
use crate::pipeline::types::{CompletedRun, PersistenceHandle, PipelineRequest, PipelineResult};
use crate::stages::{
    SpeechToText, SynthesisRequest, TextToSpeech, TranslationRequest, Translator, synthesize,
    transcribe, translate,
};
use std::future::Future;
use std::sync::Arc;

/// Media translation pipeline.
///
/// Stages run strictly in order, once each. The pipeline holds no per-run
/// state, so one instance can serve any number of runs; guarding against
/// double submission is the caller's job.
pub struct Pipeline {
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translator>,
    tts: Arc<dyn TextToSpeech>,
    history: Option<Arc<dyn HistoryStore>>,
    progress: Arc<dyn ProgressReporter>,
    error_reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    /// Creates a pipeline with log-based progress and error reporting and no history.
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        translator: Arc<dyn Translator>,
        tts: Arc<dyn TextToSpeech>,
    ) -> Self {
        Self {
            stt,
            translator,
            tts,
            history: None,
            progress: Arc::new(LogProgress),
            error_reporter: Arc::new(LogReporter),
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the store completed runs are recorded in.
    pub fn with_history(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(store);
        self
    }

    /// Sets a custom progress reporter.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Sets the reporter that receives history failures.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Sets a custom clock (for deterministic testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run all three stages for `request`.
    ///
    /// On success the history write has been started but not awaited; see
    /// [`PersistenceHandle`]. Its outcome never changes the result.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineFailure`] naming the first stage that failed. No
    /// partial result is produced.
    ///
    /// # Panics
    ///
    /// Requires a Tokio runtime: when a history write is scheduled it is
    /// spawned with `tokio::spawn`, which panics outside one.
    pub async fn run(
        &self,
        request: &PipelineRequest,
    ) -> std::result::Result<CompletedRun, PipelineFailure> {
        let mut tracker = RunTracker::new(self.progress.as_ref());

        tracing::info!(
            media = request.media.name(),
            target_language = %request.target_language,
            voice = %request.voice,
            "pipeline started"
        );

        let transcription = self
            .step(
                &mut tracker,
                Stage::Transcribe,
                transcribe(self.stt.as_ref(), &request.media),
            )
            .await?;

        let translation_request = TranslationRequest {
            source_text: transcription.text,
            target_language: request.target_language.clone(),
        };
        let translation = self
            .step(
                &mut tracker,
                Stage::Translate,
                translate(self.translator.as_ref(), &translation_request),
            )
            .await?;

        let synthesis_request = SynthesisRequest {
            text: translation.translated_text,
            voice: request.voice.clone(),
        };
        let audio = self
            .step(
                &mut tracker,
                Stage::Synthesize,
                synthesize(self.tts.as_ref(), &synthesis_request),
            )
            .await?;

        tracker.transition(PipelineState::Complete);

        let result = PipelineResult {
            transcription: translation_request.source_text,
            translated_text: synthesis_request.text,
            audio,
        };
        let timings = tracker.timings;

        tracing::info!(
            total_ms = timings.total().as_millis() as u64,
            audio_bytes = result.audio.len(),
            "pipeline complete"
        );

        let persistence = self.schedule_history(request, &result);

        Ok(CompletedRun {
            result,
            timings,
            persistence,
        })
    }

    async fn step<T>(
        &self,
        tracker: &mut RunTracker<'_>,
        stage: Stage,
        work: impl Future<Output = Result<T>>,
    ) -> std::result::Result<T, PipelineFailure> {
        tracker.begin(stage);
        let started = self.clock.now();

        match work.await {
            Ok(value) => {
                let elapsed = self.clock.now().saturating_duration_since(started);
                tracker.succeed(stage, elapsed);
                Ok(value)
            }
            Err(source) => Err(tracker.fail(stage, source)),
        }
    }

    /// Start the history write for a completed run, if there is a store and a user.
    fn schedule_history(
        &self,
        request: &PipelineRequest,
        result: &PipelineResult,
    ) -> PersistenceHandle {
        let Some(store) = &self.history else {
            return PersistenceHandle::skipped();
        };

        let user_id = match request.user_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                tracing::warn!("no user id, translation history not saved");
                return PersistenceHandle::skipped();
            }
        };

        let entry = HistoryEntry {
            video_name: request.media.name().to_string(),
            translated_text: result.translated_text.clone(),
            target_language: request.target_language.clone(),
        };
        let store = Arc::clone(store);
        let reporter = Arc::clone(&self.error_reporter);

        let task = tokio::spawn(async move {
            match store.append(&user_id, &entry).await {
                Ok(record) => {
                    tracing::debug!(id = %record.id, user = %record.user_id, "history saved");
                }
                Err(e) => reporter.report("history", &DublineError::Persistence(e)),
            }
        });
        PersistenceHandle::spawned(task)
    }
}

/// Per-run state: current state, timings, and the progress side channel.
struct RunTracker<'a> {
    state: PipelineState,
    timings: StageTimings,
    progress: &'a dyn ProgressReporter,
}

impl<'a> RunTracker<'a> {
    fn new(progress: &'a dyn ProgressReporter) -> Self {
        Self {
            state: PipelineState::Idle,
            timings: StageTimings::default(),
            progress,
        }
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
    }

    fn begin(&mut self, stage: Stage) {
        self.transition(stage.running_state());
        self.progress.stage_started(stage);
    }

    fn succeed(&mut self, stage: Stage, elapsed: std::time::Duration) {
        self.timings.record(stage, elapsed);
        self.progress.stage_completed(stage, elapsed);
    }

    fn fail(&mut self, stage: Stage, source: DublineError) -> PipelineFailure {
        tracing::warn!(%stage, error = %source, "pipeline stage failed");
        self.progress.stage_failed(stage, &source);
        let failure = PipelineFailure::new(stage, source);
        self.transition(failure.state());
        failure
    }
}
