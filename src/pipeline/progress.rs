//! Progress side channel.
//!
//! Reporters are called inline by the orchestrator, so they must return
//! quickly and never block. Nothing they do can fail a run.

use crate::error::DublineError;
use crate::pipeline::state::Stage;
use crossbeam_channel::{Sender, TrySendError};
use std::sync::Mutex;
use std::time::Duration;

/// Observer of stage progress within a run.
///
/// `stage_completed` is invoked once per successful stage, in stage order,
/// before the next stage begins.
pub trait ProgressReporter: Send + Sync {
    fn stage_started(&self, _stage: Stage) {}

    fn stage_completed(&self, stage: Stage, elapsed: Duration);

    fn stage_failed(&self, _stage: Stage, _error: &DublineError) {}
}

/// Reports progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn stage_started(&self, stage: Stage) {
        tracing::debug!(%stage, "stage started");
    }

    fn stage_completed(&self, stage: Stage, elapsed: Duration) {
        tracing::info!(
            %stage,
            elapsed_ms = elapsed.as_millis() as u64,
            "stage complete"
        );
    }
}

/// Progress event for channel-based consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started(Stage),
    Completed { stage: Stage, elapsed: Duration },
    Failed { stage: Stage, message: String },
}

/// Forwards progress over a crossbeam channel without blocking.
///
/// A full or disconnected channel drops the event.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: Sender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(tx: Sender<ProgressEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: ProgressEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::trace!(?event, "progress channel full, dropping event");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("progress receiver gone");
            }
        }
    }
}

impl ProgressReporter for ChannelProgress {
    fn stage_started(&self, stage: Stage) {
        self.send(ProgressEvent::Started(stage));
    }

    fn stage_completed(&self, stage: Stage, elapsed: Duration) {
        self.send(ProgressEvent::Completed { stage, elapsed });
    }

    fn stage_failed(&self, stage: Stage, error: &DublineError) {
        self.send(ProgressEvent::Failed {
            stage,
            message: error.to_string(),
        });
    }
}

/// Records every event in memory.
#[derive(Debug, Default)]
pub struct CollectingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Stages that reported success, in report order.
    pub fn completed(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Completed { stage, .. } => Some(stage),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

impl ProgressReporter for CollectingProgress {
    fn stage_started(&self, stage: Stage) {
        self.push(ProgressEvent::Started(stage));
    }

    fn stage_completed(&self, stage: Stage, elapsed: Duration) {
        self.push(ProgressEvent::Completed { stage, elapsed });
    }

    fn stage_failed(&self, stage: Stage, error: &DublineError) {
        self.push(ProgressEvent::Failed {
            stage,
            message: error.to_string(),
        });
    }
}
