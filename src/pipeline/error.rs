//! Run failures and the out-of-band error channel.

use crate::error::DublineError;
use crate::pipeline::state::{PipelineState, Stage};
use std::sync::Mutex;
use thiserror::Error;

/// A run that stopped at `stage`.
#[derive(Error, Debug)]
#[error("{stage} failed: {source}")]
pub struct PipelineFailure {
    pub stage: Stage,
    pub source: DublineError,
}

impl PipelineFailure {
    pub fn new(stage: Stage, source: DublineError) -> Self {
        Self { stage, source }
    }

    /// Terminal state for this failure.
    pub fn state(&self) -> PipelineState {
        PipelineState::Failed {
            stage: self.stage,
            message: self.source.to_string(),
        }
    }
}

/// Receives errors that must not affect the outcome of a run.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, origin: &str, error: &DublineError);
}

/// Logs reported errors through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, origin: &str, error: &DublineError) {
        match error {
            DublineError::Persistence(e) if e.is_permission_denied() => {
                tracing::error!(origin, error = %e, "permission denied");
            }
            _ => tracing::error!(origin, %error, "background operation failed"),
        }
    }
}

/// Keeps reported errors as `(origin, message)` pairs.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<(String, String)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, origin: &str, error: &DublineError) {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((origin.to_string(), error.to_string()));
    }
}
