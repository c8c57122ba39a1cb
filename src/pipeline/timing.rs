//! Clock abstraction and per-stage elapsed times.

use crate::pipeline::state::Stage;
use std::time::{Duration, Instant};

/// Source of the current instant, injectable for deterministic tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Wall time spent in each stage of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub transcribe: Duration,
    pub translate: Duration,
    pub synthesize: Duration,
}

impl StageTimings {
    pub fn record(&mut self, stage: Stage, elapsed: Duration) {
        match stage {
            Stage::Transcribe => self.transcribe = elapsed,
            Stage::Translate => self.translate = elapsed,
            Stage::Synthesize => self.synthesize = elapsed,
        }
    }

    pub fn get(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Transcribe => self.transcribe,
            Stage::Translate => self.translate,
            Stage::Synthesize => self.synthesize,
        }
    }

    pub fn total(&self) -> Duration {
        self.transcribe + self.translate + self.synthesize
    }
}
