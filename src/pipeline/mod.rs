//! Media translation pipeline.
//!
//! A run moves through `Idle → Transcribing → Translating → Synthesizing →
//! Complete`, or stops in `Failed` at the first stage error. Progress goes to
//! a [`ProgressReporter`]; history failures go to an [`ErrorReporter`] and
//! never reach the caller.

pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod state;
pub mod timing;
pub mod types;

pub use error::{CollectingReporter, ErrorReporter, LogReporter, PipelineFailure};
pub use orchestrator::Pipeline;
pub use progress::{
    ChannelProgress, CollectingProgress, LogProgress, ProgressEvent, ProgressReporter,
};
pub use state::{PipelineState, Stage};
pub use timing::{Clock, StageTimings, SystemClock};
pub use types::{CompletedRun, PersistenceHandle, PipelineRequest, PipelineResult};
