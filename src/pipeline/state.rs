//! Run state machine.

use std::fmt;

/// One externally delegated unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Transcribe,
    Translate,
    Synthesize,
}

impl Stage {
    /// Stages in execution order.
    pub const ALL: [Stage; 3] = [Stage::Transcribe, Stage::Translate, Stage::Synthesize];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Transcribe => "transcribe",
            Stage::Translate => "translate",
            Stage::Synthesize => "synthesize",
        }
    }

    /// State the pipeline is in while this stage runs.
    pub fn running_state(&self) -> PipelineState {
        match self {
            Stage::Transcribe => PipelineState::Transcribing,
            Stage::Translate => PipelineState::Translating,
            Stage::Synthesize => PipelineState::Synthesizing,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a pipeline run currently is.
///
/// ```text
/// Idle -> Transcribing -> Translating -> Synthesizing -> Complete
///              \______________\______________\________-> Failed
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Transcribing,
    Translating,
    Synthesizing,
    Complete,
    Failed { stage: Stage, message: String },
}

impl PipelineState {
    /// The stage running in this state, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Transcribing => Some(Stage::Transcribe),
            PipelineState::Translating => Some(Stage::Translate),
            PipelineState::Synthesizing => Some(Stage::Synthesize),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed { .. })
    }

    /// Whether `next` is a legal successor of `self`.
    ///
    /// A failure must name the stage that was running.
    pub fn can_transition_to(&self, next: &PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Idle, Transcribing)
            | (Transcribing, Translating)
            | (Translating, Synthesizing)
            | (Synthesizing, Complete) => true,
            (current, Failed { stage, .. }) => current.stage() == Some(*stage),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Transcribing => write!(f, "transcribing"),
            PipelineState::Translating => write!(f, "translating"),
            PipelineState::Synthesizing => write!(f, "synthesizing"),
            PipelineState::Complete => write!(f, "complete"),
            PipelineState::Failed { stage, message } => {
                write!(f, "failed ({}): {}", stage, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stage: Stage) -> PipelineState {
        PipelineState::Failed {
            stage,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            PipelineState::Idle,
            PipelineState::Transcribing,
            PipelineState::Translating,
            PipelineState::Synthesizing,
            PipelineState::Complete,
        ];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(&pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_stages_cannot_be_skipped() {
        assert!(!PipelineState::Idle.can_transition_to(&PipelineState::Translating));
        assert!(!PipelineState::Transcribing.can_transition_to(&PipelineState::Synthesizing));
        assert!(!PipelineState::Translating.can_transition_to(&PipelineState::Complete));
        assert!(!PipelineState::Complete.can_transition_to(&PipelineState::Idle));
    }

    #[test]
    fn test_failure_only_from_running_stage() {
        assert!(PipelineState::Transcribing.can_transition_to(&failed(Stage::Transcribe)));
        assert!(PipelineState::Synthesizing.can_transition_to(&failed(Stage::Synthesize)));
        assert!(!PipelineState::Translating.can_transition_to(&failed(Stage::Transcribe)));
        assert!(!PipelineState::Idle.can_transition_to(&failed(Stage::Transcribe)));
        assert!(!PipelineState::Complete.can_transition_to(&failed(Stage::Synthesize)));
    }

    #[test]
    fn test_running_state_round_trips_to_stage() {
        for stage in Stage::ALL {
            assert_eq!(stage.running_state().stage(), Some(stage));
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(PipelineState::Complete.is_terminal());
        assert!(failed(Stage::Translate).is_terminal());
        assert!(!PipelineState::Idle.is_terminal());
        assert!(!PipelineState::Synthesizing.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(Stage::Transcribe.to_string(), "transcribe");
        assert_eq!(
            failed(Stage::Translate).to_string(),
            "failed (translate): boom"
        );
    }
}
