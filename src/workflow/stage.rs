use serde::{Deserialize, Serialize};

use crate::errors::WorkflowError;

/// Named phase of a single workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStage {
    #[default]
    Idle,
    Fetching,
    Summarizing,
    GeneratingScript,
    GeneratingImages,
    Completed,
}

impl WorkflowStage {
    /// The stages a successful run passes through, in order.
    pub const PIPELINE: [WorkflowStage; 5] = [
        WorkflowStage::Fetching,
        WorkflowStage::Summarizing,
        WorkflowStage::GeneratingScript,
        WorkflowStage::GeneratingImages,
        WorkflowStage::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Summarizing => "summarizing",
            Self::GeneratingScript => "generating-script",
            Self::GeneratingImages => "generating-images",
            Self::Completed => "completed",
        }
    }

    /// Status-bar label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Fetching => "DATA_SCAN",
            Self::Summarizing => "NEURAL_SYNTHESIS",
            Self::GeneratingScript => "SCRIPT_COMPILING",
            Self::GeneratingImages => "VISUAL_VECTORING",
            Self::Completed => "LINK_ESTABLISHED",
        }
    }

    /// True while a run is in flight.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle | Self::Completed)
    }

    /// Zero-based position within [`Self::PIPELINE`], `None` for idle.
    pub fn position(&self) -> Option<usize> {
        Self::PIPELINE.iter().position(|s| s == self)
    }
}

impl std::fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the workflow may move from `from` to `to`.
pub fn can_transition(from: WorkflowStage, to: WorkflowStage) -> bool {
    use WorkflowStage::*;

    match from {
        Idle | Completed => to == Fetching,
        Fetching => matches!(to, Summarizing | Idle),
        Summarizing => matches!(to, GeneratingScript | Idle),
        GeneratingScript => matches!(to, GeneratingImages | Idle),
        GeneratingImages => matches!(to, Completed | Idle),
    }
}

/// Holds the current stage and enforces the transition table.
#[derive(Debug, Clone, Default)]
pub struct StageTracker {
    current: WorkflowStage,
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> WorkflowStage {
        self.current
    }

    /// Move to `to`, rejecting anything outside the transition table.
    pub fn transition(&mut self, to: WorkflowStage) -> Result<(), WorkflowError> {
        if !can_transition(self.current, to) {
            return Err(WorkflowError::InvalidTransition {
                from: self.current,
                to,
            });
        }
        self.current = to;
        Ok(())
    }

    /// Drop back to idle after a failure. Returns the stage that was abandoned.
    pub fn halt(&mut self) -> WorkflowStage {
        std::mem::replace(&mut self.current, WorkflowStage::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkflowStage::*;

    const ALL: [WorkflowStage; 6] = [
        Idle,
        Fetching,
        Summarizing,
        GeneratingScript,
        GeneratingImages,
        Completed,
    ];

    #[test]
    fn happy_path_transitions_are_allowed() {
        let path = [
            (Idle, Fetching),
            (Fetching, Summarizing),
            (Summarizing, GeneratingScript),
            (GeneratingScript, GeneratingImages),
            (GeneratingImages, Completed),
            (Completed, Fetching),
        ];
        for (from, to) in path {
            assert!(
                can_transition(from, to),
                "expected transition {:?} -> {:?} to be allowed",
                from,
                to
            );
        }
    }

    #[test]
    fn every_active_stage_can_fall_back_to_idle() {
        for from in ALL.into_iter().filter(|s| s.is_active()) {
            assert!(can_transition(from, Idle), "expected {:?} -> Idle", from);
        }
    }

    #[test]
    fn skipping_stages_is_rejected() {
        assert!(!can_transition(Idle, Summarizing));
        assert!(!can_transition(Fetching, GeneratingScript));
        assert!(!can_transition(Summarizing, Completed));
        assert!(!can_transition(Completed, Idle));
        assert!(!can_transition(Idle, Idle));
        assert!(!can_transition(GeneratingImages, Fetching));
    }

    #[test]
    fn only_documented_transitions_exist() {
        let allowed: usize = ALL
            .iter()
            .map(|from| ALL.iter().filter(|to| can_transition(*from, **to)).count())
            .sum();
        // idle->fetching, completed->fetching, 4 forward steps, 4 fallbacks
        assert_eq!(allowed, 10);
    }

    #[test]
    fn tracker_rejects_invalid_transition_and_keeps_stage() {
        let mut tracker = StageTracker::new();
        let err = tracker.transition(Completed).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition {
                from: Idle,
                to: Completed
            }
        ));
        assert_eq!(tracker.current(), Idle);
    }

    #[test]
    fn tracker_halt_returns_abandoned_stage() {
        let mut tracker = StageTracker::new();
        tracker.transition(Fetching).unwrap();
        tracker.transition(Summarizing).unwrap();
        assert_eq!(tracker.halt(), Summarizing);
        assert_eq!(tracker.current(), Idle);
    }

    #[test]
    fn positions_follow_pipeline_order() {
        assert_eq!(Idle.position(), None);
        assert_eq!(Fetching.position(), Some(0));
        assert_eq!(Completed.position(), Some(4));
        assert!(!Completed.is_active());
        assert!(GeneratingImages.is_active());
    }

    #[test]
    fn serde_uses_kebab_case_names() {
        let json = serde_json::to_string(&GeneratingScript).unwrap();
        assert_eq!(json, "\"generating-script\"");
        assert_eq!(GeneratingImages.to_string(), "generating-images");
        assert_eq!(Fetching.label(), "DATA_SCAN");
    }
}
