//! Run state definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of one query run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Waiting for a query.
    Idle,
    /// Waiting on the intent classifier.
    Classifying,
    /// Provisioning the named entity kinds, one at a time.
    Provisioning,
    /// Writing read-endpoint artifacts.
    GeneratingArtifacts,
    /// Run completed; the step log is final.
    ReportingDone,
    /// Run aborted on a fatal error.
    Failed,
}

impl RunState {
    /// Check if the run is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::ReportingDone | RunState::Failed)
    }

    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;
        match (self, next) {
            (Idle, Classifying)
            | (Classifying, Provisioning)
            | (Provisioning, GeneratingArtifacts)
            | (GeneratingArtifacts, ReportingDone)
            | (ReportingDone, Idle) => true,
            (Idle, Failed) | (Failed, _) => false,
            (_, Failed) => !self.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Classifying => "classifying",
            RunState::Provisioning => "provisioning",
            RunState::GeneratingArtifacts => "generating_artifacts",
            RunState::ReportingDone => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            RunState::Idle,
            RunState::Classifying,
            RunState::Provisioning,
            RunState::GeneratingArtifacts,
            RunState::ReportingDone,
            RunState::Idle,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_failed_reachable_from_active_states_only() {
        assert!(!RunState::Idle.can_transition_to(RunState::Failed));
        assert!(RunState::Classifying.can_transition_to(RunState::Failed));
        assert!(RunState::Provisioning.can_transition_to(RunState::Failed));
        assert!(RunState::GeneratingArtifacts.can_transition_to(RunState::Failed));
        assert!(!RunState::ReportingDone.can_transition_to(RunState::Failed));
        assert!(!RunState::Failed.can_transition_to(RunState::Idle));
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(!RunState::Classifying.can_transition_to(RunState::GeneratingArtifacts));
        assert!(!RunState::Provisioning.can_transition_to(RunState::ReportingDone));
    }
}
