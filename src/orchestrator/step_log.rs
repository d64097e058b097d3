//! Ordered, human-readable log of the steps taken during one run.

use crate::entity_store::EntityKind;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Type of step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// The request received and what was derived from it.
    Context,
    /// Advisory classifier output.
    Classification,
    /// The classifier failed; kind selection relies on keywords alone.
    ClassificationDegraded,
    /// Table existence check or creation.
    Schema,
    /// Seed row insertion, or the decision to skip it.
    Population,
    /// Post-population read-back.
    Verification,
    /// Read-back disagreed with what was inserted, or could not run.
    VerificationMismatch,
    /// An artifact was written.
    Artifact,
    /// Downstream integration notice.
    Integration,
    /// A fatal error ended the run.
    Error,
    /// The run completed.
    Done,
}

impl StepKind {
    /// Whether this step records a problem (fatal or not).
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            StepKind::ClassificationDegraded | StepKind::VerificationMismatch | StepKind::Error
        )
    }
}

/// A single step in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Step number within the run (0-indexed).
    pub step_number: u32,
    /// Unix timestamp (milliseconds).
    pub timestamp: i64,
    pub kind: StepKind,
    /// Entity kind the step concerns, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_kind: Option<EntityKind>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

impl Step {
    fn new(step_number: u32, kind: StepKind, message: impl Into<String>) -> Self {
        Self {
            step_number,
            timestamp: chrono::Utc::now().timestamp_millis(),
            kind,
            entity_kind: None,
            message: message.into(),
            metadata: None,
            duration_ms: None,
        }
    }
}

/// Accumulates the steps of one run in order.
#[derive(Default)]
pub struct StepLog {
    steps: Vec<Step>,
    current_timer: Option<Instant>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, mut step: Step) {
        step.step_number = self.steps.len() as u32;
        self.steps.push(step);
    }

    /// Log a step.
    pub fn log(&mut self, kind: StepKind, message: impl Into<String>) {
        self.push(Step::new(0, kind, message));
    }

    /// Log a step about a specific entity kind.
    pub fn log_for(&mut self, entity_kind: EntityKind, kind: StepKind, message: impl Into<String>) {
        let mut step = Step::new(0, kind, message);
        step.entity_kind = Some(entity_kind);
        self.push(step);
    }

    /// Log a step with metadata.
    pub fn log_with_metadata(
        &mut self,
        kind: StepKind,
        message: impl Into<String>,
        metadata: serde_json::Value,
    ) {
        let mut step = Step::new(0, kind, message);
        step.metadata = Some(metadata);
        self.push(step);
    }

    /// Start a timer for the next step.
    pub fn start_timer(&mut self) {
        self.current_timer = Some(Instant::now());
    }

    /// Log a step and include the elapsed time since start_timer was called.
    pub fn log_with_elapsed(&mut self, kind: StepKind, message: impl Into<String>) {
        let mut step = Step::new(0, kind, message);
        if let Some(start) = self.current_timer.take() {
            step.duration_ms = Some(start.elapsed().as_millis() as i64);
        }
        self.push(step);
    }

    /// Like [`log_for`](Self::log_for), including the elapsed time since
    /// start_timer was called.
    pub fn log_for_with_elapsed(
        &mut self,
        entity_kind: EntityKind,
        kind: StepKind,
        message: impl Into<String>,
    ) {
        let mut step = Step::new(0, kind, message);
        step.entity_kind = Some(entity_kind);
        if let Some(start) = self.current_timer.take() {
            step.duration_ms = Some(start.elapsed().as_millis() as i64);
        }
        self.push(step);
    }

    /// Get all logged steps.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Get the latest step.
    pub fn latest(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Take ownership of all steps, leaving the log empty.
    pub fn take_steps(&mut self) -> Vec<Step> {
        self.current_timer = None;
        std::mem::take(&mut self.steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_numbered_in_order() {
        let mut log = StepLog::new();

        log.log(StepKind::Context, "Received request");
        log.log_for(EntityKind::Track, StepKind::Schema, "Created table tracks");
        log.log_with_metadata(
            StepKind::Classification,
            "Classifier answered",
            serde_json::json!({"operation": "create_table"}),
        );

        assert_eq!(log.len(), 3);
        let numbers: Vec<_> = log.steps().iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
        assert_eq!(log.steps()[1].entity_kind, Some(EntityKind::Track));
        assert!(log.steps()[2].metadata.is_some());
    }

    #[test]
    fn test_timing() {
        let mut log = StepLog::new();

        log.start_timer();
        std::thread::sleep(std::time::Duration::from_millis(10));
        log.log_with_elapsed(StepKind::Artifact, "Slow write");

        assert!(log.latest().unwrap().duration_ms.unwrap() >= 10);
    }

    #[test]
    fn test_take_steps_resets_numbering() {
        let mut log = StepLog::new();
        log.log(StepKind::Context, "Step 1");
        log.log(StepKind::Done, "Step 2");

        let steps = log.take_steps();
        assert_eq!(steps.len(), 2);
        assert!(log.is_empty());

        log.log(StepKind::Context, "Next run");
        assert_eq!(log.latest().unwrap().step_number, 0);
    }

    #[test]
    fn test_problem_kinds() {
        assert!(StepKind::ClassificationDegraded.is_problem());
        assert!(StepKind::Error.is_problem());
        assert!(!StepKind::Population.is_problem());
    }
}
