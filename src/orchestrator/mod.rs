//! Query orchestration: classify, provision, generate artifacts, report.
//!
//! A run walks `Idle -> Classifying -> Provisioning -> GeneratingArtifacts
//! -> ReportingDone`, dropping to `Failed` on the first fatal error. Nothing
//! completed before the failure is rolled back.

mod runner;
mod state;
mod step_log;

pub use runner::{OrchestratorError, QueryOrchestrator, RunReport, WrittenArtifact};
pub use state::RunState;
pub use step_log::{Step, StepKind, StepLog};
