//! Query orchestrator.

use super::state::RunState;
use super::step_log::{Step, StepKind, StepLog};
use crate::agent::intent::{derive_entity_kinds, matched_triggers, IntentClassifier};
use crate::agent::Intent;
use crate::artifacts::{generate, ArtifactSink};
use crate::entity_store::EntityKind;
use crate::provisioning::{ProvisionReport, ProvisioningEngine, ProvisioningError};
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn, Instrument};

/// Fatal run failures.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error("Failed to write artifact {path:?}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An artifact written during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenArtifact {
    pub kind: EntityKind,
    pub route: &'static str,
    pub path: PathBuf,
}

/// Everything a run did, in order.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub query: String,
    pub state: RunState,
    /// Advisory classifier output, when the classifier answered.
    pub intent: Option<Intent>,
    /// The classifier failed and kinds came from keywords alone.
    pub degraded: bool,
    /// Kinds selected for provisioning, in order.
    pub entity_kinds: Vec<EntityKind>,
    pub provisioned: Vec<ProvisionReport>,
    pub artifacts: Vec<WrittenArtifact>,
    pub steps: Vec<Step>,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<OrchestratorError>,
}

fn serialize_error<S: Serializer>(
    error: &Option<OrchestratorError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl RunReport {
    fn new(query: &str) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            query: query.to_string(),
            state: RunState::Idle,
            intent: None,
            degraded: false,
            entity_kinds: Vec::new(),
            provisioned: Vec::new(),
            artifacts: Vec::new(),
            steps: Vec::new(),
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == RunState::ReportingDone
    }

    /// The report on success, the fatal error otherwise.
    pub fn into_result(mut self) -> Result<RunReport, OrchestratorError> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }

    fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        debug!(run_id = %self.run_id, from = %self.state, to = %next, "Run state change");
        self.state = next;
    }
}

/// Sequences classification, provisioning and artifact generation for one
/// query at a time.
pub struct QueryOrchestrator {
    classifier: Arc<dyn IntentClassifier>,
    engine: ProvisioningEngine,
    sink: Arc<dyn ArtifactSink>,
}

impl QueryOrchestrator {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        engine: ProvisioningEngine,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            classifier,
            engine,
            sink,
        }
    }

    /// Run a query to completion. Never panics on run failures; inspect
    /// [`RunReport::state`] or call [`RunReport::into_result`].
    pub async fn run(&self, query: &str) -> RunReport {
        let mut report = RunReport::new(query);
        let span = tracing::info_span!("run", run_id = %report.run_id);
        let mut log = StepLog::new();

        async {
            self.execute(&mut report, &mut log).await;
        }
        .instrument(span)
        .await;

        report.steps = log.take_steps();
        report
    }

    async fn execute(&self, report: &mut RunReport, log: &mut StepLog) {
        report.transition(RunState::Classifying);
        info!(query = %report.query, "Received query");
        log.log(StepKind::Context, format!("Received query: {}", report.query));

        self.classify(report, log).await;

        report.transition(RunState::Provisioning);
        for kind in report.entity_kinds.clone() {
            match self.engine.provision(kind, log) {
                Ok(provisioned) => report.provisioned.push(provisioned),
                Err(e) => return fail(report, log, e.into()),
            }
        }

        report.transition(RunState::GeneratingArtifacts);
        for kind in report.entity_kinds.clone() {
            let Some(artifact) = generate(kind) else {
                debug!(%kind, "No endpoint for kind");
                continue;
            };

            log.start_timer();
            match self.sink.write(&artifact).await {
                Ok(path) => {
                    info!(%kind, path = ?path, "Wrote artifact");
                    log.log_for_with_elapsed(
                        kind,
                        StepKind::Artifact,
                        format!("Wrote /api/{} query to {}", artifact.route, path.display()),
                    );
                    report.artifacts.push(WrittenArtifact {
                        kind,
                        route: artifact.route,
                        path,
                    });
                }
                Err(source) => {
                    let e = OrchestratorError::ArtifactWrite {
                        path: self.sink.destination(&artifact),
                        source,
                    };
                    return fail(report, log, e);
                }
            }
        }

        if !report.artifacts.is_empty() {
            let routes: Vec<String> = report
                .artifacts
                .iter()
                .map(|a| format!("/api/{}", a.route))
                .collect();
            log.log(
                StepKind::Integration,
                format!(
                    "No wiring needed: {} pick up their query at load time",
                    routes.join(", ")
                ),
            );
        }

        report.transition(RunState::ReportingDone);
        let message = format!(
            "Done: {} kind(s) provisioned, {} artifact(s) written",
            report.provisioned.len(),
            report.artifacts.len()
        );
        info!(
            kinds = report.provisioned.len(),
            artifacts = report.artifacts.len(),
            "Run completed"
        );
        log.log(StepKind::Done, message);
    }

    /// Ask the classifier, then settle the kinds from keywords.
    async fn classify(&self, report: &mut RunReport, log: &mut StepLog) {
        log.start_timer();
        match self.classifier.classify(&report.query).await {
            Ok(intent) => {
                info!(operation = ?intent.operation, entities = ?intent.entities, "Classified");
                log.log_with_metadata(
                    StepKind::Classification,
                    format!(
                        "Classifier: {:?} on [{}]: {}",
                        intent.operation,
                        intent.entities.join(", "),
                        intent.description
                    ),
                    serde_json::to_value(&intent).unwrap_or_default(),
                );
                report.intent = Some(intent);
            }
            Err(e) => {
                warn!(error = %e, "Classification failed, using keywords only");
                log.log_with_elapsed(
                    StepKind::ClassificationDegraded,
                    format!("Classifier unavailable ({}); relying on keyword matching", e),
                );
                report.degraded = true;
            }
        }

        let triggers = matched_triggers(&report.query);
        let kinds = derive_entity_kinds(&report.query);

        if triggers.is_empty() {
            log.log(
                StepKind::Context,
                "No known section named (recently played, made for you, popular albums); nothing to provision",
            );
        } else {
            let phrases: Vec<&str> = triggers.iter().map(|t| t.phrase).collect();
            let names: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
            log.log_with_metadata(
                StepKind::Context,
                format!(
                    "Matched \"{}\": provisioning {}",
                    phrases.join("\", \""),
                    names.join(", ")
                ),
                serde_json::json!({ "triggers": phrases, "kinds": kinds }),
            );
        }

        if let Some(intent) = &report.intent {
            let ignored: Vec<EntityKind> = intent
                .entity_kinds()
                .into_iter()
                .filter(|k| !kinds.contains(k))
                .collect();
            if !ignored.is_empty() {
                let names: Vec<&str> = ignored.iter().map(|k| k.as_str()).collect();
                debug!(?ignored, "Ignoring classifier-only kinds");
                log.log(
                    StepKind::Classification,
                    format!(
                        "Ignoring kinds named only by the classifier: {}",
                        names.join(", ")
                    ),
                );
            }
        }

        report.entity_kinds = kinds;
    }
}

fn fail(report: &mut RunReport, log: &mut StepLog, e: OrchestratorError) {
    error!(error = %e, state = %report.state, "Run failed");
    let message = format!("Failed during {}: {}", report.state, e);
    match &e {
        OrchestratorError::Provisioning(p) => {
            log.log_for(p.kind(), StepKind::Error, message);
        }
        OrchestratorError::ArtifactWrite { .. } => log.log(StepKind::Error, message),
    }
    report.transition(RunState::Failed);
    report.error = Some(e);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{ClassifierError, IntentOperation, OfflineClassifier};
    use crate::artifacts::MemoryArtifactSink;
    use crate::entity_store::{EntityStore, InMemoryEntityStore};
    use crate::seed::SeedCatalog;
    use async_trait::async_trait;

    struct FixedClassifier(Intent);

    #[async_trait]
    impl IntentClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<Intent, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    fn orchestrator(
        classifier: Arc<dyn IntentClassifier>,
    ) -> (QueryOrchestrator, Arc<InMemoryEntityStore>, Arc<MemoryArtifactSink>) {
        let store = Arc::new(InMemoryEntityStore::new());
        let sink = Arc::new(MemoryArtifactSink::new());
        let engine = ProvisioningEngine::new(store.clone(), Arc::new(SeedCatalog::builtin()));
        (
            QueryOrchestrator::new(classifier, engine, sink.clone()),
            store,
            sink,
        )
    }

    #[tokio::test]
    async fn test_degraded_run_still_provisions() {
        let (orchestrator, store, sink) = orchestrator(Arc::new(OfflineClassifier));

        let report = orchestrator
            .run("Can you store the recently played songs in a table")
            .await;

        assert!(report.is_success());
        assert!(report.degraded);
        assert!(report.intent.is_none());
        assert_eq!(
            report.entity_kinds,
            vec![EntityKind::Track, EntityKind::PlayHistory]
        );
        assert!(store.count(EntityKind::PlayHistory).unwrap() > 0);
        assert_eq!(sink.len(), 1);
        assert!(report
            .steps
            .iter()
            .any(|s| s.kind == StepKind::ClassificationDegraded));
        assert_eq!(report.steps.last().unwrap().kind, StepKind::Done);
    }

    #[tokio::test]
    async fn test_classifier_only_kinds_are_ignored() {
        let intent = Intent {
            operation: IntentOperation::CreateTable,
            entities: vec!["made_for_you".to_string(), "popular_albums".to_string()],
            description: "store playlists".to_string(),
            needs_endpoint: true,
            needs_frontend_update: false,
        };
        let (orchestrator, store, _) = orchestrator(Arc::new(FixedClassifier(intent)));

        let report = orchestrator.run("store the made for you playlists").await;

        assert!(report.is_success());
        assert_eq!(report.entity_kinds, vec![EntityKind::CuratedPlaylist]);
        assert!(!store.has_table(EntityKind::CuratedAlbum));
        assert!(report
            .steps
            .iter()
            .any(|s| s.message.contains("named only by the classifier: curated_album")));
    }

    #[tokio::test]
    async fn test_unrecognized_query_completes_without_work() {
        let (orchestrator, _, sink) = orchestrator(Arc::new(OfflineClassifier));

        let report = orchestrator.run("store my podcasts").await;

        assert!(report.is_success());
        assert!(report.entity_kinds.is_empty());
        assert!(sink.is_empty());
        assert!(!report.steps.iter().any(|s| s.kind == StepKind::Integration));
    }

    #[tokio::test]
    async fn test_report_serializes_error_as_text() {
        let (orchestrator, _, _) = orchestrator(Arc::new(OfflineClassifier));
        let report = orchestrator.run("popular albums").await;

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["state"], "reporting_done");
        assert!(json["error"].is_null());
        assert_eq!(json["artifacts"][0]["route"], "popular-albums");
    }
}
