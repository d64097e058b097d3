use crate::agent::llm::LlmError;
use crate::entity_store::EntityKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the request asks to do with the named entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentOperation {
    CreateTable,
    QueryData,
    UpdateData,
}

/// Structured reading of a free-text request, as produced by a classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub operation: IntentOperation,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub needs_endpoint: bool,
    #[serde(default)]
    pub needs_frontend_update: bool,
}

impl Intent {
    /// Entity kinds the classifier named, in order, ignoring unknown names.
    pub fn entity_kinds(&self) -> Vec<EntityKind> {
        let mut kinds = Vec::new();
        for kind in self.entities.iter().filter_map(|e| EntityKind::from_name(e)) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed classifier response: {0}")]
    Malformed(String),
}
