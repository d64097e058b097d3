//! Deterministic collaborators: canned classifiers and a store wrapper with
//! injectable faults.

use async_trait::async_trait;
use pezzottify_provisioner::agent::{ClassifierError, Intent, IntentClassifier, IntentOperation};
use pezzottify_provisioner::entity_store::{
    EntityKind, EntityRow, EntityStore, InsertOutcome, ListingItem, StoreError,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Always answers with the same intent and records what it was asked.
pub struct StubClassifier {
    intent: Intent,
    pub seen: Mutex<Vec<String>>,
}

impl StubClassifier {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// An intent naming the given entities.
    pub fn naming(entities: &[&str]) -> Self {
        Self::new(Intent {
            operation: IntentOperation::CreateTable,
            entities: entities.iter().map(|e| e.to_string()).collect(),
            description: "Store the requested sections".to_string(),
            needs_endpoint: true,
            needs_frontend_update: true,
        })
    }
}

#[async_trait]
impl IntentClassifier for StubClassifier {
    async fn classify(&self, text: &str) -> Result<Intent, ClassifierError> {
        self.seen.lock().unwrap().push(text.to_string());
        Ok(self.intent.clone())
    }
}

/// Fails every classification.
pub struct FailingClassifier;

#[async_trait]
impl IntentClassifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<Intent, ClassifierError> {
        Err(ClassifierError::Malformed("not json".to_string()))
    }
}

/// Wraps a store, failing selected operations per kind.
pub struct FaultyStore {
    inner: Arc<dyn EntityStore>,
    fail_schema: Mutex<HashSet<EntityKind>>,
    fail_select: Mutex<HashSet<EntityKind>>,
}

impl FaultyStore {
    pub fn new(inner: Arc<dyn EntityStore>) -> Self {
        Self {
            inner,
            fail_schema: Mutex::new(HashSet::new()),
            fail_select: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_schema_for(self, kind: EntityKind) -> Self {
        self.fail_schema.lock().unwrap().insert(kind);
        self
    }

    pub fn fail_select_for(self, kind: EntityKind) -> Self {
        self.fail_select.lock().unwrap().insert(kind);
        self
    }
}

impl EntityStore for FaultyStore {
    fn probe(&self, kind: EntityKind) -> Result<(), StoreError> {
        self.inner.probe(kind)
    }

    fn ensure_schema(&self, kind: EntityKind) -> Result<(), StoreError> {
        if self.fail_schema.lock().unwrap().contains(&kind) {
            return Err(StoreError::Other(format!(
                "permission denied creating {}",
                kind.table_name()
            )));
        }
        self.inner.ensure_schema(kind)
    }

    fn count(&self, kind: EntityKind) -> Result<usize, StoreError> {
        self.inner.count(kind)
    }

    fn insert(&self, row: &EntityRow) -> Result<InsertOutcome, StoreError> {
        self.inner.insert(row)
    }

    fn select(
        &self,
        kind: EntityKind,
        limit: Option<usize>,
    ) -> Result<Vec<ListingItem>, StoreError> {
        if self.fail_select.lock().unwrap().contains(&kind) {
            return Err(StoreError::Other("read timed out".to_string()));
        }
        self.inner.select(kind, limit)
    }
}
