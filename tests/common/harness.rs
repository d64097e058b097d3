use pezzottify_provisioner::agent::IntentClassifier;
use pezzottify_provisioner::artifacts::FsArtifactSink;
use pezzottify_provisioner::entity_store::{EntityStore, SqliteEntityStore};
use pezzottify_provisioner::orchestrator::{QueryOrchestrator, RunReport};
use pezzottify_provisioner::provisioning::ProvisioningEngine;
use pezzottify_provisioner::seed::SeedCatalog;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// An orchestrator over a SQLite file and an artifacts directory, both in a
/// temp dir that is removed on drop.
pub struct TestHarness {
    pub orchestrator: QueryOrchestrator,
    pub store: Arc<SqliteEntityStore>,
    pub db_path: PathBuf,
    pub artifacts_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    pub fn new(classifier: Arc<dyn IntentClassifier>) -> Self {
        Self::with_store_wrapper(classifier, |store| store)
    }

    /// Build a harness whose orchestrator sees the SQLite store through
    /// `wrap` (e.g. a fault-injecting wrapper).
    pub fn with_store_wrapper<F>(classifier: Arc<dyn IntentClassifier>, wrap: F) -> Self
    where
        F: FnOnce(Arc<dyn EntityStore>) -> Arc<dyn EntityStore>,
    {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("provisioner.db");
        let artifacts_dir = temp_dir.path().join("generated");

        let store = Arc::new(SqliteEntityStore::new(&db_path).expect("Failed to open store"));
        let engine = ProvisioningEngine::new(
            wrap(store.clone() as Arc<dyn EntityStore>),
            Arc::new(SeedCatalog::builtin()),
        );
        let orchestrator = QueryOrchestrator::new(
            classifier,
            engine,
            Arc::new(FsArtifactSink::new(&artifacts_dir)),
        );

        Self {
            orchestrator,
            store,
            db_path,
            artifacts_dir,
            _temp_dir: temp_dir,
        }
    }

    pub async fn run(&self, query: &str) -> RunReport {
        self.orchestrator.run(query).await
    }

    pub fn artifact_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.artifacts_dir.join(relative)
    }

    pub fn read_artifact(&self, relative: impl AsRef<Path>) -> Option<String> {
        std::fs::read_to_string(self.artifact_path(relative)).ok()
    }

    /// Every file below the artifacts directory.
    pub fn artifact_files(&self) -> Vec<PathBuf> {
        fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, out);
                } else {
                    out.push(path);
                }
            }
        }
        let mut files = Vec::new();
        walk(&self.artifacts_dir, &mut files);
        files.sort();
        files
    }

    /// `played_at` values of the history table, in insertion order.
    pub fn history_timestamps(&self) -> Vec<(String, i64)> {
        let conn = rusqlite::Connection::open(&self.db_path).expect("Failed to open db");
        let mut stmt = conn
            .prepare("SELECT track_id, played_at FROM recently_played ORDER BY rowid")
            .expect("Failed to prepare");
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .expect("Failed to query")
            .collect::<Result<_, _>>()
            .expect("Failed to read rows")
    }
}
