//! Pezzottify Data Provisioner Library
//!
//! Turns free-text requests ("store the recently played songs in a table")
//! into provisioned entity tables plus generated read-endpoint queries.
//! This library exposes the internal modules for testing and potential reuse.

pub mod agent;
pub mod artifacts;
pub mod config;
pub mod entity_store;
pub mod orchestrator;
pub mod provisioning;
pub mod seed;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use artifacts::{ArtifactSink, FsArtifactSink};
pub use entity_store::{EntityKind, EntityStore, InMemoryEntityStore, SqliteEntityStore};
pub use orchestrator::{QueryOrchestrator, RunReport, RunState};
pub use provisioning::ProvisioningEngine;
pub use seed::{SeedCatalog, SeedSource};
