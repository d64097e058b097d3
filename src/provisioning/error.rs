use crate::entity_store::{EntityKind, StoreError};
use thiserror::Error;

/// Fatal provisioning failures. Any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("Failed to create schema for {kind}: {source}")]
    SchemaCreation {
        kind: EntityKind,
        #[source]
        source: StoreError,
    },

    #[error("Failed to insert {kind} row {row_id}: {source}")]
    Population {
        kind: EntityKind,
        row_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to read {kind}: {source}")]
    Read {
        kind: EntityKind,
        #[source]
        source: StoreError,
    },
}

impl ProvisioningError {
    /// The entity kind being provisioned when the error occurred.
    pub fn kind(&self) -> EntityKind {
        match self {
            ProvisioningError::SchemaCreation { kind, .. }
            | ProvisioningError::Population { kind, .. }
            | ProvisioningError::Read { kind, .. } => *kind,
        }
    }
}
