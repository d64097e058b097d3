//! EntityStore trait definition.
//!
//! The provisioning engine only talks to storage through this trait, so the
//! same protocol runs against SQLite and against the in-memory store.

use super::models::{EntityKind, EntityRow, InsertOutcome, ListingItem};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The table backing a kind has not been created yet.
    #[error("relation \"{0}\" does not exist")]
    MissingRelation(&'static str),

    /// A play-history row points at a track that is not stored.
    #[error("track {track_id} referenced by {row_id} does not exist")]
    DanglingReference { row_id: String, track_id: String },

    /// An existing table does not have the expected columns or indices.
    #[error("table {table} does not match its definition: {reason}")]
    SchemaMismatch { table: &'static str, reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub fn is_missing_relation(&self) -> bool {
        matches!(self, StoreError::MissingRelation(_))
    }
}

/// Trait for entity storage backends.
pub trait EntityStore: Send + Sync {
    /// Attempt a read against the kind's table.
    ///
    /// Fails with [`StoreError::MissingRelation`] when the table is absent.
    fn probe(&self, kind: EntityKind) -> Result<(), StoreError>;

    /// Create the kind's table if absent. Safe to call when it already exists.
    fn ensure_schema(&self, kind: EntityKind) -> Result<(), StoreError>;

    /// Number of rows currently stored for the kind.
    fn count(&self, kind: EntityKind) -> Result<usize, StoreError>;

    /// Insert one row, dropping it silently on a primary-key collision.
    fn insert(&self, row: &EntityRow) -> Result<InsertOutcome, StoreError>;

    /// Read rows of the kind in the uniform listing shape, newest first.
    ///
    /// Play-history rows are joined with their tracks.
    fn select(
        &self,
        kind: EntityKind,
        limit: Option<usize>,
    ) -> Result<Vec<ListingItem>, StoreError>;
}
