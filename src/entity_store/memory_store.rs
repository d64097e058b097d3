//! In-memory entity store.
//!
//! Mirrors the SQLite store's observable behavior (lazy tables, primary-key
//! conflicts, track references, listing order) without touching disk. Used by
//! `--store memory` dry runs and by tests.

use super::models::{EntityKind, EntityRow, InsertOutcome, ListingItem};
use super::trait_def::{EntityStore, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryEntityStore {
    tables: Mutex<HashMap<EntityKind, Vec<EntityRow>>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the rows stored for a kind, in insertion order.
    pub fn rows(&self, kind: EntityKind) -> Vec<EntityRow> {
        let tables = self.tables.lock().unwrap();
        tables.get(&kind).cloned().unwrap_or_default()
    }

    pub fn has_table(&self, kind: EntityKind) -> bool {
        self.tables.lock().unwrap().contains_key(&kind)
    }
}

impl EntityStore for InMemoryEntityStore {
    fn probe(&self, kind: EntityKind) -> Result<(), StoreError> {
        if self.has_table(kind) {
            Ok(())
        } else {
            Err(StoreError::MissingRelation(kind.table_name()))
        }
    }

    fn ensure_schema(&self, kind: EntityKind) -> Result<(), StoreError> {
        self.tables.lock().unwrap().entry(kind).or_default();
        Ok(())
    }

    fn count(&self, kind: EntityKind) -> Result<usize, StoreError> {
        let tables = self.tables.lock().unwrap();
        tables
            .get(&kind)
            .map(Vec::len)
            .ok_or(StoreError::MissingRelation(kind.table_name()))
    }

    fn insert(&self, row: &EntityRow) -> Result<InsertOutcome, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let kind = row.kind();

        if let EntityRow::PlayHistory(entry) = row {
            let track_exists = tables
                .get(&EntityKind::Track)
                .map(|tracks| tracks.iter().any(|t| t.id() == entry.track_id))
                .unwrap_or(false);
            if !track_exists {
                return Err(StoreError::DanglingReference {
                    row_id: entry.id.clone(),
                    track_id: entry.track_id.clone(),
                });
            }
        }

        let table = tables
            .get_mut(&kind)
            .ok_or(StoreError::MissingRelation(kind.table_name()))?;
        if table.iter().any(|existing| existing.id() == row.id()) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        table.push(row.clone());
        Ok(InsertOutcome::Inserted)
    }

    fn select(
        &self,
        kind: EntityKind,
        limit: Option<usize>,
    ) -> Result<Vec<ListingItem>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let rows = tables
            .get(&kind)
            .ok_or(StoreError::MissingRelation(kind.table_name()))?;

        let mut items: Vec<ListingItem> = match kind {
            EntityKind::PlayHistory => {
                let tracks = tables.get(&EntityKind::Track);
                let mut history: Vec<_> = rows
                    .iter()
                    .filter_map(|row| match row {
                        EntityRow::PlayHistory(entry) => Some(entry),
                        _ => None,
                    })
                    .collect();
                history.sort_by(|a, b| b.played_at.cmp(&a.played_at));
                history
                    .into_iter()
                    .filter_map(|entry| {
                        tracks?.iter().find_map(|row| match row {
                            EntityRow::Track(track) if track.id == entry.track_id => {
                                Some(ListingItem::from(track))
                            }
                            _ => None,
                        })
                    })
                    .collect()
            }
            _ => rows
                .iter()
                .filter_map(|row| match row {
                    EntityRow::Track(t) => Some(ListingItem::from(t)),
                    EntityRow::CuratedPlaylist(p) => Some(ListingItem::from(p)),
                    EntityRow::CuratedAlbum(a) => Some(ListingItem::from(a)),
                    EntityRow::PlayHistory(_) => None,
                })
                .collect(),
        };

        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_store::models::{CuratedPlaylist, PlayHistoryEntry, Track};
    use chrono::{Duration, Utc};

    fn track(id: &str) -> EntityRow {
        EntityRow::Track(Track {
            id: id.to_string(),
            title: id.to_uppercase(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            image_url: String::new(),
            duration: 90,
        })
    }

    #[test]
    fn test_tables_are_lazy() {
        let store = InMemoryEntityStore::new();
        assert!(store.probe(EntityKind::Track).unwrap_err().is_missing_relation());
        assert!(store.insert(&track("a")).unwrap_err().is_missing_relation());

        store.ensure_schema(EntityKind::Track).unwrap();
        store.ensure_schema(EntityKind::Track).unwrap();
        assert_eq!(store.count(EntityKind::Track).unwrap(), 0);
    }

    #[test]
    fn test_conflicting_insert_does_not_duplicate() {
        let store = InMemoryEntityStore::new();
        store.ensure_schema(EntityKind::CuratedPlaylist).unwrap();
        let row = EntityRow::CuratedPlaylist(CuratedPlaylist {
            id: "p1".to_string(),
            title: "Discover Weekly".to_string(),
            description: "Fresh".to_string(),
            image_url: String::new(),
        });

        assert_eq!(store.insert(&row).unwrap(), InsertOutcome::Inserted);
        assert_eq!(store.insert(&row).unwrap(), InsertOutcome::AlreadyExists);
        assert_eq!(store.rows(EntityKind::CuratedPlaylist).len(), 1);
    }

    #[test]
    fn test_history_select_joins_tracks_newest_first() {
        let store = InMemoryEntityStore::new();
        store.ensure_schema(EntityKind::Track).unwrap();
        store.ensure_schema(EntityKind::PlayHistory).unwrap();
        let now = Utc::now();

        for (index, id) in ["old", "new"].iter().enumerate() {
            store.insert(&track(id)).unwrap();
            store
                .insert(&EntityRow::PlayHistory(PlayHistoryEntry {
                    id: format!("play-{}", id),
                    track_id: id.to_string(),
                    played_at: now + Duration::minutes(index as i64),
                }))
                .unwrap();
        }

        let items = store.select(EntityKind::PlayHistory, Some(1)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "new");
    }

    #[test]
    fn test_history_insert_rejects_unknown_track() {
        let store = InMemoryEntityStore::new();
        store.ensure_schema(EntityKind::Track).unwrap();
        store.ensure_schema(EntityKind::PlayHistory).unwrap();

        let err = store
            .insert(&EntityRow::PlayHistory(PlayHistoryEntry {
                id: "play-1".to_string(),
                track_id: "missing".to_string(),
                played_at: Utc::now(),
            }))
            .unwrap_err();
        assert!(matches!(err, StoreError::DanglingReference { .. }));
    }
}
