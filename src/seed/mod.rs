//! Seed data used to populate freshly created, empty entity kinds.
//!
//! A [`SeedCatalog`] is loaded once at startup (built-in fixtures or a JSON
//! file) and never changes for the lifetime of the process.

mod fixtures;

use crate::entity_store::{CuratedAlbum, CuratedPlaylist, EntityKind, EntityRow, Track};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Source of fixture rows per entity kind.
pub trait SeedSource: Send + Sync {
    /// Ordered fixture rows for the kind.
    ///
    /// For [`EntityKind::PlayHistory`] these are the recently played
    /// [`EntityRow::Track`] rows; history entries are derived from them,
    /// row 0 being the most recent play.
    fn fixture_rows(&self, kind: EntityKind) -> Vec<EntityRow>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub made_for_you: Vec<CuratedPlaylist>,
    #[serde(default)]
    pub popular_albums: Vec<CuratedAlbum>,
}

impl SeedCatalog {
    /// The catalog shipped with the binary.
    pub fn builtin() -> Self {
        SeedCatalog {
            tracks: fixtures::recently_played_tracks(),
            made_for_you: fixtures::made_for_you_playlists(),
            popular_albums: fixtures::popular_albums(),
        }
    }

    /// Load a catalog from a JSON document with `tracks`, `made_for_you` and
    /// `popular_albums` arrays. Missing arrays are empty.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file: {:?}", path))?;
        let catalog: SeedCatalog = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse seed file: {:?}", path))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Ids must be unique within each kind.
    pub fn validate(&self) -> Result<()> {
        check_unique("tracks", self.tracks.iter().map(|t| t.id.as_str()))?;
        check_unique("made_for_you", self.made_for_you.iter().map(|p| p.id.as_str()))?;
        check_unique(
            "popular_albums",
            self.popular_albums.iter().map(|a| a.id.as_str()),
        )?;
        Ok(())
    }
}

fn check_unique<'a>(section: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            bail!("Duplicate id '{}' in seed section '{}'", id, section);
        }
    }
    Ok(())
}

impl SeedSource for SeedCatalog {
    fn fixture_rows(&self, kind: EntityKind) -> Vec<EntityRow> {
        match kind {
            EntityKind::Track | EntityKind::PlayHistory => {
                self.tracks.iter().cloned().map(EntityRow::Track).collect()
            }
            EntityKind::CuratedPlaylist => self
                .made_for_you
                .iter()
                .cloned()
                .map(EntityRow::CuratedPlaylist)
                .collect(),
            EntityKind::CuratedAlbum => self
                .popular_albums
                .iter()
                .cloned()
                .map(EntityRow::CuratedAlbum)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = SeedCatalog::builtin();
        catalog.validate().unwrap();
        assert!(!catalog.tracks.is_empty());
        assert!(!catalog.made_for_you.is_empty());
        assert!(!catalog.popular_albums.is_empty());
    }

    #[test]
    fn test_history_fixtures_are_tracks() {
        let catalog = SeedCatalog::builtin();
        let rows = catalog.fixture_rows(EntityKind::PlayHistory);
        assert_eq!(rows.len(), catalog.tracks.len());
        assert!(rows.iter().all(|r| r.kind() == EntityKind::Track));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"popular_albums": [{{"id": "a1", "title": "Kid A", "artist": "Radiohead", "image_url": "/a1.jpg", "duration": 2997}}]}}"#
        )
        .unwrap();

        let catalog = SeedCatalog::from_json_file(file.path()).unwrap();
        assert!(catalog.tracks.is_empty());
        assert_eq!(catalog.popular_albums.len(), 1);
        assert_eq!(catalog.fixture_rows(EntityKind::CuratedAlbum)[0].id(), "a1");
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"made_for_you": [
                {{"id": "p", "title": "A", "description": "", "image_url": ""}},
                {{"id": "p", "title": "B", "description": "", "image_url": ""}}
            ]}}"#
        )
        .unwrap();

        let err = SeedCatalog::from_json_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Duplicate id 'p'"));
    }
}
