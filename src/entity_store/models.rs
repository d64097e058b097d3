//! Record types persisted by the entity store.
//!
//! Four entity kinds exist: tracks, play-history entries, curated
//! playlists ("Made for you") and curated albums ("Popular albums").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Entity Kinds
// =============================================================================

/// The persistent record types the agent knows how to provision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Track,
    PlayHistory,
    CuratedPlaylist,
    CuratedAlbum,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Track,
        EntityKind::PlayHistory,
        EntityKind::CuratedPlaylist,
        EntityKind::CuratedAlbum,
    ];

    /// Name of the backing table.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Track => "tracks",
            EntityKind::PlayHistory => "recently_played",
            EntityKind::CuratedPlaylist => "made_for_you",
            EntityKind::CuratedAlbum => "popular_albums",
        }
    }

    /// Kinds whose schema must exist before this kind's rows can be inserted.
    pub fn dependencies(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::PlayHistory => &[EntityKind::Track],
            _ => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Track => "track",
            EntityKind::PlayHistory => "play_history",
            EntityKind::CuratedPlaylist => "curated_playlist",
            EntityKind::CuratedAlbum => "curated_album",
        }
    }

    /// Lenient lookup used for names coming back from the intent classifier.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "track" | "tracks" | "song" | "songs" => Some(EntityKind::Track),
            "play_history" | "playhistory" | "recently_played" | "history"
            | "play_history_entry" => Some(EntityKind::PlayHistory),
            "curated_playlist" | "curated_playlists" | "playlist" | "playlists"
            | "made_for_you" => Some(EntityKind::CuratedPlaylist),
            "curated_album" | "curated_albums" | "album" | "albums" | "popular_albums" => {
                Some(EntityKind::CuratedAlbum)
            }
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Records
// =============================================================================

/// A playable track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub image_url: String,
    /// Duration in seconds.
    pub duration: u32,
}

/// One play of a track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayHistoryEntry {
    pub id: String,
    pub track_id: String,
    pub played_at: DateTime<Utc>,
}

/// A curated playlist shown in the "Made for you" section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedPlaylist {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
}

/// A curated album shown in the "Popular albums" section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedAlbum {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub image_url: String,
    /// Total duration in seconds.
    pub duration: u32,
}

/// A record of any kind, as accepted by [`super::EntityStore::insert`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityRow {
    Track(Track),
    PlayHistory(PlayHistoryEntry),
    CuratedPlaylist(CuratedPlaylist),
    CuratedAlbum(CuratedAlbum),
}

impl EntityRow {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRow::Track(_) => EntityKind::Track,
            EntityRow::PlayHistory(_) => EntityKind::PlayHistory,
            EntityRow::CuratedPlaylist(_) => EntityKind::CuratedPlaylist,
            EntityRow::CuratedAlbum(_) => EntityKind::CuratedAlbum,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EntityRow::Track(t) => &t.id,
            EntityRow::PlayHistory(h) => &h.id,
            EntityRow::CuratedPlaylist(p) => &p.id,
            EntityRow::CuratedAlbum(a) => &a.id,
        }
    }
}

/// Result of a conflict-tolerant insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with the same primary key was already there; nothing was written.
    AlreadyExists,
}

/// The uniform row shape served by the generated read endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub image: String,
    pub duration: u32,
}

/// Duration reported for playlist-shaped rows, which carry no duration of their own.
pub const PLAYLIST_DEFAULT_DURATION_SECS: u32 = 180;

impl From<&Track> for ListingItem {
    fn from(track: &Track) -> Self {
        ListingItem {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            image: track.image_url.clone(),
            duration: track.duration,
        }
    }
}

impl From<&CuratedPlaylist> for ListingItem {
    fn from(playlist: &CuratedPlaylist) -> Self {
        ListingItem {
            id: playlist.id.clone(),
            title: playlist.title.clone(),
            artist: playlist.description.clone(),
            album: playlist.title.clone(),
            image: playlist.image_url.clone(),
            duration: PLAYLIST_DEFAULT_DURATION_SECS,
        }
    }
}

impl From<&CuratedAlbum> for ListingItem {
    fn from(album: &CuratedAlbum) -> Self {
        ListingItem {
            id: album.id.clone(),
            title: album.title.clone(),
            artist: album.artist.clone(),
            album: album.title.clone(),
            image: album.image_url.clone(),
            duration: album.duration,
        }
    }
}
