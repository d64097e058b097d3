//! SQLite table definitions for the provisioned entity kinds.
//!
//! Tables are created lazily, one kind at a time, the first time a request
//! names that kind. All primary keys are the stable text ids of the records.

use super::models::{EntityKind, PLAYLIST_DEFAULT_DURATION_SECS};
use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ForeignKey, SqlType, Table, DEFAULT_TIMESTAMP};

/// Tracks table - every song that can appear in a listing
const TRACKS_TABLE: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("album", &SqlType::Text, non_null = true),
        sqlite_column!("image_url", &SqlType::Text, non_null = true),
        sqlite_column!("duration", &SqlType::Integer, non_null = true), // seconds
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
};

const TRACK_ID_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: "tracks",
    foreign_column: "id",
};

/// Play history - one row per play, newest first by played_at
const RECENTLY_PLAYED_TABLE: Table = Table {
    name: "recently_played",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!(
            "track_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&TRACK_ID_FOREIGN_KEY)
        ),
        sqlite_column!("played_at", &SqlType::Integer, non_null = true), // unix seconds
    ],
    indices: &[("idx_recently_played_played_at", "played_at")],
};

/// "Made for you" curated playlists
const MADE_FOR_YOU_TABLE: Table = Table {
    name: "made_for_you",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text, non_null = true),
        sqlite_column!("image_url", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
};

/// "Popular albums" curated albums
const POPULAR_ALBUMS_TABLE: Table = Table {
    name: "popular_albums",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("image_url", &SqlType::Text, non_null = true),
        sqlite_column!("duration", &SqlType::Integer, non_null = true), // total seconds
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
};

/// Table definition backing the given kind.
pub fn table_for(kind: EntityKind) -> &'static Table {
    match kind {
        EntityKind::Track => &TRACKS_TABLE,
        EntityKind::PlayHistory => &RECENTLY_PLAYED_TABLE,
        EntityKind::CuratedPlaylist => &MADE_FOR_YOU_TABLE,
        EntityKind::CuratedAlbum => &POPULAR_ALBUMS_TABLE,
    }
}

// =============================================================================
// Listing Queries
// =============================================================================

/// The canonical read for a kind, projected onto the uniform
/// `{id, title, artist, album, image, duration}` listing shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// `(expression, alias)` pairs, in listing-shape order.
    pub columns: Vec<(String, &'static str)>,
    pub from: &'static str,
    pub join: Option<&'static str>,
    pub order_by: &'static str,
}

impl ListingQuery {
    pub fn to_sql(&self, limit: Option<usize>) -> String {
        let columns = self
            .columns
            .iter()
            .map(|(expr, alias)| format!("    {} AS {}", expr, alias))
            .collect::<Vec<_>>()
            .join(",\n");
        let mut sql = format!("SELECT\n{}\nFROM {}", columns, self.from);
        if let Some(join) = self.join {
            sql.push_str(&format!("\nJOIN {}", join));
        }
        sql.push_str(&format!("\nORDER BY {}", self.order_by));
        if let Some(limit) = limit {
            sql.push_str(&format!("\nLIMIT {}", limit));
        }
        sql
    }
}

fn plain_columns(exprs: [&str; 6]) -> Vec<(String, &'static str)> {
    exprs
        .iter()
        .map(|e| e.to_string())
        .zip(["id", "title", "artist", "album", "image", "duration"])
        .collect()
}

/// Canonical read for the kind.
///
/// Curated rows keep their insertion order; history is newest first.
pub fn listing_query(kind: EntityKind) -> ListingQuery {
    match kind {
        EntityKind::Track => ListingQuery {
            columns: plain_columns(["id", "title", "artist", "album", "image_url", "duration"]),
            from: "tracks",
            join: None,
            order_by: "rowid",
        },
        EntityKind::PlayHistory => ListingQuery {
            columns: plain_columns([
                "t.id",
                "t.title",
                "t.artist",
                "t.album",
                "t.image_url",
                "t.duration",
            ]),
            from: "recently_played rp",
            join: Some("tracks t ON t.id = rp.track_id"),
            order_by: "rp.played_at DESC",
        },
        EntityKind::CuratedPlaylist => ListingQuery {
            columns: plain_columns([
                "id",
                "title",
                "description",
                "title",
                "image_url",
                &PLAYLIST_DEFAULT_DURATION_SECS.to_string(),
            ]),
            from: "made_for_you",
            join: None,
            order_by: "rowid",
        },
        EntityKind::CuratedAlbum => ListingQuery {
            columns: plain_columns(["id", "title", "artist", "title", "image_url", "duration"]),
            from: "popular_albums",
            join: None,
            order_by: "rowid",
        },
    }
}
