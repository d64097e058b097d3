//! SQLite-backed entity store.

use super::models::{EntityKind, EntityRow, InsertOutcome, ListingItem};
use super::schema::{listing_query, table_for};
use super::trait_def::{EntityStore, StoreError};
use anyhow::{Context, Result};
use rusqlite::{ffi, params, Connection, ErrorCode};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// SQLite-backed store for the provisioned entity kinds.
#[derive(Clone)]
pub struct SqliteEntityStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEntityStore {
    /// Open (or create) the database file at `db_path`.
    ///
    /// No table is created here; schemas are materialized per kind by
    /// [`EntityStore::ensure_schema`].
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open entity database at {:?}", db_path))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        info!("Opened entity database at {:?}", db_path);
        Self::with_connection(conn)
    }

    /// Store backed by a private in-memory SQLite database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(SqliteEntityStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn insert_row(conn: &Connection, row: &EntityRow) -> rusqlite::Result<usize> {
        match row {
            EntityRow::Track(t) => conn.execute(
                "INSERT INTO tracks (id, title, artist, album, image_url, duration)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![t.id, t.title, t.artist, t.album, t.image_url, t.duration],
            ),
            EntityRow::PlayHistory(h) => conn.execute(
                "INSERT INTO recently_played (id, track_id, played_at) VALUES (?1, ?2, ?3)",
                params![h.id, h.track_id, h.played_at.timestamp()],
            ),
            EntityRow::CuratedPlaylist(p) => conn.execute(
                "INSERT INTO made_for_you (id, title, description, image_url)
                 VALUES (?1, ?2, ?3, ?4)",
                params![p.id, p.title, p.description, p.image_url],
            ),
            EntityRow::CuratedAlbum(a) => conn.execute(
                "INSERT INTO popular_albums (id, title, artist, image_url, duration)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![a.id, a.title, a.artist, a.image_url, a.duration],
            ),
        }
    }
}

/// Map "no such table" failures onto [`StoreError::MissingRelation`].
fn classify_error(kind: EntityKind, err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(_, Some(message)) = &err {
        if message.starts_with("no such table") {
            return StoreError::MissingRelation(kind.table_name());
        }
    }
    StoreError::Sqlite(err)
}

impl EntityStore for SqliteEntityStore {
    fn probe(&self, kind: EntityKind) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT 1 FROM {} LIMIT 1", kind.table_name());
        let mut stmt = conn.prepare(&sql).map_err(|e| classify_error(kind, e))?;
        let mut rows = stmt.query([]).map_err(|e| classify_error(kind, e))?;
        rows.next().map_err(|e| classify_error(kind, e))?;
        Ok(())
    }

    fn ensure_schema(&self, kind: EntityKind) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        debug!(kind = %kind, "Creating table {} if absent", kind.table_name());
        let table = table_for(kind);
        table.create_if_absent(&conn)?;
        // A table left by an older layout survives CREATE IF NOT EXISTS.
        table
            .validate(&conn)
            .map_err(|e| StoreError::SchemaMismatch {
                table: kind.table_name(),
                reason: format!("{:#}", e),
            })
    }

    fn count(&self, kind: EntityKind) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", kind.table_name()),
                [],
                |r| r.get(0),
            )
            .map_err(|e| classify_error(kind, e))?;
        Ok(count as usize)
    }

    fn insert(&self, row: &EntityRow) -> Result<InsertOutcome, StoreError> {
        #[cfg(feature = "slowdown")]
        std::thread::sleep(std::time::Duration::from_millis(150));

        let conn = self.conn.lock().unwrap();
        match Self::insert_row(&conn, row) {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                debug!(kind = %row.kind(), id = row.id(), "Row already exists, dropping insert");
                Ok(InsertOutcome::AlreadyExists)
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                let track_id = match row {
                    EntityRow::PlayHistory(h) => h.track_id.clone(),
                    _ => String::new(),
                };
                Err(StoreError::DanglingReference {
                    row_id: row.id().to_string(),
                    track_id,
                })
            }
            Err(e) => Err(classify_error(row.kind(), e)),
        }
    }

    fn select(
        &self,
        kind: EntityKind,
        limit: Option<usize>,
    ) -> Result<Vec<ListingItem>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let sql = listing_query(kind).to_sql(limit);
        let mut stmt = conn.prepare(&sql).map_err(|e| classify_error(kind, e))?;
        let items = stmt
            .query_map([], |row| {
                Ok(ListingItem {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    artist: row.get(2)?,
                    album: row.get(3)?,
                    image: row.get(4)?,
                    duration: row.get(5)?,
                })
            })
            .map_err(|e| classify_error(kind, e))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}
