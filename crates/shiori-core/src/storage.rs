use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::ShioriError;
use crate::models::{LibraryEntry, MediaSummary, MediaType, TrackingStatus};

const SCHEMA_V1: &str = include_str!("../../../migrations/001_initial.sql");

/// SQLite-backed storage for the shiori library.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, ShioriError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, ShioriError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Tracked entries with the given status, most recently touched first.
    pub fn entries_by_status(
        &self,
        status: TrackingStatus,
        media: MediaType,
    ) -> Result<Vec<LibraryEntry>, ShioriError> {
        let mut stmt = self.conn.prepare(
            "SELECT mal_id, media_type, status, starred, title, synopsis,
                    cover_url, score, url, created_at, updated_at
             FROM library
             WHERE status = ?1 AND media_type = ?2
             ORDER BY updated_at DESC",
        )?;
        let rows = stmt
            .query_map(params![status.as_db_str(), media.as_str()], |row| {
                Ok(row_to_entry(row))
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Starred entries of the given media type, most recently touched first.
    pub fn starred_entries(&self, media: MediaType) -> Result<Vec<LibraryEntry>, ShioriError> {
        let mut stmt = self.conn.prepare(
            "SELECT mal_id, media_type, status, starred, title, synopsis,
                    cover_url, score, url, created_at, updated_at
             FROM library
             WHERE starred = 1 AND media_type = ?1
             ORDER BY updated_at DESC",
        )?;
        let rows = stmt
            .query_map(params![media.as_str()], |row| Ok(row_to_entry(row)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Look up a single entry by its catalog identity.
    pub fn get_entry(
        &self,
        mal_id: i64,
        media: MediaType,
    ) -> Result<Option<LibraryEntry>, ShioriError> {
        let entry = self
            .conn
            .query_row(
                "SELECT mal_id, media_type, status, starred, title, synopsis,
                        cover_url, score, url, created_at, updated_at
                 FROM library
                 WHERE mal_id = ?1 AND media_type = ?2",
                params![mal_id, media.as_str()],
                |row| Ok(row_to_entry(row)),
            )
            .optional()?;
        Ok(entry)
    }

    /// Create a new entry from a catalog summary.
    pub fn insert_entry(
        &self,
        media: &MediaSummary,
        status: TrackingStatus,
        starred: bool,
    ) -> Result<(), ShioriError> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO library (mal_id, media_type, status, starred, title,
             synopsis, cover_url, score, url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                media.mal_id,
                media.media_type.as_str(),
                status.as_db_str(),
                starred as i32,
                media.title,
                media.synopsis,
                media.cover_url,
                media.score,
                media.url,
                now,
                now,
            ],
        )?;
        Ok(())
    }

    /// Update status and starred flag of an existing entry in place.
    pub fn update_tracking(
        &self,
        mal_id: i64,
        media: MediaType,
        status: TrackingStatus,
        starred: bool,
    ) -> Result<(), ShioriError> {
        self.conn.execute(
            "UPDATE library SET status = ?1, starred = ?2, updated_at = ?3
             WHERE mal_id = ?4 AND media_type = ?5",
            params![
                status.as_db_str(),
                starred as i32,
                Utc::now().to_rfc3339(),
                mal_id,
                media.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Remove an entry. Removing an absent entry is not an error.
    pub fn delete_entry(&self, mal_id: i64, media: MediaType) -> Result<(), ShioriError> {
        self.conn.execute(
            "DELETE FROM library WHERE mal_id = ?1 AND media_type = ?2",
            params![mal_id, media.as_str()],
        )?;
        Ok(())
    }

    /// Wipe the whole library.
    pub fn clear(&self) -> Result<(), ShioriError> {
        self.conn.execute("DELETE FROM library", [])?;
        Ok(())
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> LibraryEntry {
    let media_str: String = row.get(1).unwrap_or_default();
    let status_str: String = row.get(2).unwrap_or_default();
    let created_str: String = row.get(9).unwrap_or_default();
    let updated_str: String = row.get(10).unwrap_or_default();

    LibraryEntry {
        mal_id: row.get(0).unwrap_or(0),
        media_type: MediaType::from_db_str(&media_str).unwrap_or(MediaType::Anime),
        status: TrackingStatus::from_db_str(&status_str).unwrap_or(TrackingStatus::Unset),
        starred: row.get::<_, i32>(3).unwrap_or(0) != 0,
        title: row.get(4).unwrap_or_default(),
        synopsis: row.get(5).unwrap_or(None),
        cover_url: row.get(6).unwrap_or(None),
        score: row.get(7).unwrap_or(None),
        url: row.get(8).unwrap_or(None),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn run_migrations(conn: &Connection) -> Result<(), ShioriError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}
