//! Storage layer for the timesheet tracker.
//!
//! Provides persistence for timesheet entries and time slices using
//! `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. A `Database` instance can be moved between threads but cannot
//! be shared across threads without external synchronization.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in ISO 8601 UTC format (e.g.
//! `2026-01-05T08:00:00Z`). Lexicographic ordering of that format matches
//! chronological ordering, so the slice window filter is a plain `WHERE`
//! clause over text columns.
//!
//! Slice tokens are TEXT with a UNIQUE constraint; the token, not the row ID,
//! is the external lookup key for shared views.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use tl_core::datetime::format_timestamp;
use tl_core::{SliceToken, TimeEntry, TimeSlice, UserId};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for record {id}: {value}")]
    TimestampParse {
        id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored owner or token failed validation on the way out.
    #[error("invalid stored value for record {id}: {message}")]
    InvalidRecord { id: i64, message: String },
}

/// Outcome of an owner-checked lookup.
///
/// `Forbidden` is distinct from `NotFound` so callers can tell "someone
/// else's record" apart from "no such record" and branch without exceptions.
/// Token-based slice reads never produce `Forbidden`: holding the token is
/// the access control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Forbidden,
}

impl<T> Lookup<T> {
    /// Maps the `Found` value, leaving the other outcomes untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
            Self::Forbidden => Lookup::Forbidden,
        }
    }

    /// Whether the lookup found an accessible record.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// A stored entry together with its internal row ID.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRow {
    pub id: i64,
    pub entry: TimeEntry,
}

/// A stored slice together with its internal row ID.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceRow {
    pub id: i64,
    pub slice: TimeSlice,
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Entries table: one row per recorded work day
            -- start_time/end_time: ISO 8601 UTC (e.g. '2026-01-05T08:00:00Z')
            -- end_time is NULL while an entry is still open
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY,
                start_time TEXT NOT NULL,
                end_time TEXT,
                lunch_minutes INTEGER NOT NULL DEFAULT 0,
                morning_task TEXT,
                afternoon_task TEXT,
                owner TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_owner ON entries(owner);
            CREATE INDEX IF NOT EXISTS idx_entries_start ON entries(start_time);

            -- Slices table: shareable date ranges, looked up by token
            CREATE TABLE IF NOT EXISTS slices (
                id INTEGER PRIMARY KEY,
                token TEXT NOT NULL UNIQUE,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                owner TEXT NOT NULL,
                allow_task_details INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_slices_owner ON slices(owner);
            ",
        )?;
        Ok(())
    }

    // ========== Entries ==========

    /// Inserts an entry and returns its new row ID.
    pub fn insert_entry(&self, entry: &TimeEntry) -> Result<i64, DbError> {
        tracing::debug!(
            owner = %entry.owner,
            start = %format_timestamp(entry.start),
            "saving entry"
        );
        self.conn.execute(
            "
            INSERT INTO entries (start_time, end_time, lunch_minutes, morning_task, afternoon_task, owner)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                format_timestamp(entry.start),
                entry.end.map(format_timestamp),
                entry.lunch_minutes,
                entry.morning_task,
                entry.afternoon_task,
                entry.owner.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetches an entry by row ID with no ownership check.
    pub fn get_entry(&self, id: i64) -> Result<Option<EntryRow>, DbError> {
        let raw = self
            .conn
            .query_row(
                "
                SELECT id, start_time, end_time, lunch_minutes, morning_task, afternoon_task, owner
                FROM entries
                WHERE id = ?
                ",
                [id],
                raw_entry_from_row,
            )
            .optional()?;
        raw.map(EntryRow::try_from).transpose()
    }

    /// Fetches an entry on behalf of `user`.
    ///
    /// A record owned by someone else comes back as [`Lookup::Forbidden`],
    /// which is distinct from [`Lookup::NotFound`].
    pub fn entry_for(&self, id: i64, user: &UserId) -> Result<Lookup<EntryRow>, DbError> {
        match self.get_entry(id)? {
            None => Ok(Lookup::NotFound),
            Some(row) if row.entry.owner != *user => Ok(Lookup::Forbidden),
            Some(row) => Ok(Lookup::Found(row)),
        }
    }

    /// Updates an entry's fields on behalf of `user`.
    ///
    /// The stored owner never changes: ownership is immutable after creation,
    /// so the owner carried by `entry` is ignored here.
    pub fn update_entry(
        &self,
        id: i64,
        user: &UserId,
        entry: &TimeEntry,
    ) -> Result<Lookup<()>, DbError> {
        match self.entry_for(id, user)? {
            Lookup::Found(_) => {}
            Lookup::NotFound => return Ok(Lookup::NotFound),
            Lookup::Forbidden => return Ok(Lookup::Forbidden),
        }
        tracing::debug!(id, start = %format_timestamp(entry.start), "updating entry");
        self.conn.execute(
            "
            UPDATE entries
            SET start_time = ?, end_time = ?, lunch_minutes = ?, morning_task = ?, afternoon_task = ?
            WHERE id = ?
            ",
            params![
                format_timestamp(entry.start),
                entry.end.map(format_timestamp),
                entry.lunch_minutes,
                entry.morning_task,
                entry.afternoon_task,
                id,
            ],
        )?;
        Ok(Lookup::Found(()))
    }

    /// Deletes an entry on behalf of `user`.
    ///
    /// Deleting a record that is already gone is [`Lookup::NotFound`], not a
    /// second deletion.
    pub fn delete_entry(&self, id: i64, user: &UserId) -> Result<Lookup<()>, DbError> {
        match self.entry_for(id, user)? {
            Lookup::Found(_) => {}
            Lookup::NotFound => {
                tracing::debug!(id, "no entry deleted");
                return Ok(Lookup::NotFound);
            }
            Lookup::Forbidden => return Ok(Lookup::Forbidden),
        }
        tracing::debug!(id, "deleting entry");
        self.conn.execute("DELETE FROM entries WHERE id = ?", [id])?;
        Ok(Lookup::Found(()))
    }

    /// Lists one user's entries ordered by start time.
    pub fn list_entries(&self, owner: &UserId) -> Result<Vec<EntryRow>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, start_time, end_time, lunch_minutes, morning_task, afternoon_task, owner
            FROM entries
            WHERE owner = ?
            ORDER BY start_time ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([owner.as_str()], raw_entry_from_row)?;
        collect_entries(rows)
    }

    /// Lists every user's entries ordered by start time.
    ///
    /// Only the explicitly-unscoped export path uses this.
    pub fn list_all_entries(&self) -> Result<Vec<EntryRow>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, start_time, end_time, lunch_minutes, morning_task, afternoon_task, owner
            FROM entries
            ORDER BY start_time ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], raw_entry_from_row)?;
        collect_entries(rows)
    }

    /// Resolves the entries a slice currently exposes.
    ///
    /// This is the lazy query behind slice views: same owner, `start_time` on
    /// or after the window start, `end_time` present and on or before the
    /// window end. Entries changed after the slice was created are reflected
    /// on the next call. Rows come back in storage order; callers must not
    /// rely on any particular ordering.
    pub fn entries_in_slice(&self, slice: &TimeSlice) -> Result<Vec<EntryRow>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, start_time, end_time, lunch_minutes, morning_task, afternoon_task, owner
            FROM entries
            WHERE owner = ? AND end_time IS NOT NULL AND start_time >= ? AND end_time <= ?
            ",
        )?;
        let rows = stmt.query_map(
            params![
                slice.owner.as_str(),
                format_timestamp(slice.start),
                format_timestamp(slice.end),
            ],
            raw_entry_from_row,
        )?;
        collect_entries(rows)
    }

    // ========== Slices ==========

    /// Inserts a slice and returns its new row ID.
    ///
    /// The token's UNIQUE constraint backs the uniqueness invariant; a
    /// colliding token surfaces as a constraint violation.
    pub fn insert_slice(&self, slice: &TimeSlice) -> Result<i64, DbError> {
        tracing::debug!(owner = %slice.owner, "saving slice");
        self.conn.execute(
            "
            INSERT INTO slices (token, start_time, end_time, owner, allow_task_details)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                slice.token.as_str(),
                format_timestamp(slice.start),
                format_timestamp(slice.end),
                slice.owner.as_str(),
                slice.allow_task_details,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetches a slice by row ID with no ownership check.
    pub fn get_slice(&self, id: i64) -> Result<Option<SliceRow>, DbError> {
        let raw = self
            .conn
            .query_row(
                "
                SELECT id, token, start_time, end_time, owner, allow_task_details
                FROM slices
                WHERE id = ?
                ",
                [id],
                raw_slice_from_row,
            )
            .optional()?;
        raw.map(SliceRow::try_from).transpose()
    }

    /// Fetches a slice on behalf of `user`.
    pub fn slice_for(&self, id: i64, user: &UserId) -> Result<Lookup<SliceRow>, DbError> {
        match self.get_slice(id)? {
            None => Ok(Lookup::NotFound),
            Some(row) if row.slice.owner != *user => Ok(Lookup::Forbidden),
            Some(row) => Ok(Lookup::Found(row)),
        }
    }

    /// Looks up a slice by its opaque token.
    ///
    /// Read-only and unauthenticated: the token itself is the access control,
    /// so there is no ownership check on this path.
    pub fn slice_by_token(&self, token: &SliceToken) -> Result<Option<SliceRow>, DbError> {
        let raw = self
            .conn
            .query_row(
                "
                SELECT id, token, start_time, end_time, owner, allow_task_details
                FROM slices
                WHERE token = ?
                ",
                [token.as_str()],
                raw_slice_from_row,
            )
            .optional()?;
        raw.map(SliceRow::try_from).transpose()
    }

    /// Updates a slice's window and task visibility on behalf of `user`.
    ///
    /// The token and owner never change.
    pub fn update_slice(
        &self,
        id: i64,
        user: &UserId,
        slice: &TimeSlice,
    ) -> Result<Lookup<()>, DbError> {
        match self.slice_for(id, user)? {
            Lookup::Found(_) => {}
            Lookup::NotFound => return Ok(Lookup::NotFound),
            Lookup::Forbidden => return Ok(Lookup::Forbidden),
        }
        tracing::debug!(id, "updating slice");
        self.conn.execute(
            "
            UPDATE slices
            SET start_time = ?, end_time = ?, allow_task_details = ?
            WHERE id = ?
            ",
            params![
                format_timestamp(slice.start),
                format_timestamp(slice.end),
                slice.allow_task_details,
                id,
            ],
        )?;
        Ok(Lookup::Found(()))
    }

    /// Deletes a slice on behalf of `user`.
    pub fn delete_slice(&self, id: i64, user: &UserId) -> Result<Lookup<()>, DbError> {
        match self.slice_for(id, user)? {
            Lookup::Found(_) => {}
            Lookup::NotFound => {
                tracing::debug!(id, "no slice deleted");
                return Ok(Lookup::NotFound);
            }
            Lookup::Forbidden => return Ok(Lookup::Forbidden),
        }
        tracing::debug!(id, "deleting slice");
        self.conn.execute("DELETE FROM slices WHERE id = ?", [id])?;
        Ok(Lookup::Found(()))
    }

    /// Lists one user's slices ordered by start time.
    pub fn list_slices(&self, owner: &UserId) -> Result<Vec<SliceRow>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, token, start_time, end_time, owner, allow_task_details
            FROM slices
            WHERE owner = ?
            ORDER BY start_time ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([owner.as_str()], raw_slice_from_row)?;
        let mut slices = Vec::new();
        for row in rows {
            slices.push(SliceRow::try_from(row?)?);
        }
        Ok(slices)
    }
}

// ========== Row Conversion ==========

/// An entry row as stored, before timestamps and owner are validated.
struct RawEntry {
    id: i64,
    start: String,
    end: Option<String>,
    lunch_minutes: i64,
    morning_task: Option<String>,
    afternoon_task: Option<String>,
    owner: String,
}

fn raw_entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
    Ok(RawEntry {
        id: row.get(0)?,
        start: row.get(1)?,
        end: row.get(2)?,
        lunch_minutes: row.get(3)?,
        morning_task: row.get(4)?,
        afternoon_task: row.get(5)?,
        owner: row.get(6)?,
    })
}

impl TryFrom<RawEntry> for EntryRow {
    type Error = DbError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let start = parse_stored_timestamp(raw.id, &raw.start)?;
        let end = raw
            .end
            .as_deref()
            .map(|value| parse_stored_timestamp(raw.id, value))
            .transpose()?;
        let owner = UserId::new(raw.owner).map_err(|err| DbError::InvalidRecord {
            id: raw.id,
            message: err.to_string(),
        })?;
        Ok(Self {
            id: raw.id,
            entry: TimeEntry {
                start,
                end,
                lunch_minutes: raw.lunch_minutes,
                morning_task: raw.morning_task,
                afternoon_task: raw.afternoon_task,
                owner,
            },
        })
    }
}

/// A slice row as stored, before timestamps, owner, and token are validated.
struct RawSlice {
    id: i64,
    token: String,
    start: String,
    end: String,
    owner: String,
    allow_task_details: bool,
}

fn raw_slice_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSlice> {
    Ok(RawSlice {
        id: row.get(0)?,
        token: row.get(1)?,
        start: row.get(2)?,
        end: row.get(3)?,
        owner: row.get(4)?,
        allow_task_details: row.get(5)?,
    })
}

impl TryFrom<RawSlice> for SliceRow {
    type Error = DbError;

    fn try_from(raw: RawSlice) -> Result<Self, Self::Error> {
        let start = parse_stored_timestamp(raw.id, &raw.start)?;
        let end = parse_stored_timestamp(raw.id, &raw.end)?;
        let invalid = |err: tl_core::ValidationError| DbError::InvalidRecord {
            id: raw.id,
            message: err.to_string(),
        };
        let owner = UserId::new(raw.owner).map_err(invalid)?;
        let token = SliceToken::new(raw.token).map_err(invalid)?;
        Ok(Self {
            id: raw.id,
            slice: TimeSlice {
                start,
                end,
                owner,
                token,
                allow_task_details: raw.allow_task_details,
            },
        })
    }
}

fn parse_stored_timestamp(id: i64, value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            id,
            value: value.to_string(),
            source,
        })
}

fn collect_entries(
    rows: impl Iterator<Item = rusqlite::Result<RawEntry>>,
) -> Result<Vec<EntryRow>, DbError> {
    let mut entries = Vec::new();
    for row in rows {
        entries.push(EntryRow::try_from(row?)?);
    }
    Ok(entries)
}
