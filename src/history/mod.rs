//! Append-only search history stored in SQLite.

mod schema;


use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};
use thiserror::Error;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::answerer::StructuredAnswer;

use schema::INITIAL_SCHEMA;

/// Format SQLite uses for `CURRENT_TIMESTAMP`.
const CREATED_AT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// How long a writer waits on SQLite's own lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from history writes and reads.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The store has been closed
    #[error("History store is closed")]
    Closed,

    /// SQLite reported an error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The relevant articles could not be encoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A history row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryRecord {
    pub query: String,
    pub summary: String,
    pub relevant_articles_json: String,
}

impl NewHistoryRecord {
    /// Builds a record for `query` from a structured answer.
    pub fn from_answer(query: &str, answer: &StructuredAnswer) -> Result<Self, HistoryError> {
        Ok(Self {
            query: query.to_string(),
            summary: answer.summary.clone(),
            relevant_articles_json: answer.relevant_articles_json()?,
        })
    }
}

/// A persisted history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub id: i64,
    pub query: String,
    pub summary: String,
    pub relevant_articles_json: String,
    pub created_at: PrimitiveDateTime,
}

impl HistoryRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let created_at: String = row.get(4)?;
        let created_at = PrimitiveDateTime::parse(&created_at, CREATED_AT_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Self {
            id: row.get(0)?,
            query: row.get(1)?,
            summary: row.get(2)?,
            relevant_articles_json: row.get(3)?,
            created_at,
        })
    }
}

/// SQLite-backed history store.
///
/// The connection sits behind the store's own mutex, so the store can be
/// shared across request workers. Writes are serialized there and by
/// SQLite's file lock across processes.
pub struct HistoryStore {
    conn: Mutex<Option<Connection>>,
}

impl HistoryStore {
    /// Opens an in-memory history store.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    /// Opens a file-based history store at the given path.
    ///
    /// Creates the database file if it does not exist.
    /// Automatically initializes the schema on connection open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Initializes the database schema.
    ///
    /// Uses IF NOT EXISTS for idempotent execution.
    fn initialize_schema(conn: &Connection) -> Result<()> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(INITIAL_SCHEMA)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, HistoryError> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(HistoryError::Closed)?;
        Ok(f(conn)?)
    }

    /// Appends one record and returns its store-assigned id.
    ///
    /// Values are bound as parameters; `created_at` is set by SQLite.
    pub fn append(&self, record: &NewHistoryRecord) -> Result<i64, HistoryError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(
                "INSERT INTO search_history (user_query, ai_summary_answer, ai_relevant_articles)
                 VALUES (?1, ?2, ?3)",
            )?;
            stmt.execute((
                &record.query,
                &record.summary,
                &record.relevant_articles_json,
            ))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Fetches a record by id.
    pub fn get(&self, id: i64) -> Result<Option<HistoryRecord>, HistoryError> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT id, user_query, ai_summary_answer, ai_relevant_articles, created_at
                 FROM search_history WHERE id = ?1",
                [id],
                HistoryRecord::from_row,
            )
            .optional()
        })
    }

    /// Counts records whose query equals `query` exactly.
    pub fn count_for_query(&self, query: &str) -> Result<i64, HistoryError> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM search_history WHERE user_query = ?1",
                [query],
                |row| row.get(0),
            )
        })
    }

    /// Returns the total number of records.
    pub fn len(&self) -> Result<i64, HistoryError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT COUNT(*) FROM search_history", [], |row| row.get(0))
        })
    }

    /// Returns true if no records have been written.
    pub fn is_empty(&self) -> Result<bool, HistoryError> {
        Ok(self.len()? == 0)
    }

    /// Closes the underlying connection.
    ///
    /// Later calls fail with [`HistoryError::Closed`]. Closing twice is a no-op.
    pub fn close(&self) -> Result<(), HistoryError> {
        if let Some(conn) = self.lock().take() {
            conn.close().map_err(|(_, e)| HistoryError::Sqlite(e))?;
        }
        Ok(())
    }
}
