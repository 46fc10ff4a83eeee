//! docextract Storage Layer
//!
//! Implements the StatusStore trait using SQLite.
//!
//! # Architecture
//!
//! - One `extraction_tracker` row per document request
//! - Status moves `initiated → inprogress → success | failed`
//! - Extracted data, metadata and error details are stored as JSON text
//!
//! # Examples
//!
//! ```no_run
//! use docextract_store::SqliteTracker;
//! use serde_json::json;
//!
//! let tracker = SqliteTracker::new("docextract.db").unwrap();
//! let id = tracker.create("default", &json!({ "original_filename": "lease.pdf" })).unwrap();
//! ```

#![warn(missing_docs)]

mod memory;

pub use memory::MemoryStatusStore;

use async_trait::async_trait;
use docextract_domain::{DocumentId, DocumentStatus, StatusStore, StatusUpdate};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Longest message kept verbatim
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Tracker row not found
    #[error("Request not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Store cannot accept writes
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// One tracked document request
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerRecord {
    /// Request identifier
    pub id: DocumentId,
    /// Owning application
    pub application_id: String,
    /// Current status
    pub status: DocumentStatus,
    /// Caller-supplied metadata (file name, size, ...)
    pub metadata: Value,
    /// Extracted (or partial) data
    pub extracted_data: Option<Value>,
    /// Latest outcome message
    pub message: Option<String>,
    /// Structured error details
    pub errors: Option<Value>,
    /// Creation time (milliseconds since the Unix epoch)
    pub created_at: i64,
    /// Last update time (milliseconds since the Unix epoch)
    pub updated_at: i64,
}

impl TrackerRecord {
    /// JSON view of the record
    pub fn to_json(&self) -> Value {
        json!({
            "request_id": self.id.to_string(),
            "application_id": self.application_id,
            "status": self.status.as_str(),
            "metadata": self.metadata,
            "extracted_data": self.extracted_data,
            "message": self.message,
            "errors": self.errors,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

/// SQLite-based document tracker
///
/// The connection sits behind a mutex so one tracker can be shared across
/// concurrently processed documents.
pub struct SqliteTracker {
    conn: Mutex<Connection>,
}

impl SqliteTracker {
    /// Open (or create) a tracker database
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Register a new request with status `initiated`
    pub fn create(&self, application_id: &str, metadata: &Value) -> Result<DocumentId, StoreError> {
        let id = DocumentId::new();
        let now = now_millis();

        self.conn()?.execute(
            "INSERT INTO extraction_tracker (request_id, application_id, metadata, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                id.to_string(),
                application_id,
                metadata.to_string(),
                DocumentStatus::Initiated.as_str(),
                now,
            ],
        )?;

        debug!(request_id = %id, application_id, "Tracker row created");
        Ok(id)
    }

    /// Fetch one request
    pub fn get(&self, id: DocumentId) -> Result<Option<TrackerRecord>, StoreError> {
        let record = self
            .conn()?
            .query_row(
                &format!("SELECT {} FROM extraction_tracker WHERE request_id = ?1", COLUMNS),
                params![id.to_string()],
                read_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Requests for one application, newest first
    pub fn history(
        &self,
        application_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TrackerRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM extraction_tracker WHERE application_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3",
            COLUMNS
        ))?;

        let records = stmt
            .query_map(
                params![application_id, limit as i64, offset as i64],
                read_record,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Apply a status transition
    ///
    /// Status and `updated_at` are always written; data, message and errors
    /// only when present. Long messages are truncated.
    pub fn apply(&self, update: &StatusUpdate) -> Result<(), StoreError> {
        let mut sql = String::from("UPDATE extraction_tracker SET status = ?, updated_at = ?");
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![
            Box::new(update.status.as_str()),
            Box::new(now_millis()),
        ];

        if let Some(data) = &update.data {
            sql.push_str(", extracted_data = ?");
            values.push(Box::new(data.to_string()));
        }
        if let Some(message) = &update.message {
            sql.push_str(", message = ?");
            values.push(Box::new(truncate_message(message)));
        }
        if let Some(errors) = &update.errors {
            sql.push_str(", errors = ?");
            values.push(Box::new(errors.to_string()));
        }

        sql.push_str(" WHERE request_id = ?");
        values.push(Box::new(update.id.to_string()));

        let refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let changed = self.conn()?.execute(&sql, &refs[..])?;
        if changed == 0 {
            return Err(StoreError::NotFound(update.id.to_string()));
        }

        debug!(request_id = %update.id, status = %update.status, "Tracker updated");
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl StatusStore for SqliteTracker {
    type Error = StoreError;

    async fn update(&self, update: StatusUpdate) -> Result<(), Self::Error> {
        self.apply(&update)
    }
}

const COLUMNS: &str = "request_id, application_id, status, metadata, extracted_data, message, errors, created_at, updated_at";

fn read_record(row: &Row<'_>) -> rusqlite::Result<TrackerRecord> {
    let id: String = row.get(0)?;
    let id = DocumentId::parse(&id).map_err(|e| conversion_error(0, StoreError::InvalidData(e)))?;

    let status: String = row.get(2)?;
    let status = DocumentStatus::parse(&status).ok_or_else(|| {
        conversion_error(2, StoreError::InvalidData(format!("Unknown status: {}", status)))
    })?;

    Ok(TrackerRecord {
        id,
        application_id: row.get(1)?,
        status,
        metadata: json_column(row, 3)?.unwrap_or(Value::Null),
        extracted_data: json_column(row, 4)?,
        message: row.get(5)?,
        errors: json_column(row, 6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Value>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| serde_json::from_str(&t).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Cap a message at [`MAX_MESSAGE_CHARS`], ending truncated text with `...`
pub fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(MAX_MESSAGE_CHARS - 3).collect();
    truncated.push_str("...");
    truncated
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
