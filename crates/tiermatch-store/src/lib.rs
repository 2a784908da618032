//! Tiermatch Storage Layer
//!
//! Implements the [`SessionStore`] trait on a single SQLite key-value table.
//!
//! # Layout
//!
//! - `ce-matching-<user>`: one user's rankings (user lowercased)
//! - `ce-matching-identity`: last signed-in user
//! - `ce-matching-sheet-cache`: last fetched rating matrix
//!
//! Values are JSON documents.
//!
//! # Examples
//!
//! ```no_run
//! use tiermatch_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for session operations
//! ```

#![warn(missing_docs)]

mod records;

use records::{MatrixRecord, SessionRecord};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tiermatch_domain::traits::SessionStore;
use tiermatch_domain::{PeerRatingMatrix, SessionState};
use tracing::debug;

/// Prefix shared by every key
pub const KEY_PREFIX: &str = "ce-matching-";

/// Key of the remembered identity
pub const IDENTITY_KEY: &str = "ce-matching-identity";

/// Key of the cached rating matrix
pub const SHEET_CACHE_KEY: &str = "ce-matching-sheet-cache";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Value could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage key for a user's rankings
///
/// # Examples
///
/// ```
/// use tiermatch_store::session_key;
///
/// assert_eq!(session_key("Kate"), "ce-matching-kate");
/// ```
pub fn session_key(user: &str) -> String {
    format!("{}{}", KEY_PREFIX, user.to_lowercase())
}

/// SQLite-based implementation of SessionStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store across tasks behind a
/// mutex, or open one store per thread.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Raw value stored under a key
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Store a raw value, replacing any previous one
    pub fn put_raw(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now_secs()],
        )?;
        Ok(())
    }

    /// Delete a key; returns true when something was removed
    pub fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        let removed = self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn put_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.put_raw(key, &raw)
    }
}

impl SessionStore for SqliteStore {
    type Error = StoreError;

    fn load_session(&self, user: &str) -> Result<Option<SessionState>, Self::Error> {
        let record: Option<SessionRecord> = self.get_json(&session_key(user))?;
        Ok(record.map(SessionState::from))
    }

    fn save_session(&mut self, user: &str, state: &SessionState) -> Result<(), Self::Error> {
        let key = session_key(user);
        debug!("Saving session under {}", key);
        self.put_json(&key, &SessionRecord::from(state))
    }

    fn clear_session(&mut self, user: &str) -> Result<(), Self::Error> {
        let key = session_key(user);
        if self.delete(&key)? {
            debug!("Cleared {}", key);
        }
        Ok(())
    }

    fn load_identity(&self) -> Result<Option<String>, Self::Error> {
        let identity: Option<String> = self.get_json(IDENTITY_KEY)?;
        Ok(identity.filter(|name| !name.trim().is_empty()))
    }

    fn save_identity(&mut self, user: &str) -> Result<(), Self::Error> {
        if user.trim().is_empty() {
            return Err(StoreError::InvalidData("identity must not be empty".to_string()));
        }
        self.put_json(IDENTITY_KEY, &user)
    }

    fn load_cached_matrix(&self) -> Result<Option<PeerRatingMatrix>, Self::Error> {
        let record: Option<MatrixRecord> = self.get_json(SHEET_CACHE_KEY)?;
        Ok(record.map(PeerRatingMatrix::from))
    }

    fn save_cached_matrix(&mut self, matrix: &PeerRatingMatrix) -> Result<(), Self::Error> {
        self.put_json(SHEET_CACHE_KEY, &MatrixRecord::from(matrix))
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
