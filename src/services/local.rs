// Local persistence: a SQLite-backed table of string-keyed JSON blobs,
// standing in for the browser storage the prototype used. Holds the session
// profile, notification history and expand/collapse UI state.
//
// Failure semantics: a row that fails to parse is treated as absent, never
// surfaced to the user.

use log::warn;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use crate::error::Result;
use crate::models::{Notification, Session};

const KEY_SESSION: &str = "session";
const KEY_NOTIFICATIONS: &str = "notifications";
const KEY_EXPANDED: &str = "expanded_panels";

/// Maximum notifications kept in history; oldest entries are evicted.
pub const MAX_NOTIFICATIONS: usize = 20;

pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Open (and initialize) the store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory store, used by tests and by callers that opt out of
    /// persistence.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Read and parse a stored blob. Missing or corrupt data reads as `None`.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let conn = self.conn.lock().expect("local store lock poisoned");
        let raw: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .ok();
        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("discarding corrupt local data for {:?}: {}", key, e);
                None
            }
        }
    }

    fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let conn = self.conn.lock().expect("local store lock poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
            rusqlite::params![key, raw],
        )?;
        Ok(())
    }

    // ==================== session ====================

    /// Load the saved display profile, defaulting when absent or corrupt.
    pub fn load_session(&self) -> Session {
        self.get_json(KEY_SESSION).unwrap_or_default()
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        self.put_json(KEY_SESSION, session)
    }

    // ==================== notifications ====================

    /// Load notification history, newest first.
    pub fn load_notifications(&self) -> Vec<Notification> {
        self.get_json(KEY_NOTIFICATIONS).unwrap_or_default()
    }

    /// Persist the capped notification list. The caller keeps the list
    /// newest-first; anything past the cap is dropped here.
    pub fn save_notifications(&self, notifications: &[Notification]) -> Result<()> {
        let capped = &notifications[..notifications.len().min(MAX_NOTIFICATIONS)];
        self.put_json(KEY_NOTIFICATIONS, &capped)
    }

    // ==================== UI state ====================

    /// Panels the user expanded, by panel key.
    pub fn load_expanded_panels(&self) -> HashSet<String> {
        self.get_json(KEY_EXPANDED).unwrap_or_default()
    }

    pub fn save_expanded_panels(&self, panels: &HashSet<String>) -> Result<()> {
        self.put_json(KEY_EXPANDED, panels)
    }
}
