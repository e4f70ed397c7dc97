// src/storage.rs

use crate::error::Result;
use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Persistence collaborator. Each store serializes its whole collection into
/// one blob under its own namespace; a save replaces the previous snapshot
/// atomically, so readers never observe a half-written collection.
pub trait Storage: Send + Sync {
    fn load(&self, namespace: &str) -> Result<Option<String>>;
    fn save(&self, namespace: &str, blob: &str) -> Result<()>;
}

/// SQLite-backed snapshot store: one row per namespace.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    rusqlite::Error::SqliteFailure(
                        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                        Some(format!("failed to create directory: {}", e)),
                    )
                })?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS snapshots (
                namespace TEXT PRIMARY KEY,
                blob TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl Storage for SqliteStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let blob = conn
            .query_row(
                "SELECT blob FROM snapshots WHERE namespace = ?",
                [namespace],
                |row| row.get(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn save(&self, namespace: &str, blob: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO snapshots (namespace, blob, updated_at) VALUES (?, ?, ?)",
            params![namespace, blob, Utc::now().timestamp()],
        )?;
        debug!("[Storage] snapshot '{}' saved ({} bytes)", namespace, blob.len());
        Ok(())
    }
}

/// Volatile map-backed storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>> {
        Ok(self.blobs.lock().unwrap().get(namespace).cloned())
    }

    fn save(&self, namespace: &str, blob: &str) -> Result<()> {
        self.blobs
            .lock()
            .unwrap()
            .insert(namespace.to_string(), blob.to_string());
        Ok(())
    }
}
