//! Connection provider
//!
//! Opens SQLite connections according to a `DatabaseConfig` and hands a fresh
//! one to every registered listener whenever the database is (re)connected.
//! Listeners own their connection outright; the provider keeps none.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Default busy timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Receives connection lifecycle notifications from a `Database`
pub trait ReconnectListener: Send + Sync {
    /// Take ownership of a newly opened connection.
    ///
    /// An error aborts the reconnect and is reported to whoever triggered it.
    fn reconnect(&self, conn: Connection) -> Result<()>;

    /// Drop any connection previously handed over
    fn disconnect(&self) {}
}

/// `SQLite` journal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// WAL journal mode (recommended)
    #[default]
    Wal,
    /// Delete journal mode (legacy)
    Delete,
}

impl JournalMode {
    /// Returns the `SQLite` pragma value
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` synchronous mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Full synchronous mode (safest)
    #[default]
    Full,
    /// Normal synchronous mode (balanced)
    Normal,
}

impl SyncMode {
    /// Returns the `SQLite` pragma value
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// How to open connections.
///
/// With no `path`, every connection is a separate in-memory database, so data
/// does not survive a reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
    pub busy_timeout_ms: u64,
    pub journal_mode: JournalMode,
    pub sync_mode: SyncMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl DatabaseConfig {
    /// Private in-memory database per connection
    pub fn in_memory() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: JournalMode::default(),
            sync_mode: SyncMode::default(),
        }
    }

    /// Database file at `path` (created on first connect)
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::in_memory()
        }
    }
}

/// Owns the connection settings and the set of listeners to reconnect
pub struct Database {
    config: DatabaseConfig,
    listeners: Vec<Arc<dyn ReconnectListener>>,
}

impl Database {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Register a listener. It is not connected until the next `connect`.
    pub fn add_listener(&mut self, listener: Arc<dyn ReconnectListener>) {
        self.listeners.push(listener);
    }

    /// Open a new connection with the configured pragmas applied
    pub fn open_connection(&self) -> Result<Connection> {
        let conn = match &self.config.path {
            Some(path) => {
                ensure_parent_dir(path)?;
                let conn = Connection::open(path)?;
                conn.execute_batch(&format!(
                    "PRAGMA journal_mode = {}; PRAGMA synchronous = {};",
                    self.config.journal_mode.pragma_value(),
                    self.config.sync_mode.pragma_value()
                ))?;
                conn
            }
            None => Connection::open_in_memory()?,
        };
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))?;
        Ok(conn)
    }

    /// Hand every listener a fresh connection.
    ///
    /// Stops at the first listener that fails and returns its error; listeners
    /// already notified keep their new connection.
    pub fn connect(&self) -> Result<()> {
        match &self.config.path {
            Some(path) => tracing::info!("Connecting {} listener(s) to {}", self.listeners.len(), path.display()),
            None => tracing::info!("Connecting {} listener(s) to in-memory databases", self.listeners.len()),
        }

        for listener in &self.listeners {
            let conn = self.open_connection()?;
            listener.reconnect(conn)?;
        }
        Ok(())
    }

    /// Tell every listener to drop its connection
    pub fn disconnect(&self) {
        for listener in &self.listeners {
            listener.disconnect();
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
