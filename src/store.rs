//! # Route Store
//!
//! Persists the single navigation session snapshot in SQLite.
//!
//! The snapshot is one JSON blob in a one-row table, written with a
//! single `INSERT OR REPLACE`. A reload therefore sees either the full
//! previous snapshot or none of it; there is no partial-write window
//! across fields. A corrupt or inconsistent blob degrades to the idle
//! snapshot instead of failing the reload.

use std::path::Path;
use std::sync::Mutex;

use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::types::SessionSnapshot;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS session_snapshot (
    slot INTEGER PRIMARY KEY CHECK (slot = 0),
    data TEXT NOT NULL
);
";

/// Single-slot persistence for the navigation session.
pub struct RouteStore {
    conn: Mutex<Connection>,
}

impl RouteStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Load the persisted snapshot.
    ///
    /// An empty slot yields the default idle snapshot. A blob that fails
    /// to parse, or that claims an active session without a destination,
    /// is logged and degraded to idle; only real I/O failures surface.
    pub fn load(&self) -> Result<SessionSnapshot> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let blob: Option<String> = conn
            .query_row("SELECT data FROM session_snapshot WHERE slot = 0", [], |r| {
                r.get(0)
            })
            .optional()?;

        let Some(blob) = blob else {
            return Ok(SessionSnapshot::default());
        };

        match serde_json::from_str::<SessionSnapshot>(&blob) {
            Ok(snapshot) if snapshot.is_consistent() => Ok(snapshot),
            Ok(_) => {
                warn!("[RouteStore] Snapshot active without destination, loading as idle");
                Ok(SessionSnapshot::default())
            }
            Err(e) => {
                warn!("[RouteStore] Corrupt snapshot, loading as idle: {e}");
                Ok(SessionSnapshot::default())
            }
        }
    }

    /// Overwrite the snapshot with a single statement.
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let blob = serde_json::to_string(snapshot)?;
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "INSERT OR REPLACE INTO session_snapshot (slot, data) VALUES (0, ?1)",
            params![blob],
        )?;
        Ok(())
    }
}
