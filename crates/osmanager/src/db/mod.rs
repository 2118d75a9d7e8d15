//! Database module for persistent storage.
//!
//! Uses rusqlite (SQLite). A file-backed `Database` opens a fresh connection
//! for every operation and drops it before returning, so request handlers
//! never share a connection. The in-memory variant keeps a single
//! connection behind a `Mutex`, since each in-memory connection is its own
//! database.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

pub mod error;
pub mod order_repo;
pub mod schema;
pub mod stats_repo;

pub use error::DatabaseError;

#[derive(Clone)]
enum Backend {
    File(PathBuf),
    Memory(Arc<Mutex<Connection>>),
}

/// Cheaply cloneable database handle.
#[derive(Clone)]
pub struct Database {
    backend: Backend,
}

impl Database {
    /// Opens (or creates) the database at the given path and ensures the
    /// orders table exists.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        schema::create(&conn)?;

        log::info!("Database opened at {}", path.display());

        Ok(Self {
            backend: Backend::File(path.to_path_buf()),
        })
    }

    /// Opens an in-memory database for testing.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        schema::create(&conn)?;

        Ok(Self {
            backend: Backend::Memory(Arc::new(Mutex::new(conn))),
        })
    }

    /// Runs `f` against a connection scoped to this call.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        match &self.backend {
            Backend::File(path) => {
                let conn = Connection::open(path)?;
                f(&conn)
            }
            Backend::Memory(shared) => {
                let conn = shared.lock().map_err(|_| DatabaseError::LockPoisoned)?;
                f(&conn)
            }
        }
    }

    /// Path of the backing file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::File(path) => Some(path),
            Backend::Memory(_) => None,
        }
    }

    /// Size of the backing file in bytes, including pages still held in
    /// the write-ahead log.
    pub fn file_size(&self) -> Result<u64, DatabaseError> {
        match &self.backend {
            Backend::File(path) => {
                let main = std::fs::metadata(path)
                    .map(|m| m.len())
                    .map_err(|e| DatabaseError::Io {
                        path: path.clone(),
                        source: e,
                    })?;
                let wal = std::fs::metadata(wal_path(path)).map_or(0, |m| m.len());
                Ok(main + wal)
            }
            Backend::Memory(_) => Ok(0),
        }
    }
}

/// The `-wal` sidecar SQLite keeps next to a database in WAL mode.
fn wal_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push("-wal");
    PathBuf::from(name)
}

/// Returns the canonical database path: `~/.osmanager/data/ordens_servico_completo.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| {
        h.join(".osmanager")
            .join("data")
            .join("ordens_servico_completo.db")
    })
}
