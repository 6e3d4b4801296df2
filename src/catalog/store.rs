//! SQLite-backed music catalog.
//!
//! The engine only ever reads in this crate. The write connection creates or
//! validates the schema at open time and then stays open so the WAL sidecar
//! files remain live for the read-only pool. Searches go through a small
//! round-robin pool of read-only connections; a search invocation locks one
//! pooled connection for its whole statement sequence and releases it on
//! every exit path through the mutex guard.

use super::schema::ensure_schema;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

pub const DEFAULT_READ_POOL_SIZE: usize = 4;

/// SQLite-backed catalog of tracks, albums and artists.
pub struct SqliteCatalog {
    write_conn: Mutex<Connection>,
    read_pool: Vec<Arc<Mutex<Connection>>>,
    read_index: AtomicUsize,
}

impl SqliteCatalog {
    /// Open a catalog database, creating the schema if the file is new.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of connections for concurrent searches
    pub fn open<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open catalog database")?;

        ensure_schema(&write_conn)?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let track_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))
            .unwrap_or(0);
        let album_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM albums", [], |r| r.get(0))
            .unwrap_or(0);
        let artist_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM artists", [], |r| r.get(0))
            .unwrap_or(0);

        info!(
            "Opened music catalog: {} tracks, {} albums, {} artists",
            track_count, album_count, artist_count
        );

        let pool_size = read_pool_size.max(1);
        let mut read_pool = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            // Substring filters promise case-sensitive matching; SQLite's
            // LIKE is ASCII-case-insensitive unless told otherwise.
            read_conn.pragma_update(None, "case_sensitive_like", true)?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteCatalog {
            write_conn: Mutex::new(write_conn),
            read_pool,
            read_index: AtomicUsize::new(0),
        })
    }

    /// Hand out the next read connection, round robin. The caller locks it
    /// for the duration of one search invocation.
    pub(crate) fn read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    /// Get the number of tracks in the catalog.
    pub fn track_count(&self) -> Result<i64> {
        self.count_rows("tracks")
    }

    /// Get the number of albums in the catalog.
    pub fn album_count(&self) -> Result<i64> {
        self.count_rows("albums")
    }

    /// Get the number of artists in the catalog.
    pub fn artist_count(&self) -> Result<i64> {
        self.count_rows("artists")
    }

    fn count_rows(&self, table: &str) -> Result<i64> {
        let conn = self.write_conn.lock().unwrap();
        let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
        Ok(count)
    }
}
