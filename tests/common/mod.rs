//! Common test infrastructure
//!
//! A `TestCatalog` is a real SQLite catalog in a temp directory plus a write
//! connection for seeding fixture rows. Tests build an engine over it and
//! search the same way a caller would.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::{insert_album, insert_artist, insert_track, TrackFixture};

use melodb::{CatalogSearch, DataUriChartRenderer, NullChartRenderer, SqliteCatalog};
use rusqlite::Connection;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestCatalog {
    pub store: Arc<SqliteCatalog>,
    pub writer: Connection,
    _dir: TempDir,
}

impl TestCatalog {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("music.db");
        let store = Arc::new(SqliteCatalog::open(&db_path, 2).unwrap());
        let writer = Connection::open(&db_path).unwrap();
        TestCatalog {
            store,
            writer,
            _dir: dir,
        }
    }

    /// Engine with the no-op chart renderer.
    pub fn engine(&self) -> CatalogSearch {
        CatalogSearch::new(self.store.clone(), Arc::new(NullChartRenderer))
    }

    /// Engine with the data-URI chart renderer, for chart assertions.
    pub fn engine_with_charts(&self) -> CatalogSearch {
        CatalogSearch::new(self.store.clone(), Arc::new(DataUriChartRenderer))
    }
}
