//! Music catalog storage: entity models, SQLite schema and the read store.

mod models;
mod schema;
mod store;

pub use models::{Album, Artist, AudioFeatures, CatalogRow, Track};
pub(crate) use models::{album_from_row, artist_from_row, track_from_row};
pub use schema::{create_schema, ensure_schema, SCHEMA_VERSION};
pub use store::{SqliteCatalog, DEFAULT_READ_POOL_SIZE};
