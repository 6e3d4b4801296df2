//! melodb — a query and aggregation engine over a music catalog.
//!
//! The catalog holds three related entity kinds (tracks, albums, artists) in
//! SQLite. A search turns free-form criteria into a filtered, sortable,
//! paginated result set, optionally computes a statistic over the same
//! filtered set, and optionally summarizes it for a chart collaborator.

pub mod catalog;
pub mod chart;
pub mod config;
pub mod query;
pub mod session;

// Re-export commonly used types for convenience
pub use catalog::{Album, Artist, AudioFeatures, CatalogRow, SqliteCatalog, Track};
pub use chart::{ChartKind, ChartRef, ChartRenderer, DataUriChartRenderer, NullChartRenderer};
pub use query::{
    AlbumCriteria, ArtistCriteria, CatalogSearch, Deadline, EntityKind, PageWindow,
    SearchCriteria, SearchError, SearchRequest, SearchResult, StatRequest, Statistic,
    TrackCriteria, ValidationError, PAGE_SIZE,
};
pub use session::{SavedSearch, SearchSession};
