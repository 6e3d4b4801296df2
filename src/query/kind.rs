//! Entity kind descriptors.
//!
//! One descriptor per searchable kind carries everything that differs between
//! tracks, albums and artists — source table, matched-row SELECT with the
//! kind's join shape, grouping, the closed order/statistic column allow-lists
//! and the row mapper — so a single orchestrator path serves all three.
//!
//! Allow-lists map a public column name to a fixed SQL expression; request
//! text is only ever compared against the keys and never reaches query
//! syntax.

use crate::catalog::{album_from_row, artist_from_row, track_from_row, CatalogRow};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Track,
    Album,
    Artist,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Track => "tracks",
            EntityKind::Album => "albums",
            EntityKind::Artist => "artists",
        };
        write!(f, "{}", label)
    }
}

pub struct KindSpec {
    pub kind: EntityKind,
    /// Table statistics are computed against (no join needed there).
    pub stat_table: &'static str,
    /// Matched-row SELECT including the kind's join shape, up to (not
    /// including) the WHERE clause.
    pub select_sql: &'static str,
    pub group_by: Option<&'static str>,
    /// Public order column name -> SQL expression.
    pub order_columns: &'static [(&'static str, &'static str)],
    /// Public statistic column name -> SQL expression. Numeric columns only.
    pub stat_columns: &'static [(&'static str, &'static str)],
    pub map_row: fn(&rusqlite::Row<'_>) -> rusqlite::Result<CatalogRow>,
}

impl KindSpec {
    pub fn order_expr(&self, name: &str) -> Option<&'static str> {
        lookup(self.order_columns, name)
    }

    pub fn stat_expr(&self, name: &str) -> Option<&'static str> {
        lookup(self.stat_columns, name)
    }
}

fn lookup(table: &[(&str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(public, _)| *public == name)
        .map(|(_, expr)| *expr)
}

const TRACK_SPEC: KindSpec = KindSpec {
    kind: EntityKind::Track,
    stat_table: "tracks",
    select_sql: "SELECT name, artist_name, album_name, album_image_uri, release_year, \
                 explicit, duration_secs, label, track_uri, popularity, danceability, \
                 energy, loudness, speechiness, acousticness, instrumentalness, \
                 liveness, valence FROM tracks",
    group_by: None,
    order_columns: &[
        ("name", "name"),
        ("artist", "artist_name"),
        ("album", "album_name"),
        ("release_year", "release_year"),
        ("popularity", "popularity"),
        ("danceability", "danceability"),
        ("energy", "energy"),
        ("loudness", "loudness"),
        ("speechiness", "speechiness"),
        ("acousticness", "acousticness"),
        ("instrumentalness", "instrumentalness"),
        ("liveness", "liveness"),
        ("valence", "valence"),
    ],
    stat_columns: &[
        ("popularity", "popularity"),
        ("danceability", "danceability"),
        ("energy", "energy"),
        ("loudness", "loudness"),
        ("speechiness", "speechiness"),
        ("acousticness", "acousticness"),
        ("instrumentalness", "instrumentalness"),
        ("liveness", "liveness"),
        ("valence", "valence"),
    ],
    map_row: track_from_row,
};

// Albums borrow a representative image from any track on the album; albums
// with no track keep a NULL image (left outer join).
const ALBUM_SPEC: KindSpec = KindSpec {
    kind: EntityKind::Album,
    stat_table: "albums",
    select_sql: "SELECT DISTINCT albums.name, albums.artist_name, albums.release_year, \
                 albums.genres, albums.average_rating, tracks.album_image_uri \
                 FROM albums LEFT JOIN tracks ON albums.name = tracks.album_name",
    group_by: None,
    order_columns: &[
        ("name", "albums.name"),
        ("artist", "albums.artist_name"),
        ("release_year", "albums.release_year"),
        ("average_rating", "albums.average_rating"),
    ],
    stat_columns: &[
        ("average_rating", "albums.average_rating"),
        ("release_year", "albums.release_year"),
    ],
    map_row: album_from_row,
};

// Artists count their tracks through a grouping left outer join; artists
// with no track report zero.
const ARTIST_SPEC: KindSpec = KindSpec {
    kind: EntityKind::Artist,
    stat_table: "artists",
    select_sql: "SELECT artists.name, artists.facebook, artists.twitter, artists.website, \
                 artists.mtv, artists.genre, COUNT(tracks.name) AS num_tracks \
                 FROM artists LEFT JOIN tracks ON artists.name = tracks.artist_name",
    group_by: Some("artists.name"),
    order_columns: &[
        ("name", "artists.name"),
        ("genre", "artists.genre"),
        ("num_tracks", "num_tracks"),
    ],
    // The artist search carries no statistics; the empty allow-list makes
    // any artist stat request a validation error.
    stat_columns: &[],
    map_row: artist_from_row,
};

impl EntityKind {
    pub fn spec(&self) -> &'static KindSpec {
        match self {
            EntityKind::Track => &TRACK_SPEC,
            EntityKind::Album => &ALBUM_SPEC,
            EntityKind::Artist => &ARTIST_SPEC,
        }
    }
}
