//! Entity rows returned by catalog searches.
//!
//! Tracks are denormalized: they reference their album and artist by name
//! rather than by key. The album and artist rows carry one join-derived field
//! each (representative image, track count) filled in by the search queries.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// The nine numeric audio features of a track, in catalog column order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub popularity: Option<f64>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub loudness: Option<f64>,
    pub speechiness: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub valence: Option<f64>,
}

impl AudioFeatures {
    pub const NAMES: [&'static str; 9] = [
        "popularity",
        "danceability",
        "energy",
        "loudness",
        "speechiness",
        "acousticness",
        "instrumentalness",
        "liveness",
        "valence",
    ];

    /// Look up a feature value by its column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "popularity" => self.popularity,
            "danceability" => self.danceability,
            "energy" => self.energy,
            "loudness" => self.loudness,
            "speechiness" => self.speechiness,
            "acousticness" => self.acousticness,
            "instrumentalness" => self.instrumentalness,
            "liveness" => self.liveness,
            "valence" => self.valence,
            _ => None,
        }
    }
}

/// Track entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub artist_name: String,
    pub album_name: String,
    pub album_image_uri: Option<String>,
    pub release_year: Option<i64>,
    pub explicit: bool,
    pub duration_secs: Option<i64>,
    pub label: Option<String>,
    pub track_uri: Option<String>,
    pub features: AudioFeatures,
}

/// Album entity; `image_uri` comes from the track join and is NULL for
/// albums with no matching track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    pub artist_name: String,
    pub release_year: Option<i64>,
    pub genres: Option<String>,
    pub average_rating: Option<f64>,
    pub image_uri: Option<String>,
}

/// Artist entity; `num_tracks` comes from the track grouping join and is
/// zero for artists with no matching track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
    pub mtv: Option<String>,
    pub genre: Option<String>,
    pub num_tracks: i64,
}

/// A single matched row of whichever entity kind was searched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CatalogRow {
    Track(Track),
    Album(Album),
    Artist(Artist),
}

impl CatalogRow {
    pub fn as_track(&self) -> Option<&Track> {
        match self {
            CatalogRow::Track(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_album(&self) -> Option<&Album> {
        match self {
            CatalogRow::Album(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_artist(&self) -> Option<&Artist> {
        match self {
            CatalogRow::Artist(a) => Some(a),
            _ => None,
        }
    }
}

/// Parse a Track from a row in track SELECT column order
/// (name, artist_name, album_name, album_image_uri, release_year, explicit,
/// duration_secs, label, track_uri, then the nine features).
pub(crate) fn track_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogRow> {
    Ok(CatalogRow::Track(Track {
        name: row.get(0)?,
        artist_name: row.get(1)?,
        album_name: row.get(2)?,
        album_image_uri: row.get(3)?,
        release_year: row.get(4)?,
        explicit: row.get::<_, i64>(5)? != 0,
        duration_secs: row.get(6)?,
        label: row.get(7)?,
        track_uri: row.get(8)?,
        features: AudioFeatures {
            popularity: row.get(9)?,
            danceability: row.get(10)?,
            energy: row.get(11)?,
            loudness: row.get(12)?,
            speechiness: row.get(13)?,
            acousticness: row.get(14)?,
            instrumentalness: row.get(15)?,
            liveness: row.get(16)?,
            valence: row.get(17)?,
        },
    }))
}

/// Parse an Album from a row (name, artist_name, release_year, genres,
/// average_rating, image_uri).
pub(crate) fn album_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogRow> {
    Ok(CatalogRow::Album(Album {
        name: row.get(0)?,
        artist_name: row.get(1)?,
        release_year: row.get(2)?,
        genres: row.get(3)?,
        average_rating: row.get(4)?,
        image_uri: row.get(5)?,
    }))
}

/// Parse an Artist from a row (name, facebook, twitter, website, mtv, genre,
/// num_tracks).
pub(crate) fn artist_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogRow> {
    Ok(CatalogRow::Artist(Artist {
        name: row.get(0)?,
        facebook: row.get(1)?,
        twitter: row.get(2)?,
        website: row.get(3)?,
        mtv: row.get(4)?,
        genre: row.get(5)?,
        num_tracks: row.get(6)?,
    }))
}
