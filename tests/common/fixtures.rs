//! Fixture rows for catalog tests, inserted with plain parameterized SQL.

use rusqlite::{params, Connection};

/// A track row with test-friendly defaults; override what the test cares
/// about.
pub struct TrackFixture {
    pub name: String,
    pub artist: String,
    pub album: String,
    pub image: Option<String>,
    pub year: Option<i64>,
    pub explicit: bool,
    pub duration_secs: Option<i64>,
    pub label: Option<String>,
    pub track_uri: Option<String>,
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

impl Default for TrackFixture {
    fn default() -> Self {
        TrackFixture {
            name: "Some Track".to_string(),
            artist: "Some Artist".to_string(),
            album: "Some Album".to_string(),
            image: None,
            year: None,
            explicit: false,
            duration_secs: None,
            label: None,
            track_uri: None,
            popularity: None,
            danceability: None,
            energy: None,
            loudness: None,
            speechiness: None,
            acousticness: None,
            instrumentalness: None,
            liveness: None,
            valence: None,
        }
    }
}

impl TrackFixture {
    pub fn named(name: &str) -> Self {
        TrackFixture {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

pub fn insert_track(conn: &Connection, track: &TrackFixture) {
    conn.execute(
        "INSERT INTO tracks (name, artist_name, album_name, album_image_uri, release_year, \
         explicit, duration_secs, label, track_uri, popularity, danceability, energy, \
         loudness, speechiness, acousticness, instrumentalness, liveness, valence) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            track.name,
            track.artist,
            track.album,
            track.image,
            track.year,
            track.explicit as i64,
            track.duration_secs,
            track.label,
            track.track_uri,
            track.popularity,
            track.danceability,
            track.energy,
            track.loudness,
            track.speechiness,
            track.acousticness,
            track.instrumentalness,
            track.liveness,
            track.valence,
        ],
    )
    .unwrap();
}

pub fn insert_album(
    conn: &Connection,
    name: &str,
    artist: &str,
    year: Option<i64>,
    genres: Option<&str>,
    average_rating: Option<f64>,
) {
    conn.execute(
        "INSERT INTO albums (name, artist_name, release_year, genres, average_rating) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![name, artist, year, genres, average_rating],
    )
    .unwrap();
}

pub fn insert_artist(conn: &Connection, name: &str, genre: Option<&str>) {
    conn.execute(
        "INSERT INTO artists (name, genre) VALUES (?1, ?2)",
        params![name, genre],
    )
    .unwrap();
}
