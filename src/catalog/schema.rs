//! SQLite schema for the music catalog database.
//!
//! A single current schema version: an empty database gets the tables created
//! and its `user_version` stamped; an existing database is validated
//! column-by-column against the declarations here. The engine never migrates
//! a catalog in place.

use anyhow::{bail, Result};
use rusqlite::Connection;

/// Stamped into `PRAGMA user_version` so unrelated SQLite files are rejected.
pub const SCHEMA_VERSION: i64 = 3001;

pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub non_null: bool,
}

pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub indices: &'static [(&'static str, &'static str)],
}

const fn col(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        non_null: false,
    }
}

const fn col_non_null(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        non_null: true,
    }
}

const TRACKS_TABLE: TableDef = TableDef {
    name: "tracks",
    columns: &[
        col_non_null("name", "TEXT"),
        col_non_null("artist_name", "TEXT"),
        col_non_null("album_name", "TEXT"),
        col("album_image_uri", "TEXT"),
        col("release_year", "INTEGER"),
        col_non_null("explicit", "INTEGER"),
        col("duration_secs", "INTEGER"),
        col("label", "TEXT"),
        col("track_uri", "TEXT"),
        col("popularity", "REAL"),
        col("danceability", "REAL"),
        col("energy", "REAL"),
        col("loudness", "REAL"),
        col("speechiness", "REAL"),
        col("acousticness", "REAL"),
        col("instrumentalness", "REAL"),
        col("liveness", "REAL"),
        col("valence", "REAL"),
    ],
    indices: &[
        ("idx_tracks_artist_name", "artist_name"),
        ("idx_tracks_album_name", "album_name"),
        ("idx_tracks_release_year", "release_year"),
    ],
};

const ALBUMS_TABLE: TableDef = TableDef {
    name: "albums",
    columns: &[
        col_non_null("name", "TEXT"),
        col_non_null("artist_name", "TEXT"),
        col("release_year", "INTEGER"),
        col("genres", "TEXT"),
        col("average_rating", "REAL"),
    ],
    indices: &[("idx_albums_name", "name")],
};

const ARTISTS_TABLE: TableDef = TableDef {
    name: "artists",
    columns: &[
        col_non_null("name", "TEXT"),
        col("facebook", "TEXT"),
        col("twitter", "TEXT"),
        col("website", "TEXT"),
        col("mtv", "TEXT"),
        col("genre", "TEXT"),
    ],
    indices: &[("idx_artists_name", "name")],
};

pub const CATALOG_TABLES: &[TableDef] = &[TRACKS_TABLE, ALBUMS_TABLE, ARTISTS_TABLE];

impl TableDef {
    fn create(&self, conn: &Connection) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(column.name);
            create_sql.push(' ');
            create_sql.push_str(column.sql_type);
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, [])?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!("CREATE INDEX {} ON {}({});", index_name, self.name, column_name),
                [],
            )?;
        }
        Ok(())
    }

    fn validate(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual: Vec<(String, String, bool)> = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i32>(3)? == 1,
                ))
            })?
            .collect::<rusqlite::Result<_>>()?;

        if actual.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}",
                self.name,
                actual.len(),
                self.columns.len()
            );
        }
        for ((name, sql_type, non_null), expected) in actual.iter().zip(self.columns.iter()) {
            if name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    name
                );
            }
            if sql_type != expected.sql_type {
                bail!(
                    "Table {} column {} type mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    sql_type
                );
            }
            if *non_null != expected.non_null {
                bail!(
                    "Table {} column {} non-null mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.non_null,
                    non_null
                );
            }
        }
        Ok(())
    }
}

/// Create the full catalog schema on an empty database.
pub fn create_schema(conn: &Connection) -> Result<()> {
    for table in CATALOG_TABLES {
        table.create(conn)?;
    }
    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
    Ok(())
}

/// Create the schema if the database is brand new, otherwise validate that
/// the file carries the catalog schema at the expected version.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;
    if table_count == 0 {
        return create_schema(conn);
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if db_version != SCHEMA_VERSION {
        bail!(
            "Catalog database is at schema version {}, expected {}",
            db_version,
            SCHEMA_VERSION
        );
    }
    for table in CATALOG_TABLES {
        table.validate(conn)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_validate_roundtrip() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        for table in CATALOG_TABLES {
            table.validate(&conn).unwrap();
        }
    }

    #[test]
    fn test_ensure_schema_creates_on_empty_database() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        // A second run validates instead of re-creating
        ensure_schema(&conn).unwrap();
    }

    #[test]
    fn test_ensure_schema_rejects_foreign_database() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE something_else (id INTEGER PRIMARY KEY)", [])
            .unwrap();
        let err = ensure_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("schema version"));
    }

    #[test]
    fn test_validate_detects_missing_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE albums (name TEXT NOT NULL)", [])
            .unwrap();
        let err = ALBUMS_TABLE.validate(&conn).unwrap_err();
        assert!(err.to_string().contains("columns"));
    }

    #[test]
    fn test_validate_detects_type_mismatch() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE albums (
                name TEXT NOT NULL,
                artist_name TEXT NOT NULL,
                release_year TEXT,
                genres TEXT,
                average_rating REAL
            )",
            [],
        )
        .unwrap();
        let err = ALBUMS_TABLE.validate(&conn).unwrap_err();
        assert!(err.to_string().contains("type mismatch"));
    }
}
