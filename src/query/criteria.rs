//! Search criteria and the predicate compiler.
//!
//! Each present criterion compiles to exactly one predicate; predicates are
//! ANDed, and empty criteria compile to the tautology so an all-absent search
//! matches every row. Every user-supplied value travels as a bound parameter
//! — the clause text is assembled only from fixed column names, so filter
//! values can never change query structure.

use super::kind::EntityKind;
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// A compiled WHERE clause plus its bound parameters.
pub struct FilterExpr {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl FilterExpr {
    fn new() -> Self {
        FilterExpr {
            clauses: Vec::new(),
            params: Vec::new(),
        }
    }

    fn push<P: ToSql + 'static>(&mut self, clause: &str, param: P) {
        self.clauses.push(clause.to_string());
        self.params.push(Box::new(param));
    }

    /// The WHERE body: ANDed clauses, or `1` when no criteria are present.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            "1".to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }

    pub fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Build a LIKE pattern matching rows that contain `text` literally.
/// LIKE's own pattern characters in the text are escaped so they stay data.
fn contains_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        if c == '\\' || c == '%' || c == '_' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{}%", escaped)
}

fn push_contains(filter: &mut FilterExpr, column: &str, text: &str) {
    filter.push(
        &format!("{} LIKE ? ESCAPE '\\'", column),
        contains_pattern(text),
    );
}

/// Track search criteria. Absent fields impose no constraint; explicit
/// content is included only when `include_explicit` is affirmatively set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackCriteria {
    pub name_contains: Option<String>,
    pub artist_contains: Option<String>,
    pub released_after: Option<i64>,
    pub released_before: Option<i64>,
    pub include_explicit: bool,
}

/// Album search criteria.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumCriteria {
    pub title_contains: Option<String>,
    pub released_after: Option<i64>,
    pub released_before: Option<i64>,
}

/// Artist search criteria.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistCriteria {
    pub name_contains: Option<String>,
    pub genre_contains: Option<String>,
}

/// Criteria for one search; the variant selects the entity kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SearchCriteria {
    Track(TrackCriteria),
    Album(AlbumCriteria),
    Artist(ArtistCriteria),
}

impl SearchCriteria {
    pub fn kind(&self) -> EntityKind {
        match self {
            SearchCriteria::Track(_) => EntityKind::Track,
            SearchCriteria::Album(_) => EntityKind::Album,
            SearchCriteria::Artist(_) => EntityKind::Artist,
        }
    }

    /// Compile the criteria into a parameterized filter expression.
    pub fn compile(&self) -> FilterExpr {
        let mut filter = FilterExpr::new();
        match self {
            SearchCriteria::Track(c) => {
                if let Some(name) = &c.name_contains {
                    push_contains(&mut filter, "name", name);
                }
                if let Some(artist) = &c.artist_contains {
                    push_contains(&mut filter, "artist_name", artist);
                }
                if let Some(year) = c.released_after {
                    filter.push("release_year > ?", year);
                }
                if let Some(year) = c.released_before {
                    filter.push("release_year < ?", year);
                }
                if !c.include_explicit {
                    filter.push("explicit = ?", 0i64);
                }
            }
            SearchCriteria::Album(c) => {
                if let Some(title) = &c.title_contains {
                    push_contains(&mut filter, "albums.name", title);
                }
                if let Some(year) = c.released_after {
                    filter.push("albums.release_year > ?", year);
                }
                if let Some(year) = c.released_before {
                    filter.push("albums.release_year < ?", year);
                }
            }
            SearchCriteria::Artist(c) => {
                if let Some(name) = &c.name_contains {
                    push_contains(&mut filter, "artists.name", name);
                }
                if let Some(genre) = &c.genre_contains {
                    push_contains(&mut filter, "artists.genre", genre);
                }
            }
        }
        filter
    }
}
