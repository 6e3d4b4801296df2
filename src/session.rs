//! Per-caller search session state.
//!
//! The engine itself is stateless; whoever drives it owns a `SearchSession`
//! and records each successful search into it. The session keeps, per entity
//! kind, the last criteria bundle and the current page, which is exactly what
//! a pagination-only re-execution needs — the cached input criteria, never
//! the result. Entries are written only on successful completion, and the
//! session has no visibility across callers.

use crate::query::{EntityKind, SearchCriteria, SearchRequest, SearchResult, StatRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The re-executable part of a search request: everything except the page
/// and the deadline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub criteria: SearchCriteria,
    pub order_by: Option<String>,
    pub statistic: Option<StatRequest>,
    pub want_chart: bool,
}

impl SavedSearch {
    pub fn from_request(request: &SearchRequest) -> Self {
        SavedSearch {
            criteria: request.criteria.clone(),
            order_by: request.order_by.clone(),
            statistic: request.statistic.clone(),
            want_chart: request.want_chart,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SessionEntry {
    search: SavedSearch,
    current_page: u32,
}

/// One caller's saved searches and current pages, keyed by entity kind.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchSession {
    entries: HashMap<EntityKind, SessionEntry>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully completed search and its resolved page.
    pub fn record(&mut self, request: &SearchRequest, result: &SearchResult) {
        self.entries.insert(
            request.criteria.kind(),
            SessionEntry {
                search: SavedSearch::from_request(request),
                current_page: result.page.page,
            },
        );
    }

    pub fn saved_search(&self, kind: EntityKind) -> Option<&SavedSearch> {
        self.entries.get(&kind).map(|entry| &entry.search)
    }

    pub fn current_page(&self, kind: EntityKind) -> Option<u32> {
        self.entries.get(&kind).map(|entry| entry.current_page)
    }

    /// Build a request that re-executes the saved search on another page.
    pub fn request_for_page(&self, kind: EntityKind, page: u32) -> Option<SearchRequest> {
        self.entries.get(&kind).map(|entry| SearchRequest {
            criteria: entry.search.criteria.clone(),
            order_by: entry.search.order_by.clone(),
            statistic: entry.search.statistic.clone(),
            want_chart: entry.search.want_chart,
            page: Some(page),
            deadline: None,
        })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
