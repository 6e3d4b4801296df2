//! The search orchestrator.
//!
//! One generic path serves all three entity kinds, driven by the kind
//! descriptor. A search runs strictly in sequence on one scoped read
//! connection: compile the filter, fetch the full matched set (the statistic
//! and the chart both operate on the whole filtered population), resolve the
//! page window, fetch the page rows with the identical filter and order,
//! compute the statistic if requested, then hand the matched set to the chart
//! collaborator. Validation happens up front, before any query executes, and
//! any failure along the way aborts the whole search.

use super::criteria::{FilterExpr, SearchCriteria};
use super::deadline::{check_deadline, Deadline};
use super::error::{collaborator_failure, storage_failure, SearchError, ValidationError};
use super::kind::KindSpec;
use super::page::{paginate, PageWindow};
use super::stats::{compute_statistic, StatRequest};
use crate::catalog::{CatalogRow, SqliteCatalog};
use crate::chart::{ChartKind, ChartRef, ChartRenderer};
use rusqlite::{Connection, ToSql};
use serde::Serialize;
use std::sync::Arc;

/// One search invocation's inputs.
#[derive(Clone, Debug)]
pub struct SearchRequest {
    pub criteria: SearchCriteria,
    /// Order column (descending) from the kind's allow-list; natural row
    /// order when absent.
    pub order_by: Option<String>,
    pub statistic: Option<StatRequest>,
    pub want_chart: bool,
    /// Requested page; ignored unless the matched set spans multiple pages.
    pub page: Option<u32>,
    pub deadline: Option<Deadline>,
}

impl SearchRequest {
    pub fn new(criteria: SearchCriteria) -> Self {
        SearchRequest {
            criteria,
            order_by: None,
            statistic: None,
            want_chart: false,
            page: None,
            deadline: None,
        }
    }
}

/// The assembled result of one search. Constructed fresh per invocation and
/// never mutated afterwards.
#[derive(Clone, Debug, Serialize)]
pub struct SearchResult {
    pub matched_rows: Vec<CatalogRow>,
    pub page_rows: Vec<CatalogRow>,
    pub stat_value: Option<f64>,
    pub page: PageWindow,
    pub chart: Option<ChartRef>,
}

/// The search engine: a catalog store plus the chart collaborator.
pub struct CatalogSearch {
    store: Arc<SqliteCatalog>,
    chart_renderer: Arc<dyn ChartRenderer>,
}

impl CatalogSearch {
    pub fn new(store: Arc<SqliteCatalog>, chart_renderer: Arc<dyn ChartRenderer>) -> Self {
        CatalogSearch {
            store,
            chart_renderer,
        }
    }

    pub fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        let kind = request.criteria.kind();
        let spec = kind.spec();

        // Validate the whole request before touching the database.
        let order_expr = match &request.order_by {
            Some(column) => Some(spec.order_expr(column).ok_or_else(|| {
                ValidationError::OrderColumnNotAllowed {
                    kind,
                    column: column.clone(),
                }
            })?),
            None => None,
        };
        if let Some(stat) = &request.statistic {
            spec.stat_expr(&stat.column)
                .ok_or_else(|| ValidationError::StatColumnNotAllowed {
                    kind,
                    column: stat.column.clone(),
                })?;
        }
        let chart_kind = if request.want_chart {
            Some(
                ChartKind::for_entity(kind)
                    .ok_or(ValidationError::ChartNotAvailable { kind })?,
            )
        } else {
            None
        };

        let filter = request.criteria.compile();
        let deadline = request.deadline;

        let (matched_rows, page_rows, stat_value, page) = {
            // One pooled connection for the invocation; the guard releases it
            // on success and on every error path alike.
            let conn = self.store.read_conn();
            let conn = conn.lock().unwrap();

            check_deadline(deadline)?;
            let matched_rows = fetch_rows(&conn, spec, &filter, order_expr, None)?;

            let page = paginate(matched_rows.len(), request.page);
            check_deadline(deadline)?;
            let page_rows = fetch_rows(&conn, spec, &filter, order_expr, Some(page))?;

            let stat_value = match &request.statistic {
                Some(stat) => compute_statistic(&conn, spec, stat, &filter, deadline)?,
                None => None,
            };
            (matched_rows, page_rows, stat_value, page)
        };

        let chart = match chart_kind {
            Some(chart_kind) => Some(
                self.chart_renderer
                    .render(chart_kind, &matched_rows)
                    .map_err(|e| collaborator_failure("chart rendering", e))?,
            ),
            None => None,
        };

        Ok(SearchResult {
            matched_rows,
            page_rows,
            stat_value,
            page,
            chart,
        })
    }
}

/// Run the matched-row query, optionally limited to one page window. The
/// SELECT body and order expression come from the kind descriptor; only the
/// filter parameters and the window bounds are bound at run time.
fn fetch_rows(
    conn: &Connection,
    spec: &KindSpec,
    filter: &FilterExpr,
    order_expr: Option<&str>,
    window: Option<PageWindow>,
) -> Result<Vec<CatalogRow>, SearchError> {
    let mut sql = format!("{} WHERE {}", spec.select_sql, filter.where_sql());
    if let Some(group_by) = spec.group_by {
        sql.push_str(" GROUP BY ");
        sql.push_str(group_by);
    }
    if let Some(order_expr) = order_expr {
        sql.push_str(" ORDER BY ");
        sql.push_str(order_expr);
        sql.push_str(" DESC");
    }

    let mut params: Vec<&dyn ToSql> = filter.param_refs();
    let limit: i64;
    let offset: i64;
    if let Some(window) = window {
        sql.push_str(" LIMIT ? OFFSET ?");
        limit = window.page_size as i64;
        offset = window.offset as i64;
        params.push(&limit);
        params.push(&offset);
    }

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| storage_failure("search query prepare", e))?;
    let rows = stmt
        .query_map(params.as_slice(), spec.map_row)
        .map_err(|e| storage_failure("search query", e))?
        .collect::<rusqlite::Result<Vec<CatalogRow>>>()
        .map_err(|e| storage_failure("search row decoding", e))?;
    Ok(rows)
}
