//! Statistics over the filtered set.
//!
//! Every statistic runs against the same filter expression as the matched-row
//! query, on the kind's bare stat table. MIN/MAX/SUM/AVG/COUNT are single
//! SQL aggregates; STDDEV is the population formula in two passes with the
//! mean bound as a parameter; MEDIAN pulls an ascending projection and takes
//! the middle in memory. An empty filtered set yields no value for every
//! statistic except COUNT, which yields 0.

use super::criteria::FilterExpr;
use super::deadline::{check_deadline, Deadline};
use super::error::{storage_failure, SearchError, ValidationError};
use super::kind::KindSpec;
use rusqlite::{Connection, ToSql};
use serde::{Deserialize, Serialize};

/// The closed set of supported statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Min,
    Max,
    Sum,
    Avg,
    Count,
    #[value(name = "stddev")]
    StdDev,
    Median,
}

impl Statistic {
    /// SQL aggregate function name, for the single-pass statistics.
    fn sql_fn(&self) -> Option<&'static str> {
        match self {
            Statistic::Min => Some("MIN"),
            Statistic::Max => Some("MAX"),
            Statistic::Sum => Some("SUM"),
            Statistic::Avg => Some("AVG"),
            Statistic::Count => Some("COUNT"),
            Statistic::StdDev | Statistic::Median => None,
        }
    }
}

/// A statistic paired with the numeric column it runs over. The two always
/// travel together; a request carrying only one of them resolves to no
/// request at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatRequest {
    pub statistic: Statistic,
    pub column: String,
}

impl StatRequest {
    pub fn new<S: Into<String>>(statistic: Statistic, column: S) -> Self {
        StatRequest {
            statistic,
            column: column.into(),
        }
    }

    /// Pair up the raw request fields: both present makes a request, anything
    /// less means no statistic was requested.
    pub fn from_parts(statistic: Option<Statistic>, column: Option<String>) -> Option<Self> {
        match (statistic, column) {
            (Some(statistic), Some(column)) => Some(StatRequest { statistic, column }),
            _ => None,
        }
    }
}

/// Compute one statistic over the filtered set. The column must already be
/// in the kind's statistic allow-list (the engine validates before any query
/// runs; the lookup here re-resolves the SQL expression).
pub(crate) fn compute_statistic(
    conn: &Connection,
    spec: &KindSpec,
    request: &StatRequest,
    filter: &FilterExpr,
    deadline: Option<Deadline>,
) -> Result<Option<f64>, SearchError> {
    let column = spec
        .stat_expr(&request.column)
        .ok_or_else(|| ValidationError::StatColumnNotAllowed {
            kind: spec.kind,
            column: request.column.clone(),
        })?;
    let where_sql = filter.where_sql();

    check_deadline(deadline)?;
    match request.statistic {
        Statistic::Count => {
            let sql = format!(
                "SELECT COUNT({}) FROM {} WHERE {}",
                column, spec.stat_table, where_sql
            );
            let count: i64 = conn
                .query_row(&sql, filter.param_refs().as_slice(), |r| r.get(0))
                .map_err(|e| storage_failure("count statistic query", e))?;
            Ok(Some(count as f64))
        }
        Statistic::Min | Statistic::Max | Statistic::Sum | Statistic::Avg => {
            let sql_fn = request.statistic.sql_fn().unwrap_or("AVG");
            let sql = format!(
                "SELECT {}({}) FROM {} WHERE {}",
                sql_fn, column, spec.stat_table, where_sql
            );
            conn.query_row(&sql, filter.param_refs().as_slice(), |r| {
                r.get::<_, Option<f64>>(0)
            })
            .map_err(|e| storage_failure("aggregate statistic query", e))
        }
        Statistic::StdDev => population_stddev(conn, spec, column, filter, deadline),
        Statistic::Median => {
            let values = ordered_projection(conn, spec, column, filter)?;
            Ok(median_of(&values))
        }
    }
}

/// Population standard deviation: mean first, then
/// `sqrt(sum((x - mean)^2) / n)` with divisor n, not n-1.
fn population_stddev(
    conn: &Connection,
    spec: &KindSpec,
    column: &str,
    filter: &FilterExpr,
    deadline: Option<Deadline>,
) -> Result<Option<f64>, SearchError> {
    let where_sql = filter.where_sql();
    let sql = format!(
        "SELECT AVG({}), COUNT({}) FROM {} WHERE {}",
        column, column, spec.stat_table, where_sql
    );
    let (mean, count): (Option<f64>, i64) = conn
        .query_row(&sql, filter.param_refs().as_slice(), |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .map_err(|e| storage_failure("stddev mean query", e))?;

    let mean = match (mean, count) {
        (Some(mean), n) if n > 0 => mean,
        _ => return Ok(None),
    };

    check_deadline(deadline)?;
    let sql = format!(
        "SELECT SUM(({col} - ?) * ({col} - ?)) FROM {} WHERE {}",
        spec.stat_table,
        where_sql,
        col = column
    );
    let mut params: Vec<&dyn ToSql> = vec![&mean, &mean];
    params.extend(filter.param_refs());
    let squared_sum: Option<f64> = conn
        .query_row(&sql, params.as_slice(), |r| r.get(0))
        .map_err(|e| storage_failure("stddev sum query", e))?;

    Ok(squared_sum.map(|sum| (sum / count as f64).sqrt()))
}

/// Pull the column ascending for the in-memory median. NULLs sort first in
/// SQLite, so dropping them keeps the remainder ordered.
fn ordered_projection(
    conn: &Connection,
    spec: &KindSpec,
    column: &str,
    filter: &FilterExpr,
) -> Result<Vec<f64>, SearchError> {
    let sql = format!(
        "SELECT {col} FROM {} WHERE {} ORDER BY {col} ASC",
        spec.stat_table,
        filter.where_sql(),
        col = column
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| storage_failure("median projection query", e))?;
    let values = stmt
        .query_map(filter.param_refs().as_slice(), |r| {
            r.get::<_, Option<f64>>(0)
        })
        .map_err(|e| storage_failure("median projection query", e))?
        .collect::<rusqlite::Result<Vec<Option<f64>>>>()
        .map_err(|e| storage_failure("median projection query", e))?;
    Ok(values.into_iter().flatten().collect())
}

/// Median of an ascending-sorted slice: the middle value for odd counts, the
/// mean of the two middle values for even counts.
fn median_of(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_requires_both_fields() {
        assert_eq!(StatRequest::from_parts(None, None), None);
        assert_eq!(StatRequest::from_parts(Some(Statistic::Avg), None), None);
        assert_eq!(
            StatRequest::from_parts(None, Some("danceability".to_string())),
            None
        );
        assert_eq!(
            StatRequest::from_parts(Some(Statistic::Avg), Some("danceability".to_string())),
            Some(StatRequest::new(Statistic::Avg, "danceability"))
        );
    }

    #[test]
    fn test_median_of_empty_is_none() {
        assert_eq!(median_of(&[]), None);
    }

    #[test]
    fn test_median_of_odd_counts() {
        assert_eq!(median_of(&[5.0]), Some(5.0));
        assert_eq!(median_of(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(
            median_of(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0]),
            Some(40.0)
        );
    }

    #[test]
    fn test_median_of_even_counts() {
        assert_eq!(median_of(&[1.0, 3.0]), Some(2.0));
        assert_eq!(median_of(&[1.0, 2.0, 3.0, 8.0]), Some(2.5));
    }

    #[test]
    fn test_single_pass_statistics_have_sql_functions() {
        for stat in [
            Statistic::Min,
            Statistic::Max,
            Statistic::Sum,
            Statistic::Avg,
            Statistic::Count,
        ] {
            assert!(stat.sql_fn().is_some());
        }
        assert_eq!(Statistic::StdDev.sql_fn(), None);
        assert_eq!(Statistic::Median.sql_fn(), None);
    }
}
