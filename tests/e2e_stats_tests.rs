//! End-to-end statistic and chart tests against a real SQLite catalog.

mod common;

use base64::prelude::*;
use common::{insert_album, insert_artist, insert_track, TestCatalog, TrackFixture};
use melodb::{
    AlbumCriteria, ArtistCriteria, Deadline, SearchCriteria, SearchError, SearchRequest,
    StatRequest, Statistic, TrackCriteria, ValidationError,
};
use std::time::Duration;

fn seed_popularity(catalog: &TestCatalog, values: &[f64]) {
    for (i, value) in values.iter().enumerate() {
        let mut track = TrackFixture::named(&format!("Track {:02}", i));
        track.popularity = Some(*value);
        insert_track(&catalog.writer, &track);
    }
}

fn stat_request(statistic: Statistic, column: &str) -> SearchRequest {
    let mut request = SearchRequest::new(SearchCriteria::Track(TrackCriteria::default()));
    request.statistic = Some(StatRequest::new(statistic, column));
    request
}

// =============================================================================
// Median
// =============================================================================

#[test]
fn test_median_of_seven_known_values() {
    let catalog = TestCatalog::new();
    seed_popularity(&catalog, &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0]);

    let result = catalog
        .engine()
        .search(&stat_request(Statistic::Median, "popularity"))
        .unwrap();
    assert_eq!(result.stat_value, Some(40.0));
}

#[test]
fn test_median_small_counts_match_hand_sorted_reference() {
    // (values as inserted, expected median)
    let cases: &[(&[f64], f64)] = &[
        (&[7.0], 7.0),
        (&[9.0, 3.0], 6.0),
        (&[5.0, 1.0, 9.0], 5.0),
        (&[8.0, 2.0, 6.0, 4.0], 5.0),
    ];
    for (values, expected) in cases {
        let catalog = TestCatalog::new();
        seed_popularity(&catalog, values);
        let result = catalog
            .engine()
            .search(&stat_request(Statistic::Median, "popularity"))
            .unwrap();
        assert_eq!(result.stat_value, Some(*expected), "values {:?}", values);
    }
}

#[test]
fn test_median_runs_over_the_filtered_set_only() {
    let catalog = TestCatalog::new();
    for (artist, popularity) in [
        ("Alpha", 10.0),
        ("Alpha", 20.0),
        ("Alpha", 30.0),
        ("Other", 1000.0),
    ] {
        let mut track = TrackFixture::named(&format!("{} {}", artist, popularity));
        track.artist = artist.to_string();
        track.popularity = Some(popularity);
        insert_track(&catalog.writer, &track);
    }

    let mut request = SearchRequest::new(SearchCriteria::Track(TrackCriteria {
        artist_contains: Some("Alpha".to_string()),
        ..Default::default()
    }));
    request.statistic = Some(StatRequest::new(Statistic::Median, "popularity"));
    let result = catalog.engine().search(&request).unwrap();
    assert_eq!(result.matched_rows.len(), 3);
    assert_eq!(result.stat_value, Some(20.0));
}

// =============================================================================
// Standard Deviation
// =============================================================================

#[test]
fn test_stddev_is_population_not_sample() {
    let catalog = TestCatalog::new();
    let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    seed_popularity(&catalog, &values);

    let result = catalog
        .engine()
        .search(&stat_request(Statistic::StdDev, "popularity"))
        .unwrap();
    // mean = 5, sum of squared deviations = 32, n = 8 -> sqrt(4) = 2
    let stddev = result.stat_value.unwrap();
    assert!((stddev - 2.0).abs() < 1e-9);
}

#[test]
fn test_stddev_matches_two_pass_reference() {
    let catalog = TestCatalog::new();
    let values = [0.12, 0.55, 0.31, 0.87, 0.44, 0.91, 0.05];
    seed_popularity(&catalog, &values);

    let mean: f64 = values.iter().sum::<f64>() / values.len() as f64;
    let reference =
        (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64).sqrt();

    let result = catalog
        .engine()
        .search(&stat_request(Statistic::StdDev, "popularity"))
        .unwrap();
    let stddev = result.stat_value.unwrap();
    assert!((stddev - reference).abs() / reference < 1e-9);
}

#[test]
fn test_stddev_of_single_value_is_zero() {
    let catalog = TestCatalog::new();
    seed_popularity(&catalog, &[42.0]);

    let result = catalog
        .engine()
        .search(&stat_request(Statistic::StdDev, "popularity"))
        .unwrap();
    assert_eq!(result.stat_value, Some(0.0));
}

// =============================================================================
// Single-Pass Aggregates and the Empty Set
// =============================================================================

#[test]
fn test_min_max_sum_avg() {
    let catalog = TestCatalog::new();
    seed_popularity(&catalog, &[10.0, 20.0, 60.0]);

    let engine = catalog.engine();
    let cases = [
        (Statistic::Min, 10.0),
        (Statistic::Max, 60.0),
        (Statistic::Sum, 90.0),
        (Statistic::Avg, 30.0),
        (Statistic::Count, 3.0),
    ];
    for (statistic, expected) in cases {
        let result = engine
            .search(&stat_request(statistic, "popularity"))
            .unwrap();
        assert_eq!(result.stat_value, Some(expected), "{:?}", statistic);
    }
}

#[test]
fn test_aggregates_skip_missing_values() {
    let catalog = TestCatalog::new();
    seed_popularity(&catalog, &[10.0, 30.0]);
    insert_track(&catalog.writer, &TrackFixture::named("no popularity"));

    let engine = catalog.engine();
    let result = engine
        .search(&stat_request(Statistic::Avg, "popularity"))
        .unwrap();
    assert_eq!(result.stat_value, Some(20.0));
    // COUNT(column) counts present values only
    let result = engine
        .search(&stat_request(Statistic::Count, "popularity"))
        .unwrap();
    assert_eq!(result.stat_value, Some(2.0));
    // Median skips the missing value too
    let result = engine
        .search(&stat_request(Statistic::Median, "popularity"))
        .unwrap();
    assert_eq!(result.stat_value, Some(20.0));
}

#[test]
fn test_empty_set_yields_no_value_except_count() {
    let catalog = TestCatalog::new();
    let engine = catalog.engine();

    for statistic in [
        Statistic::Min,
        Statistic::Max,
        Statistic::Sum,
        Statistic::Avg,
        Statistic::StdDev,
        Statistic::Median,
    ] {
        let result = engine
            .search(&stat_request(statistic, "danceability"))
            .unwrap();
        assert_eq!(result.stat_value, None, "{:?}", statistic);
    }

    let result = engine
        .search(&stat_request(Statistic::Count, "danceability"))
        .unwrap();
    assert_eq!(result.stat_value, Some(0.0));
}

#[test]
fn test_avg_on_empty_filtered_set_end_to_end() {
    let catalog = TestCatalog::new();
    seed_popularity(&catalog, &[50.0]);

    let mut request = SearchRequest::new(SearchCriteria::Track(TrackCriteria {
        name_contains: Some("no such track".to_string()),
        ..Default::default()
    }));
    request.statistic = Some(StatRequest::new(Statistic::Avg, "danceability"));
    let result = catalog.engine().search(&request).unwrap();
    assert!(result.matched_rows.is_empty());
    assert!(result.page_rows.is_empty());
    assert_eq!(result.stat_value, None);
    assert_eq!(result.page.page, 1);
}

// =============================================================================
// Allow-List Validation
// =============================================================================

#[test]
fn test_stat_on_text_column_is_validation_error() {
    let catalog = TestCatalog::new();
    insert_track(&catalog.writer, &TrackFixture::named("Track"));

    let err = catalog
        .engine()
        .search(&stat_request(Statistic::Avg, "label"))
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::Validation(ValidationError::StatColumnNotAllowed { .. })
    ));
}

#[test]
fn test_stat_on_sql_fragment_is_validation_error() {
    let catalog = TestCatalog::new();

    let err = catalog
        .engine()
        .search(&stat_request(
            Statistic::Median,
            "popularity) FROM tracks; --",
        ))
        .unwrap_err();
    assert!(matches!(err, SearchError::Validation(_)));
}

#[test]
fn test_artist_statistics_are_rejected() {
    let catalog = TestCatalog::new();
    insert_artist(&catalog.writer, "Nina Simone", Some("jazz"));

    let mut request = SearchRequest::new(SearchCriteria::Artist(ArtistCriteria::default()));
    request.statistic = Some(StatRequest::new(Statistic::Count, "num_tracks"));
    let err = catalog.engine().search(&request).unwrap_err();
    assert!(matches!(
        err,
        SearchError::Validation(ValidationError::StatColumnNotAllowed { .. })
    ));
}

#[test]
fn test_album_average_rating_statistic() {
    let catalog = TestCatalog::new();
    insert_album(&catalog.writer, "First", "A", Some(1990), None, Some(3.0));
    insert_album(&catalog.writer, "Second", "B", Some(1995), None, Some(5.0));
    insert_album(&catalog.writer, "Unrated", "C", Some(2000), None, None);

    let mut request = SearchRequest::new(SearchCriteria::Album(AlbumCriteria::default()));
    request.statistic = Some(StatRequest::new(Statistic::Avg, "average_rating"));
    let result = catalog.engine().search(&request).unwrap();
    assert_eq!(result.matched_rows.len(), 3);
    assert_eq!(result.stat_value, Some(4.0));
}

#[test]
fn test_album_statistic_respects_year_filter() {
    let catalog = TestCatalog::new();
    insert_album(&catalog.writer, "Old", "A", Some(1980), None, Some(2.0));
    insert_album(&catalog.writer, "New", "A", Some(2000), None, Some(4.0));

    let mut request = SearchRequest::new(SearchCriteria::Album(AlbumCriteria {
        released_after: Some(1990),
        ..Default::default()
    }));
    request.statistic = Some(StatRequest::new(Statistic::Max, "average_rating"));
    let result = catalog.engine().search(&request).unwrap();
    assert_eq!(result.matched_rows.len(), 1);
    assert_eq!(result.stat_value, Some(4.0));
}

// =============================================================================
// Charts
// =============================================================================

#[test]
fn test_track_chart_covers_the_full_matched_set() {
    let catalog = TestCatalog::new();
    for i in 0..35 {
        let mut track = TrackFixture::named(&format!("Track {:02}", i));
        track.danceability = Some(if i < 20 { 0.2 } else { 0.8 });
        insert_track(&catalog.writer, &track);
    }

    let mut request = SearchRequest::new(SearchCriteria::Track(TrackCriteria::default()));
    request.want_chart = true;
    let result = catalog.engine_with_charts().search(&request).unwrap();

    // 35 matches paginate, but the chart summarizes all of them
    assert_eq!(result.page_rows.len(), 30);
    let chart = result.chart.unwrap();
    let encoded = chart
        .as_str()
        .trim_start_matches("data:application/json;base64,");
    let dataset: serde_json::Value =
        serde_json::from_slice(&BASE64_STANDARD.decode(encoded).unwrap()).unwrap();
    assert_eq!(dataset["kind"], "feature_means");
    let bars = dataset["bars"].as_array().unwrap();
    let danceability = bars
        .iter()
        .find(|bar| bar["feature"] == "danceability")
        .unwrap();
    // mean of 20 * 0.2 and 15 * 0.8 over 35 tracks
    let expected = (20.0 * 0.2 + 15.0 * 0.8) / 35.0;
    assert!((danceability["mean"].as_f64().unwrap() - expected).abs() < 1e-9);
}

#[test]
fn test_artist_chart_is_a_genre_breakdown() {
    let catalog = TestCatalog::new();
    insert_artist(&catalog.writer, "A", Some("jazz"));
    insert_artist(&catalog.writer, "B", Some("jazz"));
    insert_artist(&catalog.writer, "C", Some("rock"));

    let mut request = SearchRequest::new(SearchCriteria::Artist(ArtistCriteria::default()));
    request.want_chart = true;
    let result = catalog.engine_with_charts().search(&request).unwrap();

    let chart = result.chart.unwrap();
    let encoded = chart
        .as_str()
        .trim_start_matches("data:application/json;base64,");
    let dataset: serde_json::Value =
        serde_json::from_slice(&BASE64_STANDARD.decode(encoded).unwrap()).unwrap();
    assert_eq!(dataset["kind"], "genre_breakdown");
    let slices = dataset["slices"].as_array().unwrap();
    let jazz = slices.iter().find(|s| s["label"] == "jazz").unwrap();
    assert!((jazz["share"].as_f64().unwrap() - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_album_chart_request_is_validation_error() {
    let catalog = TestCatalog::new();

    let mut request = SearchRequest::new(SearchCriteria::Album(AlbumCriteria::default()));
    request.want_chart = true;
    let err = catalog.engine_with_charts().search(&request).unwrap_err();
    assert!(matches!(
        err,
        SearchError::Validation(ValidationError::ChartNotAvailable { .. })
    ));
}

#[test]
fn test_no_chart_requested_means_no_chart_ref() {
    let catalog = TestCatalog::new();
    insert_track(&catalog.writer, &TrackFixture::named("Track"));

    let result = catalog
        .engine_with_charts()
        .search(&SearchRequest::new(SearchCriteria::Track(
            TrackCriteria::default(),
        )))
        .unwrap();
    assert!(result.chart.is_none());
}

// =============================================================================
// Deadlines
// =============================================================================

#[test]
fn test_expired_deadline_aborts_before_querying() {
    let catalog = TestCatalog::new();
    insert_track(&catalog.writer, &TrackFixture::named("Track"));

    let mut request = SearchRequest::new(SearchCriteria::Track(TrackCriteria::default()));
    request.deadline = Some(Deadline::after(Duration::from_secs(0)));
    let err = catalog.engine().search(&request).unwrap_err();
    assert!(matches!(err, SearchError::DeadlineExceeded));
}

#[test]
fn test_generous_deadline_does_not_interfere() {
    let catalog = TestCatalog::new();
    seed_popularity(&catalog, &[10.0, 20.0, 30.0]);

    let mut request = stat_request(Statistic::Median, "popularity");
    request.deadline = Some(Deadline::after(Duration::from_secs(60)));
    let result = catalog.engine().search(&request).unwrap();
    assert_eq!(result.stat_value, Some(20.0));
    assert_eq!(result.matched_rows.len(), 3);
}
