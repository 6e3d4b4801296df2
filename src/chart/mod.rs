//! Chart data contract and the renderer collaborator.
//!
//! The engine summarizes the full matched set into a chart dataset — genre
//! shares for artists, per-feature means for tracks — and hands it to a
//! `ChartRenderer`, which answers with an opaque reference. What the
//! reference points at (an image, a data URI, nothing) is the renderer's
//! business; the engine never looks inside.

use crate::catalog::{AudioFeatures, CatalogRow};
use crate::query::EntityKind;
use anyhow::Result;
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Genres below this share of the matched set fold into the "Other" bucket.
const OTHER_BUCKET_THRESHOLD: f64 = 0.02;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    /// Share of each genre across the matched artists.
    GenreBreakdown,
    /// Mean of each numeric audio feature across the matched tracks.
    FeatureMeans,
}

impl ChartKind {
    /// The chart available for an entity kind; albums have none.
    pub fn for_entity(kind: EntityKind) -> Option<ChartKind> {
        match kind {
            EntityKind::Track => Some(ChartKind::FeatureMeans),
            EntityKind::Artist => Some(ChartKind::GenreBreakdown),
            EntityKind::Album => None,
        }
    }
}

/// Opaque renderable reference handed back by a renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRef(String);

impl ChartRef {
    pub fn new<S: Into<String>>(uri: S) -> Self {
        ChartRef(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Renders a chart over the full matched set of one search.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, kind: ChartKind, rows: &[CatalogRow]) -> Result<ChartRef>;
}

/// A no-op renderer for callers that don't display charts.
pub struct NullChartRenderer;

impl ChartRenderer for NullChartRenderer {
    fn render(&self, _kind: ChartKind, _rows: &[CatalogRow]) -> Result<ChartRef> {
        Ok(ChartRef::new(""))
    }
}

/// Renders the dataset itself as a `data:application/json;base64,…` URI.
pub struct DataUriChartRenderer;

impl ChartRenderer for DataUriChartRenderer {
    fn render(&self, kind: ChartKind, rows: &[CatalogRow]) -> Result<ChartRef> {
        let dataset = match kind {
            ChartKind::GenreBreakdown => {
                let slices: Vec<_> = genre_breakdown(rows)
                    .into_iter()
                    .map(|(label, share)| serde_json::json!({"label": label, "share": share}))
                    .collect();
                serde_json::json!({"kind": "genre_breakdown", "slices": slices})
            }
            ChartKind::FeatureMeans => {
                let bars: Vec<_> = feature_means(rows)
                    .into_iter()
                    .map(|(feature, mean)| serde_json::json!({"feature": feature, "mean": mean}))
                    .collect();
                serde_json::json!({"kind": "feature_means", "bars": bars})
            }
        };
        let payload = serde_json::to_vec(&dataset)?;
        let encoded = BASE64_STANDARD.encode(payload);
        Ok(ChartRef::new(format!(
            "data:application/json;base64,{}",
            encoded
        )))
    }
}

/// Genre shares over the matched artists, smallest first. Genres under 2% of
/// the set are folded into one "Other: a, b, c" bucket (the bucket is always
/// present, possibly at zero). Artists without a genre count as "Unknown".
pub fn genre_breakdown(rows: &[CatalogRow]) -> Vec<(String, f64)> {
    let genres: Vec<&str> = rows
        .iter()
        .filter_map(CatalogRow::as_artist)
        .map(|artist| artist.genre.as_deref().unwrap_or("Unknown"))
        .collect();
    if genres.is_empty() {
        return Vec::new();
    }
    let total = genres.len() as f64;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for genre in genres {
        *counts.entry(genre).or_insert(0) += 1;
    }

    let mut other_genres = Vec::new();
    let mut other_count = 0usize;
    for (genre, count) in &counts {
        if (*count as f64) / total < OTHER_BUCKET_THRESHOLD {
            other_genres.push(*genre);
            other_count += count;
        }
    }
    for genre in &other_genres {
        counts.remove(*genre);
    }

    let other_label = if other_genres.is_empty() {
        "Other".to_string()
    } else {
        format!("Other: {}", other_genres.join(", "))
    };

    let mut slices: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(genre, count)| (genre.to_string(), count))
        .collect();
    slices.push((other_label, other_count));
    slices.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    slices
        .into_iter()
        .map(|(label, count)| (label, count as f64 / total))
        .collect()
}

/// Mean of each audio feature over the matched tracks, in feature order.
/// Features with no present value report a zero mean.
pub fn feature_means(rows: &[CatalogRow]) -> Vec<(&'static str, f64)> {
    let tracks: Vec<&AudioFeatures> = rows
        .iter()
        .filter_map(CatalogRow::as_track)
        .map(|track| &track.features)
        .collect();

    AudioFeatures::NAMES
        .iter()
        .map(|name| {
            let values: Vec<f64> = tracks
                .iter()
                .filter_map(|features| features.get(name))
                .collect();
            let mean = if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            (*name, mean)
        })
        .collect()
}
