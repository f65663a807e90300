//! Result Types
//!
//! The metric matrix assembled by the orchestrator, the composite scoring
//! series produced by the scorer, and the JSON report envelope handed to
//! the API layer.
//!
//! Matrix cells are stored post-×100, i.e. percent-like values in [0, 100].

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::metrics::MetricName;
use crate::types::page::PageInfo;

/// Dense matrix: rows = `unique_key`s (input order), columns = metrics.
/// Missing cells read as 0.0.
#[derive(Debug, Clone)]
pub struct MetricMatrix {
    keys: Vec<String>,
    columns: BTreeMap<MetricName, HashMap<String, f64>>,
}

impl MetricMatrix {
    /// Materialize a dense matrix over `keys` from sparse per-metric maps.
    /// Non-finite values are coerced to 0.0 so downstream arithmetic stays
    /// finite.
    pub fn materialize(
        keys: Vec<String>,
        sparse: impl IntoIterator<Item = (MetricName, HashMap<String, f64>)>,
    ) -> Self {
        let mut columns: BTreeMap<MetricName, HashMap<String, f64>> = BTreeMap::new();
        for (metric, cells) in sparse {
            let dense = keys
                .iter()
                .map(|k| {
                    let v = cells.get(k).copied().unwrap_or(0.0);
                    (k.clone(), if v.is_finite() { v } else { 0.0 })
                })
                .collect();
            columns.insert(metric, dense);
        }
        Self { keys, columns }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Metrics present in the matrix
    pub fn metrics(&self) -> impl Iterator<Item = MetricName> + '_ {
        self.columns.keys().copied()
    }

    pub fn contains(&self, metric: MetricName) -> bool {
        self.columns.contains_key(&metric)
    }

    pub fn get(&self, key: &str, metric: MetricName) -> f64 {
        self.columns
            .get(&metric)
            .and_then(|col| col.get(key))
            .copied()
            .unwrap_or(0.0)
    }

    /// All metric values for one row, keyed by display label
    pub fn row(&self, key: &str) -> BTreeMap<String, f64> {
        self.columns
            .iter()
            .map(|(metric, col)| {
                (
                    metric.label().to_string(),
                    col.get(key).copied().unwrap_or(0.0),
                )
            })
            .collect()
    }

    pub fn cell_count(&self) -> usize {
        self.keys.len() * self.columns.len()
    }
}

/// One per-key series of composite scores
pub type ScoreSeries = HashMap<String, f64>;

/// The three weighted composites, their raw counterparts, and Sensitivity
#[derive(Debug, Clone, Default)]
pub struct ScoringResult {
    pub heat: ScoreSeries,
    pub quality: ScoreSeries,
    pub risk: ScoreSeries,
    pub sensitivity: ScoreSeries,
    pub heat_raw: ScoreSeries,
    pub quality_raw: ScoreSeries,
    pub risk_raw: ScoreSeries,
}

impl ScoringResult {
    fn series_value(series: &ScoreSeries, key: &str) -> f64 {
        series.get(key).copied().unwrap_or(0.0)
    }

    pub fn composite(&self, key: &str) -> CompositeScores {
        CompositeScores {
            heat: Self::series_value(&self.heat, key),
            quality: Self::series_value(&self.quality, key),
            risk: Self::series_value(&self.risk, key),
            sensitivity: Self::series_value(&self.sensitivity, key),
        }
    }
}

// =============================================================================
// Report envelope (the only place where types become transport strings)
// =============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompositeScores {
    pub heat: f64,
    pub quality: f64,
    pub risk: f64,
    pub sensitivity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub title: String,
    pub original_input: String,
    pub language: String,
    pub unique_key: String,
    pub status: String,
    pub scores: CompositeScores,
    pub metrics: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_sockpuppets: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_pages: usize,
    pub analyzed_pages: usize,
    /// Pages per language edition
    pub languages: BTreeMap<String, usize>,
    pub processing_time_secs: f64,
    pub batch_size: usize,
}

/// The analysis result envelope returned to the API layer
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub pages: Vec<PageReport>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisReport {
    /// Envelope for a catastrophic orchestration failure: every requested
    /// page still gets a row, zero-scored and marked as errored.
    pub fn failure(pages: &[PageInfo], message: impl Into<String>, batch_size: usize) -> Self {
        let zero = CompositeScores {
            heat: 0.0,
            quality: 0.0,
            risk: 0.0,
            sensitivity: 0.0,
        };
        let mut languages: BTreeMap<String, usize> = BTreeMap::new();
        for page in pages {
            *languages.entry(page.language.clone()).or_insert(0) += 1;
        }
        Self {
            pages: pages
                .iter()
                .map(|p| PageReport {
                    title: p.clean_title.clone(),
                    original_input: p.original_input.clone(),
                    language: p.language.clone(),
                    unique_key: p.unique_key.clone(),
                    status: "error".to_string(),
                    scores: zero.clone(),
                    metrics: BTreeMap::new(),
                    detected_sockpuppets: None,
                })
                .collect(),
            summary: Summary {
                total_pages: pages.len(),
                analyzed_pages: 0,
                languages,
                processing_time_secs: 0.0,
                batch_size,
            },
            error: Some(message.into()),
        }
    }
}
