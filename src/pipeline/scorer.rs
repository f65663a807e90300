//! Scorer
//!
//! Fixed weighted sums per category over the (percent-scaled) metric
//! matrix. Metrics absent from the matrix drop out of their category's
//! weight sum; Sensitivity is the arithmetic mean of the three normalized
//! composites.

use crate::metrics::{Category, MetricName};
use crate::types::{MetricMatrix, ScoreSeries, ScoringResult};

/// Weighted composite for one category: `(normalized, raw)` series
fn category_scores(matrix: &MetricMatrix, category: Category) -> (ScoreSeries, ScoreSeries) {
    let available: Vec<MetricName> = MetricName::ALL
        .iter()
        .copied()
        .filter(|m| m.category() == category && matrix.contains(*m))
        .collect();
    let weight_sum: f64 = available.iter().map(|m| m.weight()).sum();

    let mut normalized = ScoreSeries::with_capacity(matrix.keys().len());
    let mut raw_series = ScoreSeries::with_capacity(matrix.keys().len());
    for key in matrix.keys() {
        let raw: f64 = available
            .iter()
            .map(|m| m.weight() * matrix.get(key, *m))
            .sum();
        let norm = if weight_sum > 0.0 { raw / weight_sum } else { 0.0 };
        raw_series.insert(key.clone(), raw);
        normalized.insert(key.clone(), norm);
    }
    (normalized, raw_series)
}

/// Compute the full scoring result for a materialized matrix
pub fn score(matrix: &MetricMatrix) -> ScoringResult {
    let (heat, heat_raw) = category_scores(matrix, Category::Heat);
    let (quality, quality_raw) = category_scores(matrix, Category::Quality);
    let (risk, risk_raw) = category_scores(matrix, Category::Risk);

    let sensitivity: ScoreSeries = matrix
        .keys()
        .iter()
        .map(|key| {
            let h = heat.get(key).copied().unwrap_or(0.0);
            let q = quality.get(key).copied().unwrap_or(0.0);
            let r = risk.get(key).copied().unwrap_or(0.0);
            (key.clone(), (h + q + r) / 3.0)
        })
        .collect();

    ScoringResult {
        heat,
        quality,
        risk,
        sensitivity,
        heat_raw,
        quality_raw,
        risk_raw,
    }
}
