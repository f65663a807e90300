//! Report Adapter
//!
//! Serializes the scoring result and the metric matrix into the JSON
//! envelope consumed by the HTTP layer: one object per requested page plus
//! an analysis summary.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::types::{AnalysisReport, MetricMatrix, PageInfo, PageReport, ScoringResult, Summary};

/// Assemble the result envelope. Every requested page gets a row, even if
/// all of its cells stayed at zero.
pub fn build(
    pages: &[PageInfo],
    matrix: &MetricMatrix,
    scores: &ScoringResult,
    flagged_users: &HashMap<String, Vec<String>>,
    elapsed: Duration,
    batch_size: usize,
) -> AnalysisReport {
    let mut languages: BTreeMap<String, usize> = BTreeMap::new();
    for page in pages {
        *languages.entry(page.language.clone()).or_insert(0) += 1;
    }

    let page_reports = pages
        .iter()
        .map(|page| {
            let key = &page.unique_key;
            PageReport {
                title: page.clean_title.clone(),
                original_input: page.original_input.clone(),
                language: page.language.clone(),
                unique_key: key.clone(),
                status: "ok".to_string(),
                scores: scores.composite(key),
                metrics: matrix.row(key),
                detected_sockpuppets: flagged_users.get(key).cloned(),
            }
        })
        .collect();

    AnalysisReport {
        pages: page_reports,
        summary: Summary {
            total_pages: pages.len(),
            analyzed_pages: pages.len(),
            languages,
            processing_time_secs: (elapsed.as_millis() as f64 / 10.0).round() / 100.0,
            batch_size,
        },
        error: None,
    }
}
