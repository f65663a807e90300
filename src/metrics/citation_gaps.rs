//! Citation Gaps
//!
//! Unsourced-statement pressure: 0.1 per "citation needed" template,
//! saturating at 1.0. An article with no `<ref>` at all scores 1.0
//! outright — total absence of sourcing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::warn;

use super::{wikitext, CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::WikiClient;
use crate::constants::{network, scoring};
use crate::types::Result;

pub(crate) struct CitationGaps;

/// Pure scoring rule, shared with the tests
fn gap_score(text: &str, lang: &str) -> f64 {
    if wikitext::count_refs(text) == 0 {
        return 1.0;
    }
    (scoring::CITATION_STEP * wikitext::count_citation_needed(text, lang) as f64).min(1.0)
}

impl CitationGaps {
    async fn page_score(&self, client: &WikiClient, title: &str, lang: &str) -> Result<f64> {
        let text = client
            .latest_wikitext(lang, title)
            .await?
            .unwrap_or_default();
        Ok(gap_score(&text, lang))
    }
}

#[async_trait]
impl MetricCollector for CitationGaps {
    fn name(&self) -> MetricName {
        MetricName::CitationGaps
    }

    async fn collect(
        &self,
        client: &WikiClient,
        titles: &[String],
        lang: &str,
        _ctx: &CollectorContext,
    ) -> CollectorOutput {
        let mut scores = HashMap::with_capacity(titles.len());
        for title in titles {
            let score = match self.page_score(client, title, lang).await {
                Ok(score) => score,
                Err(err) => {
                    warn!(metric = %self.name(), title, lang, error = %err, "scoring 0.0");
                    0.0
                }
            };
            scores.insert(title.clone(), score);
            sleep(Duration::from_millis(network::CONTRIBUTOR_DELAY_MS)).await;
        }
        CollectorOutput::from_scores(scores)
    }
}
