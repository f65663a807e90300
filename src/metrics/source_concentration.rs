//! Source Concentration
//!
//! Share of the most-cited host among all reference URLs: 1.0 when every
//! citation points at the same domain, 0.0 when the page cites nothing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::warn;

use super::{wikitext, CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::WikiClient;
use crate::constants::network;
use crate::types::Result;

pub(crate) struct SourceConcentration;

fn dominance(text: &str) -> f64 {
    let hosts = wikitext::reference_hosts(text);
    if hosts.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for host in &hosts {
        *counts.entry(host.as_str()).or_insert(0) += 1;
    }
    let top = counts.values().copied().max().unwrap_or(0);
    top as f64 / hosts.len() as f64
}

impl SourceConcentration {
    async fn page_score(&self, client: &WikiClient, title: &str, lang: &str) -> Result<f64> {
        let Some(text) = client.latest_wikitext(lang, title).await? else {
            return Ok(0.0);
        };
        Ok(dominance(&text))
    }
}

#[async_trait]
impl MetricCollector for SourceConcentration {
    fn name(&self) -> MetricName {
        MetricName::SourceConcentration
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
