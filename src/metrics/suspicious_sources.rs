//! Suspicious Sources
//!
//! Distinct reference hosts that belong to the supplied domain blacklist:
//! none → 0.0, exactly one → 0.5, two or more → 1.0.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{wikitext, CollectorContext, CollectorOutput, MetricCollector, MetricName, ReferenceLists};
use crate::client::WikiClient;
use crate::constants::network;
use crate::types::Result;

pub(crate) struct SuspiciousSources;

fn blacklist_score(text: &str, lists: &ReferenceLists) -> f64 {
    let flagged: HashSet<String> = wikitext::reference_hosts(text)
        .into_iter()
        .filter(|host| lists.is_blacklisted_host(host))
        .collect();
    match flagged.len() {
        0 => 0.0,
        1 => 0.5,
        _ => 1.0,
    }
}

impl SuspiciousSources {
    async fn page_score(
        &self,
        client: &WikiClient,
        title: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<f64> {
        let Some(text) = client.latest_wikitext(lang, title).await? else {
            return Ok(0.0);
        };
        Ok(blacklist_score(&text, &ctx.lists))
    }
}

#[async_trait]
impl MetricCollector for SuspiciousSources {
    fn name(&self) -> MetricName {
        MetricName::SuspiciousSources
    }

    async fn collect(
        &self,
        client: &WikiClient,
        titles: &[String],
        lang: &str,
        ctx: &CollectorContext,
    ) -> CollectorOutput {
        if !ctx.lists.has_blacklist() {
            debug!("no blacklist configured, scoring 0.0 everywhere");
            return CollectorOutput::from_scores(
                titles.iter().map(|t| (t.clone(), 0.0)).collect(),
            );
        }
        let mut scores = HashMap::with_capacity(titles.len());
        for title in titles {
            let score = match self.page_score(client, title, lang, ctx).await {
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
