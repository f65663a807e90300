//! Contributors Concentration
//!
//! Share of the busiest contributor among the last 10 revisions at or
//! before the window end. A page maintained by one account scores 1.0.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use super::{CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::{RevisionQuery, WikiClient};
use crate::constants::scoring;
use crate::types::Result;

pub(crate) struct ContributorsConcentration;

impl ContributorsConcentration {
    async fn page_score(
        &self,
        client: &WikiClient,
        title: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<f64> {
        let query = RevisionQuery::before(ctx.end, scoring::CONTRIBUTORS_SAMPLE)
            .with_props("ids|user");
        let revisions = client.revisions(lang, title, &query).await?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for rev in &revisions {
            if let Some(user) = rev.user.as_deref() {
                *counts.entry(user).or_insert(0) += 1;
            }
        }
        let total: usize = counts.values().sum();
        if total == 0 {
            return Ok(0.0);
        }
        let top = counts.values().copied().max().unwrap_or(0);
        Ok(top as f64 / total as f64)
    }
}

#[async_trait]
impl MetricCollector for ContributorsConcentration {
    fn name(&self) -> MetricName {
        MetricName::ContributorsConcentration
    }

    async fn collect(
        &self,
        client: &WikiClient,
        titles: &[String],
        lang: &str,
        ctx: &CollectorContext,
    ) -> CollectorOutput {
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
        }
        CollectorOutput::from_scores(scores)
    }
}
