//! Contributor Add/Delete Ratio
//!
//! Editing style of the page's recent contributors: for each of the last
//! 10, the imbalance between additions and deletions across their own last
//! 100 contributions, `|adds − deletes| / (adds + deletes)`. The page
//! score is the mean over the sample.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::warn;

use super::{
    mean, recent_contributors, CollectorContext, CollectorOutput, MetricCollector, MetricName,
};
use crate::client::WikiClient;
use crate::constants::{network, scoring};
use crate::types::{Result, UserContrib};

pub(crate) struct ContributorAddDeleteRatio;

fn contribution_imbalance(contribs: &[UserContrib]) -> f64 {
    let adds = contribs
        .iter()
        .filter(|c| c.size_diff.is_some_and(|d| d > 0))
        .count() as u32;
    let deletes = contribs
        .iter()
        .filter(|c| c.size_diff.is_some_and(|d| d < 0))
        .count() as u32;
    let total = adds + deletes;
    if total == 0 {
        0.0
    } else {
        adds.abs_diff(deletes) as f64 / total as f64
    }
}

impl ContributorAddDeleteRatio {
    async fn page_score(
        &self,
        client: &WikiClient,
        title: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<f64> {
        let contributors = recent_contributors(
            client,
            lang,
            title,
            ctx.end,
            scoring::CONTRIBUTORS_SAMPLE,
            false,
        )
        .await?;
        if contributors.is_empty() {
            return Ok(0.0);
        }

        let mut scores = Vec::with_capacity(contributors.len());
        for user in &contributors {
            let score = match client
                .user_contribs(
                    lang,
                    user,
                    "sizediff",
                    scoring::CONTRIBUTIONS_SAMPLE,
                    None,
                    false,
                )
                .await
            {
                Ok(contribs) => contribution_imbalance(&contribs),
                Err(err) => {
                    warn!(title, user, error = %err, "contributor lookup failed");
                    0.0
                }
            };
            scores.push(score);
            sleep(Duration::from_millis(network::CONTRIBUTOR_DELAY_MS)).await;
        }
        Ok(mean(&scores))
    }
}

#[async_trait]
impl MetricCollector for ContributorAddDeleteRatio {
    fn name(&self) -> MetricName {
        MetricName::ContributorAddDeleteRatio
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
