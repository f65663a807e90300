//! Sporadicity
//!
//! How long-lived the page's recent contributors are. For each of the last
//! 10 non-IP contributors, the timespan between their newest and oldest
//! contribution (out of their last 100, main namespace, at or before the
//! window end) is normalized against a year. Temporary accounts score 1.0
//! by definition. The page score is the mean over the sample.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::warn;

use super::{
    mean, recent_contributors, wikitext, CollectorContext, CollectorOutput, MetricCollector,
    MetricName,
};
use crate::client::{day_end, WikiClient};
use crate::constants::{network, scoring};
use crate::types::Result;

pub(crate) struct Sporadicity;

impl Sporadicity {
    /// Activity timespan of one contributor, in [0, 1]
    async fn contributor_score(
        &self,
        client: &WikiClient,
        user: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<f64> {
        if wikitext::is_temporary_account(user) || wikitext::is_ip_address(user) {
            return Ok(1.0);
        }
        let contribs = client
            .user_contribs(
                lang,
                user,
                "timestamp",
                scoring::CONTRIBUTIONS_SAMPLE,
                Some(day_end(ctx.end)),
                true,
            )
            .await?;
        let mut timestamps: Vec<_> = contribs.iter().filter_map(|c| c.timestamp).collect();
        if timestamps.len() < 2 {
            return Ok(0.0);
        }
        timestamps.sort();
        let span_days = (*timestamps.last().expect("nonempty") - timestamps[0])
            .num_seconds() as f64
            / 86_400.0;
        Ok((span_days / scoring::ACTIVITY_WINDOW_DAYS).min(1.0))
    }

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
            true,
        )
        .await?;
        if contributors.is_empty() {
            return Ok(0.0);
        }

        let mut scores = Vec::with_capacity(contributors.len());
        for user in &contributors {
            match self.contributor_score(client, user, lang, ctx).await {
                Ok(score) => scores.push(score),
                Err(err) => {
                    warn!(title, user, error = %err, "contributor lookup failed");
                    scores.push(0.0);
                }
            }
            sleep(Duration::from_millis(network::CONTRIBUTOR_DELAY_MS)).await;
        }
        Ok(mean(&scores))
    }
}

#[async_trait]
impl MetricCollector for Sporadicity {
    fn name(&self) -> MetricName {
        MetricName::Sporadicity
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
