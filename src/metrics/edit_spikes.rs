//! Edits Spike
//!
//! Revision activity over the window bucketed per day (bot-named accounts
//! excluded), reduced to the same spike statistic as pageviews and
//! normalized against the edit reference magnitude.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::warn;

use super::{spike, CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::{RevisionQuery, WikiClient};
use crate::constants::scoring;
use crate::types::{Result, Revision};

pub(crate) struct EditSpikes;

/// MediaWiki system accounts and conventionally-named bots
fn is_bot_user(user: &str) -> bool {
    user.to_lowercase().contains("bot") || user.starts_with("MediaWiki")
}

/// One count per day over `[start, end]`, zero-filled — quiet days weigh
/// into the median.
fn daily_counts(revisions: &[Revision], start: NaiveDate, end: NaiveDate) -> Vec<f64> {
    let days = (end - start).num_days().max(0) as usize + 1;
    let mut counts = vec![0.0; days];
    for rev in revisions {
        let Some(ts) = rev.timestamp else { continue };
        let offset = (ts.date_naive() - start).num_days();
        if offset >= 0 && (offset as usize) < days {
            counts[offset as usize] += 1.0;
        }
    }
    counts
}

impl EditSpikes {
    async fn page_score(
        &self,
        client: &WikiClient,
        title: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<f64> {
        let query = RevisionQuery::window(ctx.start, ctx.end).with_props("ids|timestamp|user");
        let revisions = client.revisions(lang, title, &query).await?;
        let human: Vec<Revision> = revisions
            .into_iter()
            .filter(|rev| rev.user.as_deref().is_none_or(|u| !is_bot_user(u)))
            .collect();

        let counts = daily_counts(&human, ctx.start, ctx.end);
        if counts.iter().sum::<f64>() == 0.0 {
            return Ok(0.0);
        }
        Ok((spike(&counts) / scoring::EDITS_SPIKE_REFERENCE).min(1.0))
    }
}

#[async_trait]
impl MetricCollector for EditSpikes {
    fn name(&self) -> MetricName {
        MetricName::EditsSpikes
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
