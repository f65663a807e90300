//! Add/Delete Ratio (page level)
//!
//! Imbalance between growth and shrink events across the last 10 revisions
//! at or before the window end: `|adds − deletes| / (adds + deletes)`. A
//! page edited in one direction only scores 1.0; balanced churn scores
//! near 0.0.
//!
//! With `exclude_privileged` on, revisions authored by sysop, bureaucrat,
//! rollbacker or bot accounts are dropped first (groups resolved through
//! the batched user lookup).

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use super::{tables, CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::{RevisionQuery, WikiClient};
use crate::constants::scoring;
use crate::types::{Result, Revision};

pub(crate) struct AddDeleteRatio;

/// Event imbalance over consecutive size deltas, oldest → newest
fn event_imbalance(revisions: &[Revision]) -> f64 {
    let mut ordered: Vec<&Revision> = revisions.iter().collect();
    ordered.sort_by_key(|rev| rev.timestamp);

    let mut adds = 0u32;
    let mut deletes = 0u32;
    for pair in ordered.windows(2) {
        let (Some(prev), Some(curr)) = (pair[0].size, pair[1].size) else {
            continue;
        };
        match curr - prev {
            delta if delta > 0 => adds += 1,
            delta if delta < 0 => deletes += 1,
            _ => {}
        }
    }

    let total = adds + deletes;
    if total == 0 {
        0.0
    } else {
        (adds.abs_diff(deletes)) as f64 / total as f64
    }
}

impl AddDeleteRatio {
    async fn page_score(
        &self,
        client: &WikiClient,
        title: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<f64> {
        let query = RevisionQuery::before(ctx.end, scoring::BALANCE_REVISIONS)
            .with_props("ids|timestamp|size|user|comment");
        let mut revisions = client.revisions(lang, title, &query).await?;

        if ctx.exclude_privileged {
            let users: Vec<String> = revisions
                .iter()
                .filter_map(|rev| rev.user.clone())
                .collect();
            if !users.is_empty() {
                let groups = client.user_groups(lang, &users).await?;
                revisions.retain(|rev| {
                    rev.user.as_deref().is_none_or(|user| {
                        groups.get(user).is_none_or(|user_groups| {
                            !user_groups
                                .iter()
                                .any(|g| tables::PRIVILEGED_GROUPS.contains(&g.as_str()))
                        })
                    })
                });
            }
        }

        Ok(event_imbalance(&revisions))
    }
}

#[async_trait]
impl MetricCollector for AddDeleteRatio {
    fn name(&self) -> MetricName {
        MetricName::AddDeleteRatio
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
