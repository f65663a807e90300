//! Sockpuppets
//!
//! Binary detection of watchlisted accounts in a page's history: 1.0 when
//! any user from the watchlist authored one of the last 500 revisions,
//! 0.0 otherwise. Matched usernames travel through the side channel into
//! the report.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::{RevisionQuery, WikiClient};
use crate::constants::{network, scoring};
use crate::types::Result;

pub(crate) struct Sockpuppets;

impl Sockpuppets {
    /// Watchlisted authors among the page's recent revisions
    async fn detect(
        &self,
        client: &WikiClient,
        title: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<Vec<String>> {
        let query = RevisionQuery::latest(scoring::SOCKPUPPET_REVISION_DEPTH)
            .with_props("ids|user");
        let revisions = client.revisions(lang, title, &query).await?;

        let mut matched: HashSet<String> = HashSet::new();
        for rev in &revisions {
            if let Some(user) = rev.user.as_deref() {
                if ctx.lists.is_sockpuppet(user) {
                    matched.insert(user.to_string());
                }
            }
        }
        let mut matched: Vec<String> = matched.into_iter().collect();
        matched.sort();
        Ok(matched)
    }
}

#[async_trait]
impl MetricCollector for Sockpuppets {
    fn name(&self) -> MetricName {
        MetricName::Sockpuppets
    }

    async fn collect(
        &self,
        client: &WikiClient,
        titles: &[String],
        lang: &str,
        ctx: &CollectorContext,
    ) -> CollectorOutput {
        if !ctx.lists.has_sockpuppets() {
            debug!("no sockpuppet watchlist configured, scoring 0.0 everywhere");
            return CollectorOutput::from_scores(
                titles.iter().map(|t| (t.clone(), 0.0)).collect(),
            );
        }

        let mut scores = HashMap::with_capacity(titles.len());
        let mut flagged_users = HashMap::new();
        for title in titles {
            match self.detect(client, title, lang, ctx).await {
                Ok(matched) if matched.is_empty() => {
                    scores.insert(title.clone(), 0.0);
                }
                Ok(matched) => {
                    info!(title, lang, users = ?matched, "watchlisted contributors detected");
                    scores.insert(title.clone(), 1.0);
                    flagged_users.insert(title.clone(), matched);
                }
                Err(err) => {
                    warn!(metric = %self.name(), title, lang, error = %err, "scoring 0.0");
                    scores.insert(title.clone(), 0.0);
                }
            }
            sleep(Duration::from_millis(network::PAGE_DELAY_MS)).await;
        }
        CollectorOutput {
            scores,
            flagged_users,
        }
    }
}
