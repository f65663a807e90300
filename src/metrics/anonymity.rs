//! Anonymity
//!
//! Share of the window's revisions authored anonymously: by a bare IP
//! (the `anon` flag) or by a temporary account (`~YYYY-…` username).
//! 0.1 per anonymous revision, saturating at 1.0.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use super::{wikitext, CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::{RevisionQuery, WikiClient};
use crate::constants::scoring;
use crate::types::{Result, Revision};

pub(crate) struct Anonymity;

fn is_anonymous(rev: &Revision) -> bool {
    rev.anon
        || rev
            .user
            .as_deref()
            .is_some_and(wikitext::is_temporary_account)
}

impl Anonymity {
    async fn page_score(
        &self,
        client: &WikiClient,
        title: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<f64> {
        let query = RevisionQuery::window(ctx.start, ctx.end).with_props("ids|timestamp|user|flags");
        let revisions = client.revisions(lang, title, &query).await?;
        if revisions.is_empty() {
            return Ok(0.0);
        }
        let anonymous = revisions.iter().filter(|rev| is_anonymous(rev)).count();
        Ok((scoring::ANONYMITY_STEP * anonymous as f64).min(1.0))
    }
}

#[async_trait]
impl MetricCollector for Anonymity {
    fn name(&self) -> MetricName {
        MetricName::Anonymity
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
