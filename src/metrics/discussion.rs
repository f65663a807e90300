//! Discussion Intensity
//!
//! Activity on the article's Talk page: revisions whose timestamp falls
//! inside the window, 0.1 per revision, saturating at 1.0. The Talk
//! namespace name depends on the edition (`Discussion:` on fr, `Talk:` on
//! en, ...).

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use super::{tables, CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::{RevisionQuery, WikiClient};
use crate::constants::scoring;
use crate::types::Result;

pub(crate) struct DiscussionIntensity;

impl DiscussionIntensity {
    async fn page_score(
        &self,
        client: &WikiClient,
        title: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<f64> {
        let talk = tables::talk_title(lang, title);
        let query = RevisionQuery::window(ctx.start, ctx.end).with_props("ids|timestamp");
        let revisions = client.revisions(lang, &talk, &query).await?;
        Ok((scoring::DISCUSSION_STEP * revisions.len() as f64).min(1.0))
    }
}

#[async_trait]
impl MetricCollector for DiscussionIntensity {
    fn name(&self) -> MetricName {
        MetricName::DiscussionIntensity
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
