//! Staleness
//!
//! Age of sustained activity: how long ago the 10th most recent revision
//! (at or before the window end) was made, capped at one year. Pages with
//! fewer than 10 revisions, or missing entirely, score 1.0.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use super::{CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::{day_end, RevisionQuery, WikiClient};
use crate::constants::scoring;
use crate::types::Result;

pub(crate) struct Staleness;

impl Staleness {
    async fn page_score(
        &self,
        client: &WikiClient,
        title: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<f64> {
        let query = RevisionQuery::before(ctx.end, scoring::STALENESS_DEPTH)
            .with_props("ids|timestamp");
        let revisions = client.revisions(lang, title, &query).await?;
        if revisions.len() < scoring::STALENESS_DEPTH {
            return Ok(1.0);
        }
        let Some(tenth_ts) = revisions[scoring::STALENESS_DEPTH - 1].timestamp else {
            return Ok(1.0);
        };
        let days = (day_end(ctx.end) - tenth_ts).num_days().max(0) as f64;
        Ok((days / scoring::ACTIVITY_WINDOW_DAYS).min(1.0))
    }
}

#[async_trait]
impl MetricCollector for Staleness {
    fn name(&self) -> MetricName {
        MetricName::Staleness
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testutil::stub_client;
    use crate::metrics::ReferenceLists;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx() -> CollectorContext {
        CollectorContext {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            lists: Arc::new(ReferenceLists::default()),
            exclude_privileged: false,
        }
    }

    async fn mount_history(server: &MockServer, tenth_timestamp: &str) {
        let mut revs: Vec<_> = (0..9)
            .map(|i| json!({ "revid": 100 - i, "timestamp": "2024-12-30T00:00:00Z" }))
            .collect();
        revs.push(json!({ "revid": 1, "timestamp": tenth_timestamp }));
        Mock::given(method("GET"))
            .and(path("/fr/w/api.php"))
            .and(query_param("rvlimit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [ { "title": "Paris", "revisions": revs } ] }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_tenth_revision_a_year_old_saturates() {
        let server = MockServer::start().await;
        mount_history(&server, "2023-12-31T23:59:59Z").await;
        let client = stub_client(&server.uri());
        let out = Staleness
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Paris"], 1.0);
    }

    #[tokio::test]
    async fn test_fresh_activity_scores_near_zero() {
        let server = MockServer::start().await;
        mount_history(&server, "2024-12-31T12:00:00Z").await;
        let client = stub_client(&server.uri());
        let out = Staleness
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Paris"], 0.0);
    }

    #[tokio::test]
    async fn test_half_year_is_half_score() {
        let server = MockServer::start().await;
        // 2024-07-02T23:59:59 is 182 days before end-of-window
        mount_history(&server, "2024-07-02T23:59:59Z").await;
        let client = stub_client(&server.uri());
        let out = Staleness
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert!((out.scores["Paris"] - 182.0 / 365.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_short_history_scores_one() {
        let server = MockServer::start().await;
        let revs: Vec<_> = (0..4)
            .map(|i| json!({ "revid": i, "timestamp": "2024-06-01T00:00:00Z" }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/fr/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [ { "title": "Ébauche", "revisions": revs } ] }
            })))
            .mount(&server)
            .await;
        let client = stub_client(&server.uri());
        let out = Staleness
            .collect(&client, &["Ébauche".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Ébauche"], 1.0);
    }

    #[tokio::test]
    async fn test_missing_page_scores_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fr/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [ { "title": "Nulle part", "missing": true } ] }
            })))
            .mount(&server)
            .await;
        let client = stub_client(&server.uri());
        let out = Staleness
            .collect(&client, &["Nulle part".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Nulle part"], 1.0);
    }
}
