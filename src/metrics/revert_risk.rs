//! Revert Risk
//!
//! Mean revert probability over the window's revisions, as predicted by
//! the language-agnostic Lift Wing model. A failed prediction drops the
//! revision from the mean; a page whose predictions all fail scores 0.0.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{mean, CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::{InferenceModel, RevisionQuery, WikiClient};
use crate::constants::network;
use crate::types::Result;

pub(crate) struct RevertRisk;

impl RevertRisk {
    async fn page_score(
        &self,
        client: &WikiClient,
        title: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<f64> {
        let query = RevisionQuery::window(ctx.start, ctx.end).with_props("ids");
        let revisions = client.revisions(lang, title, &query).await?;
        if revisions.is_empty() {
            return Ok(0.0);
        }

        let mut probabilities = Vec::with_capacity(revisions.len());
        for rev in &revisions {
            match client.predict(InferenceModel::RevertRisk, rev.id, lang).await {
                Ok(p) => probabilities.push(p),
                Err(err) => {
                    debug!(title, rev_id = rev.id, error = %err, "revision skipped");
                }
            }
            sleep(Duration::from_millis(network::INFERENCE_DELAY_MS)).await;
        }
        Ok(mean(&probabilities))
    }
}

#[async_trait]
impl MetricCollector for RevertRisk {
    fn name(&self) -> MetricName {
        MetricName::RevertRisk
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
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx() -> CollectorContext {
        CollectorContext {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            lists: Arc::new(ReferenceLists::default()),
            exclude_privileged: false,
        }
    }

    async fn mount_revisions(server: &MockServer, ids: &[u64]) {
        let revs: Vec<_> = ids
            .iter()
            .map(|id| json!({ "revid": id, "timestamp": "2024-01-10T00:00:00Z" }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/fr/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [ { "title": "Paris", "revisions": revs } ] }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_mean_probability() {
        let server = MockServer::start().await;
        mount_revisions(&server, &[11, 12]).await;
        for (id, p) in [(11, 0.2), (12, 0.8)] {
            Mock::given(method("POST"))
                .and(path("/liftwing/revertrisk-language-agnostic:predict"))
                .and(body_partial_json(json!({ "rev_id": id })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "output": { "probabilities": { "true": p } }
                })))
                .mount(&server)
                .await;
        }

        let client = stub_client(&server.uri());
        let out = RevertRisk
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert!((out.scores["Paris"] - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_failed_predictions_drop_out() {
        let server = MockServer::start().await;
        mount_revisions(&server, &[21, 22]).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "rev_id": 21 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": { "probabilities": { "true": 0.6 } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "rev_id": 22 })))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let client = stub_client(&server.uri());
        let out = RevertRisk
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert!((out.scores["Paris"] - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_no_revisions_scores_zero() {
        let server = MockServer::start().await;
        mount_revisions(&server, &[]).await;

        let client = stub_client(&server.uri());
        let out = RevertRisk
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Paris"], 0.0);
    }
}
