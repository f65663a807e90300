//! Protection
//!
//! Severity of the page's edit protection, mapped from the protection
//! level table. Only entries of type `edit` count; the highest level wins.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::warn;

use super::{tables, CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::WikiClient;
use crate::constants::network;
use crate::types::Result;

pub(crate) struct Protection;

impl Protection {
    async fn page_score(&self, client: &WikiClient, title: &str, lang: &str) -> Result<f64> {
        let Some(entries) = client.edit_protection(lang, title).await? else {
            return Ok(0.0);
        };
        let score = entries
            .iter()
            .filter(|entry| entry.protection_type == "edit")
            .map(|entry| tables::protection_score(&entry.level))
            .fold(0.0, f64::max);
        Ok(score)
    }
}

#[async_trait]
impl MetricCollector for Protection {
    fn name(&self) -> MetricName {
        MetricName::Protection
    }

    async fn collect(
        &self,
        client: &WikiClient,
        titles: &[String],
        lang: &str,
        _ctx: &CollectorContext,
    ) -> CollectorOutput {
        let mut scores = HashMap::with_capacity(titles.len());
        for title in titles {
            let score = match self.page_score(client, title, lang).await {
                Ok(score) => score,
                Err(err) => {
                    warn!(metric = %self.name(), title, lang, error = %err, "scoring 0.0");
                    0.0
                }
            };
            scores.insert(title.clone(), score);
            sleep(Duration::from_millis(network::PAGE_DELAY_MS)).await;
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

    async fn mount_protection(server: &MockServer, protection: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/fr/w/api.php"))
            .and(query_param("inprop", "protection"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [ { "title": "Paris", "protection": protection } ] }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_unprotected_page_scores_zero() {
        let server = MockServer::start().await;
        mount_protection(&server, json!([])).await;
        let client = stub_client(&server.uri());
        let out = Protection
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Paris"], 0.0);
    }

    #[tokio::test]
    async fn test_sysop_protection_scores_one() {
        let server = MockServer::start().await;
        mount_protection(
            &server,
            json!([
                { "type": "edit", "level": "sysop", "expiry": "infinity" },
                { "type": "move", "level": "sysop", "expiry": "infinity" }
            ]),
        )
        .await;
        let client = stub_client(&server.uri());
        let out = Protection
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Paris"], 1.0);
    }

    #[tokio::test]
    async fn test_move_only_protection_does_not_count() {
        let server = MockServer::start().await;
        mount_protection(
            &server,
            json!([ { "type": "move", "level": "sysop", "expiry": "infinity" } ]),
        )
        .await;
        let client = stub_client(&server.uri());
        let out = Protection
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Paris"], 0.0);
    }

    #[tokio::test]
    async fn test_highest_edit_level_wins() {
        let server = MockServer::start().await;
        mount_protection(
            &server,
            json!([
                { "type": "edit", "level": "autoconfirmed" },
                { "type": "edit", "level": "extendedconfirmed" }
            ]),
        )
        .await;
        let client = stub_client(&server.uri());
        let out = Protection
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Paris"], 0.5);
    }

    #[tokio::test]
    async fn test_missing_page_scores_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fr/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [ { "title": "Nulle part", "missing": true } ] }
            })))
            .mount(&server)
            .await;
        let client = stub_client(&server.uri());
        let out = Protection
            .collect(&client, &["Nulle part".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Nulle part"], 0.0);
    }
}
