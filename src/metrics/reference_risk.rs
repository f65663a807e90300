//! Reference Risk (library helper)
//!
//! Mean `reference-risk:predict` score over the window's revisions. Not
//! part of the weighted composite — the weight tables are fixed — but
//! exposed for callers that want the raw signal.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::client::{InferenceModel, RevisionQuery, WikiClient};
use crate::constants::network;
use crate::types::Result;

use super::mean;

/// Average reference-risk over the revisions of `[start, end]`; 0.0 when
/// the page has no revisions in the window or every prediction fails.
pub async fn reference_risk_mean(
    client: &WikiClient,
    title: &str,
    lang: &str,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
) -> Result<f64> {
    let query = RevisionQuery::window(start, end).with_props("ids|timestamp");
    let revisions = client.revisions(lang, title, &query).await?;
    if revisions.is_empty() {
        return Ok(0.0);
    }

    let mut scores = Vec::with_capacity(revisions.len());
    for rev in &revisions {
        match client
            .predict(InferenceModel::ReferenceRisk, rev.id, lang)
            .await
        {
            Ok(score) => scores.push(score),
            Err(err) => debug!(title, rev_id = rev.id, error = %err, "revision skipped"),
        }
        sleep(Duration::from_millis(network::INFERENCE_DELAY_MS)).await;
    }
    Ok(mean(&scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testutil::stub_client;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_reference_risk_mean() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [ { "title": "Berlin", "revisions": [
                    { "revid": 1, "timestamp": "2024-02-01T00:00:00Z" },
                    { "revid": 2, "timestamp": "2024-02-02T00:00:00Z" }
                ] } ] }
            })))
            .mount(&server)
            .await;
        for (id, score) in [(1, 0.1), (2, 0.5)] {
            Mock::given(method("POST"))
                .and(path("/liftwing/reference-risk:predict"))
                .and(body_partial_json(json!({ "rev_id": id })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "output": { "score": score }
                })))
                .mount(&server)
                .await;
        }

        let client = stub_client(&server.uri());
        let score = reference_risk_mean(
            &client,
            "Berlin",
            "en",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .await
        .unwrap();
        assert!((score - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_no_revisions_is_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [ { "title": "Berlin", "revisions": [] } ] }
            })))
            .mount(&server)
            .await;

        let client = stub_client(&server.uri());
        let score = reference_risk_mean(
            &client,
            "Berlin",
            "en",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(score, 0.0);
    }
}
