//! Views Spike
//!
//! Daily pageview counts over the window, reduced to the spike statistic
//! `(max − median) / (median + 1)` and normalized against the reference
//! magnitude.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{spike, CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::WikiClient;
use crate::constants::scoring;
use crate::types::Result;

pub(crate) struct PageviewSpikes;

impl PageviewSpikes {
    async fn page_score(
        &self,
        client: &WikiClient,
        title: &str,
        lang: &str,
        ctx: &CollectorContext,
    ) -> Result<f64> {
        let series = client
            .daily_pageviews(lang, title, ctx.start, ctx.end)
            .await?;
        if series.is_empty() {
            debug!(title, lang, "no pageview data in window");
            return Ok(0.0);
        }
        let counts: Vec<f64> = series.iter().map(|d| d.views as f64).collect();
        let raw = spike(&counts);
        Ok((raw / scoring::VIEWS_SPIKE_REFERENCE).min(1.0))
    }
}

#[async_trait]
impl MetricCollector for PageviewSpikes {
    fn name(&self) -> MetricName {
        MetricName::ViewsSpikes
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
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx() -> CollectorContext {
        CollectorContext {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            lists: Arc::new(ReferenceLists::default()),
            exclude_privileged: false,
        }
    }

    fn items(views: &[u64]) -> serde_json::Value {
        let items: Vec<_> = views
            .iter()
            .enumerate()
            .map(|(i, v)| json!({ "timestamp": format!("202401{:02}00", i + 1), "views": v }))
            .collect();
        json!({ "items": items })
    }

    #[tokio::test]
    async fn test_constant_series_scores_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/pageviews/.*"))
            .respond_with(ResponseTemplate::new(200).set_body_json(items(&[50; 10])))
            .mount(&server)
            .await;

        let client = stub_client(&server.uri());
        let out = PageviewSpikes
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Paris"], 0.0);
    }

    #[tokio::test]
    async fn test_single_peak_over_zero_median() {
        // nine zero days plus one day at K: spike = K, score = K / 37.2002
        let mut views = vec![0u64; 10];
        views[4] = 20;
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/pageviews/.*"))
            .respond_with(ResponseTemplate::new(200).set_body_json(items(&views)))
            .mount(&server)
            .await;

        let client = stub_client(&server.uri());
        let out = PageviewSpikes
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        let expected = 20.0 / crate::constants::scoring::VIEWS_SPIKE_REFERENCE;
        assert!((out.scores["Paris"] - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_huge_spike_saturates_at_one() {
        let mut views = vec![1u64; 10];
        views[0] = 10_000;
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/pageviews/.*"))
            .respond_with(ResponseTemplate::new(200).set_body_json(items(&views)))
            .mount(&server)
            .await;

        let client = stub_client(&server.uri());
        let out = PageviewSpikes
            .collect(&client, &["Paris".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Paris"], 1.0);
    }

    #[tokio::test]
    async fn test_missing_article_scores_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = stub_client(&server.uri());
        let out = PageviewSpikes
            .collect(&client, &["Inconnue".to_string()], "fr", &ctx())
            .await;
        assert_eq!(out.scores["Inconnue"], 0.0);
    }
}
