//! Wiki Client
//!
//! Thin abstraction over the three upstream surfaces: the MediaWiki Action
//! API (`https://{lang}.wikipedia.org/w/api.php`), the Wikimedia Pageviews
//! REST API, and the Lift Wing inference endpoints.
//!
//! Every request carries the project User-Agent, runs under a per-request
//! timeout, and is retried with exponential backoff on the transient status
//! set. Endpoint roots are plain configuration so tests can point the
//! client at a local stub server.

mod retry;
mod revisions;

pub use retry::RetryPolicy;
pub use revisions::{day_end, day_start, RevisionDirection, RevisionQuery};

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::NetworkConfig;
use crate::constants::network;
use crate::types::{ProtectionEntry, Result, UserContrib, WikiError};

/// Lift Wing model endpoints consumed as remote inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceModel {
    /// `revertrisk-language-agnostic`: probability that a revision gets
    /// reverted
    RevertRisk,
    /// `readability`: prose readability score of a revision
    Readability,
    /// `reference-risk`: reliability risk of a revision's references
    ReferenceRisk,
}

impl InferenceModel {
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::RevertRisk => "revertrisk-language-agnostic",
            Self::Readability => "readability",
            Self::ReferenceRisk => "reference-risk",
        }
    }

    /// Pull the numeric score out of the model-specific response shape
    fn extract(&self, body: &Value) -> Option<f64> {
        let output = body.get("output")?;
        match self {
            Self::RevertRisk => output.get("probabilities")?.get("true")?.as_f64(),
            Self::Readability | Self::ReferenceRisk => output.get("score")?.as_f64(),
        }
    }
}

/// One day of pageview counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyViews {
    pub date: NaiveDate,
    pub views: u64,
}

pub struct WikiClient {
    http: reqwest::Client,
    action_api: String,
    pageviews_api: String,
    liftwing_api: String,
    retry: RetryPolicy,
    inference_timeout: Duration,
}

impl WikiClient {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(WikiError::Transport)?;

        Ok(Self {
            http,
            action_api: config.action_api.clone(),
            pageviews_api: config.pageviews_api.trim_end_matches('/').to_string(),
            liftwing_api: config.liftwing_api.trim_end_matches('/').to_string(),
            retry: RetryPolicy::new(
                config.max_retries,
                Duration::from_millis(network::BASE_DELAY_MS),
            ),
            inference_timeout: Duration::from_secs(config.inference_timeout_secs),
        })
    }

    fn action_url(&self, lang: &str) -> String {
        self.action_api.replace("{lang}", lang)
    }

    /// One GET against the Action API of the given edition: appends
    /// `format=json&formatversion=2`, retries transient failures, and turns
    /// a structured `error` block into a permanent [`WikiError::Api`].
    pub(crate) async fn action_get(
        &self,
        lang: &str,
        params: &[(String, String)],
    ) -> Result<Value> {
        let url = self.action_url(lang);
        self.retry
            .run("action-api", || async {
                let response = self
                    .http
                    .get(&url)
                    .query(params)
                    .query(&[("format", "json"), ("formatversion", "2")])
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(WikiError::Status {
                        status: status.as_u16(),
                        url: url.clone(),
                    });
                }
                let body: Value = response.json().await.map_err(decode_error)?;
                if let Some(err) = body.get("error") {
                    return Err(WikiError::Api {
                        code: err
                            .get("code")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown")
                            .to_string(),
                        info: err
                            .get("info")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    });
                }
                Ok(body)
            })
            .await
    }

    /// Wikitext of the current revision's main slot; `None` when the page
    /// does not exist.
    pub async fn latest_wikitext(&self, lang: &str, title: &str) -> Result<Option<String>> {
        let params = vec![
            ("action".to_string(), "query".to_string()),
            ("prop".to_string(), "revisions".to_string()),
            ("rvprop".to_string(), "content".to_string()),
            ("rvslots".to_string(), "main".to_string()),
            ("titles".to_string(), title.to_string()),
            ("redirects".to_string(), "1".to_string()),
        ];
        let body = self.action_get(lang, &params).await?;
        let Some(page) = first_page(&body) else {
            return Ok(None);
        };
        if page_missing(page) {
            debug!(lang, title, "page not found");
            return Ok(None);
        }
        let content = page
            .get("revisions")
            .and_then(Value::as_array)
            .and_then(|revs| revs.first())
            .and_then(|rev| rev.get("slots"))
            .and_then(|slots| slots.get("main"))
            .and_then(|main| main.get("content"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(content)
    }

    /// Edit-protection entries of a page; `None` when the page is missing.
    pub async fn edit_protection(
        &self,
        lang: &str,
        title: &str,
    ) -> Result<Option<Vec<ProtectionEntry>>> {
        let params = vec![
            ("action".to_string(), "query".to_string()),
            ("titles".to_string(), title.to_string()),
            ("prop".to_string(), "info".to_string()),
            ("inprop".to_string(), "protection".to_string()),
        ];
        let body = self.action_get(lang, &params).await?;
        let Some(page) = first_page(&body) else {
            return Ok(None);
        };
        if page_missing(page) {
            return Ok(None);
        }
        let entries = page
            .get("protection")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|entry| {
                        Some(ProtectionEntry {
                            protection_type: entry.get("type")?.as_str()?.to_string(),
                            level: entry.get("level")?.as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Some(entries))
    }

    /// Privilege groups for up to `USER_GROUP_BATCH` usernames per call;
    /// larger lists are split transparently.
    pub async fn user_groups(
        &self,
        lang: &str,
        usernames: &[String],
    ) -> Result<HashMap<String, Vec<String>>> {
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        for batch in usernames.chunks(network::USER_GROUP_BATCH) {
            let params = vec![
                ("action".to_string(), "query".to_string()),
                ("list".to_string(), "users".to_string()),
                ("ususers".to_string(), batch.join("|")),
                ("usprop".to_string(), "groups".to_string()),
            ];
            let body = self.action_get(lang, &params).await?;
            let users = body
                .get("query")
                .and_then(|q| q.get("users"))
                .and_then(Value::as_array)
                .ok_or_else(|| WikiError::shape("no query.users array"))?;
            for user in users {
                let Some(name) = user.get("name").and_then(Value::as_str) else {
                    continue;
                };
                let user_groups = user
                    .get("groups")
                    .and_then(Value::as_array)
                    .map(|arr| {
                        arr.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                groups.insert(name.to_string(), user_groups);
            }
        }
        Ok(groups)
    }

    /// A user's own contribution history, newest first, bounded at `limit`
    /// entries. `before` maps to `ucstart` (the newer bound).
    pub async fn user_contribs(
        &self,
        lang: &str,
        user: &str,
        props: &str,
        limit: usize,
        before: Option<DateTime<Utc>>,
        main_namespace_only: bool,
    ) -> Result<Vec<UserContrib>> {
        let mut params = vec![
            ("action".to_string(), "query".to_string()),
            ("list".to_string(), "usercontribs".to_string()),
            ("ucuser".to_string(), user.to_string()),
            ("ucprop".to_string(), props.to_string()),
            ("uclimit".to_string(), limit.to_string()),
        ];
        if let Some(ts) = before {
            params.push(("ucstart".to_string(), format_timestamp(ts)));
        }
        if main_namespace_only {
            params.push(("ucnamespace".to_string(), "0".to_string()));
        }
        let body = self.action_get(lang, &params).await?;
        let contribs = body
            .get("query")
            .and_then(|q| q.get("usercontribs"))
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(UserContrib::from_json).collect())
            .unwrap_or_default();
        Ok(contribs)
    }

    /// Daily pageview counts over `[start, end]` from the Pageviews REST
    /// API. A 404 means the article has no view data in the window and
    /// yields an empty series.
    pub async fn daily_pageviews(
        &self,
        lang: &str,
        title: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyViews>> {
        let title_enc = urlencoding::encode(&title.replace(' ', "_")).into_owned();
        let url = format!(
            "{}/{}.wikipedia/all-access/user/{}/daily/{}/{}",
            self.pageviews_api,
            lang,
            title_enc,
            start.format("%Y%m%d"),
            end.format("%Y%m%d"),
        );
        let body = self
            .retry
            .run("pageviews", || async {
                let response = self.http.get(&url).send().await?;
                let status = response.status();
                if status.as_u16() == 404 {
                    return Ok(None);
                }
                if !status.is_success() {
                    return Err(WikiError::Status {
                        status: status.as_u16(),
                        url: url.clone(),
                    });
                }
                let body: Value = response.json().await.map_err(decode_error)?;
                Ok(Some(body))
            })
            .await?;
        let Some(body) = body else {
            return Ok(Vec::new());
        };

        let mut series: Vec<DailyViews> = body
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let raw = item.get("timestamp")?.as_str()?;
                        let date =
                            NaiveDate::parse_from_str(raw.get(..8)?, "%Y%m%d").ok()?;
                        let views = item.get("views")?.as_u64()?;
                        Some(DailyViews { date, views })
                    })
                    .collect()
            })
            .unwrap_or_default();
        series.sort_by_key(|d| d.date);
        Ok(series)
    }

    /// One Lift Wing prediction: POST `{rev_id, lang}`, extract the
    /// model-specific numeric output.
    pub async fn predict(&self, model: InferenceModel, rev_id: u64, lang: &str) -> Result<f64> {
        let url = format!("{}/{}:predict", self.liftwing_api, model.model_id());
        let payload = json!({ "rev_id": rev_id, "lang": lang });
        self.retry
            .run(model.model_id(), || async {
                let response = self
                    .http
                    .post(&url)
                    .timeout(self.inference_timeout)
                    .json(&payload)
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(WikiError::Status {
                        status: status.as_u16(),
                        url: url.clone(),
                    });
                }
                let body: Value = response.json().await.map_err(decode_error)?;
                model.extract(&body).ok_or_else(|| {
                    warn!(model = model.model_id(), rev_id, "no score in inference output");
                    WikiError::shape(format!("no score in {} output", model.model_id()))
                })
            })
            .await
    }
}

/// Body-decode failures are parse errors (one retry, then permanent);
/// everything else stays a transport error.
fn decode_error(err: reqwest::Error) -> WikiError {
    if err.is_decode() {
        WikiError::shape(err.to_string())
    } else {
        WikiError::Transport(err)
    }
}

/// First entry of `query.pages` (formatversion 2)
pub(crate) fn first_page(body: &Value) -> Option<&Value> {
    body.get("query")?.get("pages")?.as_array()?.first()
}

/// MediaWiki marks nonexistent pages with a `missing` member
pub(crate) fn page_missing(page: &Value) -> bool {
    page.get("missing").is_some()
}

/// ISO-8601 UTC as the Action API expects it
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    #[tokio::test]
    async fn test_action_get_retries_on_503() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fr/w/api.php"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fr/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"query": {}})))
            .mount(&server)
            .await;

        let client = testutil::stub_client(&server.uri());
        let body = client
            .action_get("fr", &[("action".to_string(), "query".to_string())])
            .await
            .unwrap();
        assert!(body.get("query").is_some());
    }

    #[tokio::test]
    async fn test_action_get_surfaces_api_error_block() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": { "code": "invalidtitle", "info": "Bad title." }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = testutil::stub_client(&server.uri());
        let err = client
            .action_get("en", &[("action".to_string(), "query".to_string())])
            .await
            .unwrap_err();
        match err {
            WikiError::Api { code, .. } => assert_eq!(code, "invalidtitle"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_latest_wikitext_missing_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fr/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [ { "title": "Nulle part", "missing": true } ] }
            })))
            .mount(&server)
            .await;

        let client = testutil::stub_client(&server.uri());
        let text = client.latest_wikitext("fr", "Nulle part").await.unwrap();
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_latest_wikitext_decodes_main_slot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fr/w/api.php"))
            .and(query_param("rvslots", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": [ {
                    "title": "Paris",
                    "revisions": [ { "slots": { "main": { "content": "'''Paris'''<ref>x</ref>" } } } ]
                } ] }
            })))
            .mount(&server)
            .await;

        let client = testutil::stub_client(&server.uri());
        let text = client.latest_wikitext("fr", "Paris").await.unwrap();
        assert_eq!(text.as_deref(), Some("'''Paris'''<ref>x</ref>"));
    }

    /// Echoes every requested username back with a `user` group
    struct EchoUserGroups;

    impl wiremock::Respond for EchoUserGroups {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let query = request.url.query().unwrap_or_default();
            let ususers = url::form_urlencoded::parse(query.as_bytes())
                .find(|(k, _)| k == "ususers")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();
            let users: Vec<Value> = ususers
                .split('|')
                .map(|name| json!({ "name": name, "groups": ["user"] }))
                .collect();
            ResponseTemplate::new(200).set_body_json(json!({ "query": { "users": users } }))
        }
    }

    #[tokio::test]
    async fn test_user_groups_batches_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/w/api.php"))
            .respond_with(EchoUserGroups)
            .expect(2)
            .mount(&server)
            .await;

        let usernames: Vec<String> = (0..60).map(|i| format!("User{i}")).collect();
        let client = testutil::stub_client(&server.uri());
        let groups = client.user_groups("en", &usernames).await.unwrap();
        assert_eq!(groups.len(), 60);
        assert_eq!(groups["User42"], vec!["user".to_string()]);
    }

    #[tokio::test]
    async fn test_daily_pageviews_parses_and_sorts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/pageviews/fr.wikipedia/all-access/user/Emmanuel_Macron/daily/20240101/20240103",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "timestamp": "2024010300", "views": 30 },
                    { "timestamp": "2024010100", "views": 10 },
                    { "timestamp": "2024010200", "views": 20 }
                ]
            })))
            .mount(&server)
            .await;

        let client = testutil::stub_client(&server.uri());
        let series = client
            .daily_pageviews(
                "fr",
                "Emmanuel Macron",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].views, 10);
        assert_eq!(series[2].views, 30);
    }

    #[tokio::test]
    async fn test_daily_pageviews_404_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = testutil::stub_client(&server.uri());
        let series = client
            .daily_pageviews(
                "fr",
                "Inconnue",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            )
            .await
            .unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_predict_revert_risk() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/liftwing/revertrisk-language-agnostic:predict"))
            .and(body_partial_json(json!({ "rev_id": 1234, "lang": "fr" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": { "probabilities": { "true": 0.83, "false": 0.17 } }
            })))
            .mount(&server)
            .await;

        let client = testutil::stub_client(&server.uri());
        let p = client
            .predict(InferenceModel::RevertRisk, 1234, "fr")
            .await
            .unwrap();
        assert!((p - 0.83).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_predict_reference_risk_score() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/liftwing/reference-risk:predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": { "score": 0.42 }
            })))
            .mount(&server)
            .await;

        let client = testutil::stub_client(&server.uri());
        let p = client
            .predict(InferenceModel::ReferenceRisk, 99, "en")
            .await
            .unwrap();
        assert!((p - 0.42).abs() < 1e-9);
    }

    #[test]
    fn test_format_timestamp() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc();
        assert_eq!(format_timestamp(ts), "2024-12-31T23:59:59Z");
    }
}
