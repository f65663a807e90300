//! Paginated Revision Listing
//!
//! The shared primitive behind every collector that walks page history:
//! one query description, `continue`/`rvcontinue` handled transparently,
//! an optional hard cap on the number of revisions returned.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tokio::time::sleep;
use tracing::debug;

use super::{first_page, format_timestamp, page_missing, WikiClient};
use crate::constants::network;
use crate::types::{Result, Revision};

/// Revision listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevisionDirection {
    /// Newest first (`rvdir=older`)
    #[default]
    Older,
    /// Oldest first (`rvdir=newer`)
    Newer,
}

impl RevisionDirection {
    fn as_param(&self) -> &'static str {
        match self {
            Self::Older => "older",
            Self::Newer => "newer",
        }
    }
}

/// Declarative description of a revision listing
#[derive(Debug, Clone)]
pub struct RevisionQuery {
    /// Newer bound (`rvstart` when listing older-first)
    pub newest: Option<DateTime<Utc>>,
    /// Older bound (`rvend` when listing older-first)
    pub oldest: Option<DateTime<Utc>>,
    /// `rvprop` set
    pub props: &'static str,
    pub direction: RevisionDirection,
    /// Hard cap on the total number of revisions returned
    pub cap: Option<usize>,
    /// Per-request `rvlimit`; `None` requests `max`
    pub per_request: Option<usize>,
}

impl Default for RevisionQuery {
    fn default() -> Self {
        Self {
            newest: None,
            oldest: None,
            props: "ids|timestamp|user|flags|comment|size",
            direction: RevisionDirection::Older,
            cap: None,
            per_request: None,
        }
    }
}

impl RevisionQuery {
    /// Every revision inside `[start, end]`, newest first
    pub fn window(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            newest: Some(day_end(end)),
            oldest: Some(day_start(start)),
            ..Self::default()
        }
    }

    /// The latest `n` revisions
    pub fn latest(n: usize) -> Self {
        Self {
            cap: Some(n),
            per_request: Some(n.min(500)),
            ..Self::default()
        }
    }

    /// The latest `n` revisions at or before `end`
    pub fn before(end: NaiveDate, n: usize) -> Self {
        Self {
            newest: Some(day_end(end)),
            ..Self::latest(n)
        }
    }

    pub fn with_props(mut self, props: &'static str) -> Self {
        self.props = props;
        self
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = Some(cap);
        self
    }
}

impl WikiClient {
    /// List revisions of `title` according to `query`, following
    /// continuation tokens until the listing or the cap is exhausted.
    /// A missing page yields an empty list.
    pub async fn revisions(
        &self,
        lang: &str,
        title: &str,
        query: &RevisionQuery,
    ) -> Result<Vec<Revision>> {
        let mut params = vec![
            ("action".to_string(), "query".to_string()),
            ("prop".to_string(), "revisions".to_string()),
            ("titles".to_string(), title.to_string()),
            ("rvprop".to_string(), query.props.to_string()),
            ("rvdir".to_string(), query.direction.as_param().to_string()),
            (
                "rvlimit".to_string(),
                query
                    .per_request
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "max".to_string()),
            ),
        ];
        if let Some(newest) = query.newest {
            let key = match query.direction {
                RevisionDirection::Older => "rvstart",
                RevisionDirection::Newer => "rvend",
            };
            params.push((key.to_string(), format_timestamp(newest)));
        }
        if let Some(oldest) = query.oldest {
            let key = match query.direction {
                RevisionDirection::Older => "rvend",
                RevisionDirection::Newer => "rvstart",
            };
            params.push((key.to_string(), format_timestamp(oldest)));
        }

        let mut revisions: Vec<Revision> = Vec::new();
        let mut continuation: Vec<(String, String)> = Vec::new();

        loop {
            let mut request = params.clone();
            request.extend(continuation.iter().cloned());

            let body = self.action_get(lang, &request).await?;

            let Some(page) = first_page(&body) else {
                break;
            };
            if page_missing(page) {
                debug!(lang, title, "page not found while listing revisions");
                return Ok(Vec::new());
            }
            if let Some(revs) = page.get("revisions").and_then(Value::as_array) {
                revisions.extend(revs.iter().map(Revision::from_json));
            }

            if let Some(cap) = query.cap {
                if revisions.len() >= cap {
                    revisions.truncate(cap);
                    break;
                }
            }

            match body.get("continue").and_then(Value::as_object) {
                Some(cont) => {
                    // tokens are usually strings, occasionally numbers
                    continuation = cont
                        .iter()
                        .map(|(k, v)| {
                            let token = v
                                .as_str()
                                .map(str::to_string)
                                .unwrap_or_else(|| v.to_string());
                            (k.clone(), token)
                        })
                        .collect();
                    sleep(std::time::Duration::from_millis(
                        network::PAGINATION_DELAY_MS,
                    ))
                    .await;
                }
                None => break,
            }
        }

        Ok(revisions)
    }
}

/// 00:00:00 UTC of the given day
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc()
}

/// 23:59:59 UTC of the given day
pub fn day_end(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(23, 59, 59)
        .expect("end of day exists")
        .and_utc()
}
