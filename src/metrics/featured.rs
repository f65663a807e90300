//! Featured Article
//!
//! Quality-deficit read off the assessment banner on the article's Talk
//! page: 0.0 for a featured article, rising to 1.0 for a stub. Unrated
//! pages score 0.0 — absence of a banner says nothing about quality.
//!
//! French-family wikis rate through `{{Wikiprojet|avancement=...}}`,
//! English through `{{WikiProject ...|class=...}}`.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::time::sleep;
use tracing::warn;

use super::{tables, CollectorContext, CollectorOutput, MetricCollector, MetricName};
use crate::client::WikiClient;
use crate::constants::network;
use crate::types::Result;

static EN_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\|\s*class\s*=\s*([^\s|}]+)").expect("valid regex"));

static FR_AVANCEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)avancement\s*=\s*([^|}]+)").expect("valid regex"));

pub(crate) struct FeaturedArticle;

/// Grade string from the talk wikicode, per-edition syntax
fn extract_grade<'a>(wikicode: &'a str, lang: &str) -> Option<&'a str> {
    let re = if lang == "en" { &EN_CLASS } else { &FR_AVANCEMENT };
    re.captures(wikicode)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

fn assessment_score(wikicode: &str, lang: &str) -> f64 {
    extract_grade(wikicode, lang)
        .and_then(|grade| tables::grade_score(lang, grade))
        .unwrap_or(0.0)
}

impl FeaturedArticle {
    async fn page_score(&self, client: &WikiClient, title: &str, lang: &str) -> Result<f64> {
        let talk = tables::talk_title(lang, title);
        let wikicode = client
            .latest_wikitext(lang, &talk)
            .await?
            .unwrap_or_default();
        Ok(assessment_score(&wikicode, lang))
    }
}

#[async_trait]
impl MetricCollector for FeaturedArticle {
    fn name(&self) -> MetricName {
        MetricName::FeaturedArticle
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
            sleep(Duration::from_millis(network::CONTRIBUTOR_DELAY_MS)).await;
        }
        CollectorOutput::from_scores(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_french_featured_scores_zero() {
        let wikicode = "{{Wikiprojet|Communes de France|avancement=ADQ|importance=maximum}}";
        assert_eq!(assessment_score(wikicode, "fr"), 0.0);
    }

    #[test]
    fn test_french_spelled_out_grade() {
        let wikicode = "{{Wikiprojet|avancement=Bon début|importance=faible}}";
        assert!((assessment_score(wikicode, "fr") - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_french_stub() {
        let wikicode = "{{Wikiprojet|avancement=ébauche}}";
        assert_eq!(assessment_score(wikicode, "fr"), 1.0);
    }

    #[test]
    fn test_english_class_syntax() {
        let wikicode = "{{WikiProject Germany|class=GA|importance=top}}";
        assert!((assessment_score(wikicode, "en") - 0.3).abs() < 1e-9);
        let stub = "{{WikiProject Cities |class=Stub }}";
        assert_eq!(assessment_score(stub, "en"), 1.0);
    }

    #[test]
    fn test_unrated_scores_zero() {
        assert_eq!(assessment_score("Just chatter, no banner.", "en"), 0.0);
        assert_eq!(assessment_score("", "fr"), 0.0);
    }

    #[test]
    fn test_unknown_grade_scores_zero() {
        let wikicode = "{{WikiProject X|class=Whatever}}";
        assert_eq!(assessment_score(wikicode, "en"), 0.0);
    }
}
