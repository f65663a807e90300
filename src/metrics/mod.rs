//! Metric Collectors
//!
//! The 16 signal extractors behind the sensitivity score. Every collector
//! implements [`MetricCollector`]: given a batch of clean titles and a
//! language edition, it returns `{title → score ∈ [0, 1]}`.
//!
//! Collectors never let an error escape the work-item boundary — a page
//! whose collection fails scores 0.0 and the failure is logged. The ×100
//! presentation scaling happens in the orchestrator, not here.

pub mod lists;
pub mod reference_risk;
pub mod tables;
pub mod wikitext;

mod anonymity;
mod citation_gaps;
mod concentration;
mod contributor_balance;
mod discussion;
mod edit_spikes;
mod featured;
mod page_balance;
mod pageview_spikes;
mod protection;
mod revert_risk;
mod sockpuppets;
mod source_concentration;
mod sporadicity;
mod staleness;
mod suspicious_sources;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

pub use lists::ReferenceLists;

use crate::client::WikiClient;

/// The three composite categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Heat,
    Quality,
    Risk,
}

/// One of the 16 signals; the display label doubles as the metric-matrix
/// column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    ViewsSpikes,
    EditsSpikes,
    RevertRisk,
    Protection,
    DiscussionIntensity,
    SuspiciousSources,
    FeaturedArticle,
    CitationGaps,
    Staleness,
    SourceConcentration,
    AddDeleteRatio,
    Sockpuppets,
    Anonymity,
    ContributorsConcentration,
    Sporadicity,
    ContributorAddDeleteRatio,
}

impl MetricName {
    pub const ALL: [MetricName; 16] = [
        Self::ViewsSpikes,
        Self::EditsSpikes,
        Self::RevertRisk,
        Self::Protection,
        Self::DiscussionIntensity,
        Self::SuspiciousSources,
        Self::FeaturedArticle,
        Self::CitationGaps,
        Self::Staleness,
        Self::SourceConcentration,
        Self::AddDeleteRatio,
        Self::Sockpuppets,
        Self::Anonymity,
        Self::ContributorsConcentration,
        Self::Sporadicity,
        Self::ContributorAddDeleteRatio,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ViewsSpikes => "Views spikes",
            Self::EditsSpikes => "Edits spikes",
            Self::RevertRisk => "Revert risk",
            Self::Protection => "Protection",
            Self::DiscussionIntensity => "Discussion intensity",
            Self::SuspiciousSources => "Suspicious sources",
            Self::FeaturedArticle => "Featured article",
            Self::CitationGaps => "Citation gaps",
            Self::Staleness => "Staleness",
            Self::SourceConcentration => "Source concentration",
            Self::AddDeleteRatio => "Add/delete ratio",
            Self::Sockpuppets => "Sockpuppets",
            Self::Anonymity => "Anonymity",
            Self::ContributorsConcentration => "Contributors concentration",
            Self::Sporadicity => "Sporadicity",
            Self::ContributorAddDeleteRatio => "Contributor add/delete ratio",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::ViewsSpikes
            | Self::EditsSpikes
            | Self::RevertRisk
            | Self::Protection
            | Self::DiscussionIntensity => Category::Heat,
            Self::SuspiciousSources
            | Self::FeaturedArticle
            | Self::CitationGaps
            | Self::Staleness
            | Self::SourceConcentration
            | Self::AddDeleteRatio => Category::Quality,
            Self::Sockpuppets
            | Self::Anonymity
            | Self::ContributorsConcentration
            | Self::Sporadicity
            | Self::ContributorAddDeleteRatio => Category::Risk,
        }
    }

    /// Fixed composite weight
    pub fn weight(&self) -> f64 {
        match self {
            Self::ViewsSpikes => 5.0,
            Self::EditsSpikes => 4.0,
            Self::RevertRisk => 3.0,
            Self::Protection => 2.0,
            Self::DiscussionIntensity => 1.0,
            Self::SuspiciousSources => 10.0,
            Self::FeaturedArticle => 10.0,
            Self::CitationGaps => 3.0,
            Self::Staleness => 2.0,
            Self::SourceConcentration => 2.0,
            Self::AddDeleteRatio => 1.0,
            Self::Sockpuppets => 10.0,
            Self::Anonymity => 5.0,
            Self::ContributorsConcentration => 3.0,
            Self::Sporadicity => 2.0,
            Self::ContributorAddDeleteRatio => 1.0,
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shared inputs every collector receives alongside its batch
#[derive(Debug, Clone)]
pub struct CollectorContext {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub lists: Arc<ReferenceLists>,
    /// Exclude sysop/bureaucrat/rollbacker/bot editors from the page-level
    /// add/delete ratio
    pub exclude_privileged: bool,
}

/// Best-effort result of one work item
#[derive(Debug, Default)]
pub struct CollectorOutput {
    /// `{clean_title → score ∈ [0, 1]}`; failed pages carry 0.0
    pub scores: HashMap<String, f64>,
    /// Side channel: users from the watchlist that authored revisions of a
    /// page (Sockpuppets only)
    pub flagged_users: HashMap<String, Vec<String>>,
}

impl CollectorOutput {
    pub fn from_scores(scores: HashMap<String, f64>) -> Self {
        Self {
            scores,
            flagged_users: HashMap::new(),
        }
    }
}

/// A signal extractor: one per metric, stateless, shared across work items
#[async_trait]
pub trait MetricCollector: Send + Sync {
    fn name(&self) -> MetricName;

    /// Score a batch of pages of one language edition. Must not fail:
    /// errors are absorbed into 0.0 scores.
    async fn collect(
        &self,
        client: &WikiClient,
        titles: &[String],
        lang: &str,
        ctx: &CollectorContext,
    ) -> CollectorOutput;
}

/// The full collector set, in weight-table order
pub fn all_collectors() -> Vec<Arc<dyn MetricCollector>> {
    vec![
        Arc::new(pageview_spikes::PageviewSpikes),
        Arc::new(edit_spikes::EditSpikes),
        Arc::new(revert_risk::RevertRisk),
        Arc::new(protection::Protection),
        Arc::new(discussion::DiscussionIntensity),
        Arc::new(suspicious_sources::SuspiciousSources),
        Arc::new(featured::FeaturedArticle),
        Arc::new(citation_gaps::CitationGaps),
        Arc::new(staleness::Staleness),
        Arc::new(source_concentration::SourceConcentration),
        Arc::new(page_balance::AddDeleteRatio),
        Arc::new(sockpuppets::Sockpuppets),
        Arc::new(anonymity::Anonymity),
        Arc::new(concentration::ContributorsConcentration),
        Arc::new(sporadicity::Sporadicity),
        Arc::new(contributor_balance::ContributorAddDeleteRatio),
    ]
}

// =============================================================================
// Shared arithmetic
// =============================================================================

/// Median of a count series (mean of the middle pair for even lengths)
pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite counts"));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Spike statistic of a daily count series: `(max − median) / (median + 1)`
pub(crate) fn spike(values: &[f64]) -> f64 {
    let Some(max) = values
        .iter()
        .copied()
        .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |m| m.max(v))))
    else {
        return 0.0;
    };
    let med = median(values);
    (max - med) / (med + 1.0)
}

/// Arithmetic mean; 0.0 for an empty slice
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// The last `limit` distinct contributors of a page at or before `end`,
/// newest first. Scans up to 3× `limit` revisions so repeat editors do not
/// starve the sample; optionally skips bare-IP authors.
pub(crate) async fn recent_contributors(
    client: &WikiClient,
    lang: &str,
    title: &str,
    end: NaiveDate,
    limit: usize,
    skip_ips: bool,
) -> crate::types::Result<Vec<String>> {
    let query = crate::client::RevisionQuery::before(end, (limit * 3).min(500))
        .with_props("ids|timestamp|user");
    let revisions = client.revisions(lang, title, &query).await?;

    let mut seen = std::collections::HashSet::new();
    let mut contributors = Vec::with_capacity(limit);
    for rev in &revisions {
        let Some(user) = rev.user.as_deref() else {
            continue;
        };
        if skip_ips && wikitext::is_ip_address(user) {
            continue;
        }
        if seen.insert(user.to_string()) {
            contributors.push(user.to_string());
        }
        if contributors.len() >= limit {
            break;
        }
    }
    Ok(contributors)
}
