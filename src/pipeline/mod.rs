//! Orchestrator
//!
//! Runs one analysis: resolves the input list, groups pages by language
//! edition, splits each group into batches, and dispatches the Cartesian
//! (metric × language × batch) work set onto a bounded fan-out. Work items
//! write their `{title → score}` output into a concurrent accumulator
//! keyed by `(metric, unique_key)`; completion order never affects the
//! result.
//!
//! Failure semantics: a work item that errors or exceeds its deadline
//! zeroes only its own cells. Only an unusable date range aborts the
//! analysis, and even then every requested page keeps its row in the
//! error envelope.

pub mod report;
pub mod scorer;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::client::WikiClient;
use crate::config::Config;
use crate::constants::pipeline as tuning;
use crate::metrics::{
    all_collectors, CollectorContext, MetricCollector, MetricName, ReferenceLists,
};
use crate::types::{
    detect_language, resolve_pages, AnalysisReport, MetricMatrix, PageInfo, Result,
};

/// Fallback edition when neither the caller nor the inputs carry one
const FALLBACK_LANGUAGE: &str = "fr";

/// Per-analysis parameters
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
    pub default_language: String,
    pub batch_size: usize,
    pub max_workers: usize,
    pub exclude_privileged: bool,
}

impl AnalysisOptions {
    /// Resolve options from configuration and the input list: an explicit
    /// default language wins, then the majority language among URL inputs,
    /// then `fr`.
    pub fn resolve(
        config: &Config,
        inputs: &[String],
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Self {
        let default_language = config
            .analysis
            .default_language
            .clone()
            .or_else(|| detect_language(inputs))
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string());
        Self {
            start,
            end,
            default_language,
            batch_size: config.analysis.batch_size.max(1),
            max_workers: config.analysis.max_workers.max(1),
            exclude_privileged: config.analysis.exclude_privileged,
        }
    }
}

/// One (metric, language, batch) unit of parallelism
struct WorkItem {
    collector: Arc<dyn MetricCollector>,
    lang: String,
    titles: Vec<String>,
}

/// Scale the pool to the work set: many small items benefit from more
/// workers, few large ones would only pile onto the remote endpoints.
fn worker_ceiling(work_items: usize, base: usize) -> usize {
    let base = base.max(1);
    if work_items > tuning::HUGE_WORKSET {
        (base * 3).min(tuning::MAX_WORKERS_HUGE)
    } else if work_items > tuning::LARGE_WORKSET {
        (base * 2).min(tuning::MAX_WORKERS_LARGE)
    } else {
        base
    }
}

pub struct Pipeline {
    client: WikiClient,
    collectors: Vec<Arc<dyn MetricCollector>>,
    lists: Arc<ReferenceLists>,
}

impl Pipeline {
    /// Build a pipeline from configuration: HTTP client plus the reference
    /// lists, read once here and shared by every analysis.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_parts(
            WikiClient::new(&config.network)?,
            ReferenceLists::load(&config.lists)?,
        ))
    }

    /// Assemble from pre-built parts (custom endpoints, in-memory lists)
    pub fn with_parts(client: WikiClient, lists: ReferenceLists) -> Self {
        Self {
            client,
            collectors: all_collectors(),
            lists: Arc::new(lists),
        }
    }

    /// Run one full analysis over the raw input list.
    pub async fn analyze(&self, inputs: &[String], options: &AnalysisOptions) -> AnalysisReport {
        let started = Instant::now();
        let pages = resolve_pages(inputs, &options.default_language);

        if options.start > options.end {
            warn!(start = %options.start, end = %options.end, "unusable date range");
            return AnalysisReport::failure(
                &pages,
                format!(
                    "invalid date range: {} is after {}",
                    options.start, options.end
                ),
                options.batch_size,
            );
        }

        let (matrix, flagged_users) = self.collect_metrics(&pages, options).await;
        let scores = scorer::score(&matrix);
        let report = report::build(
            &pages,
            &matrix,
            &scores,
            &flagged_users,
            started.elapsed(),
            options.batch_size,
        );
        info!(
            pages = pages.len(),
            elapsed_secs = report.summary.processing_time_secs,
            "analysis complete"
        );
        report
    }

    /// Fan the work set out and materialize the dense metric matrix.
    async fn collect_metrics(
        &self,
        pages: &[PageInfo],
        options: &AnalysisOptions,
    ) -> (MetricMatrix, HashMap<String, Vec<String>>) {
        // language groups, batched
        let mut groups: BTreeMap<&str, Vec<&PageInfo>> = BTreeMap::new();
        for page in pages {
            groups.entry(&page.language).or_default().push(page);
        }

        let mut work: Vec<WorkItem> = Vec::new();
        for collector in &self.collectors {
            for (lang, group) in &groups {
                for chunk in group.chunks(options.batch_size) {
                    work.push(WorkItem {
                        collector: Arc::clone(collector),
                        lang: (*lang).to_string(),
                        titles: chunk.iter().map(|p| p.clean_title.clone()).collect(),
                    });
                }
            }
        }

        let workers = worker_ceiling(work.len(), options.max_workers);
        info!(
            work_items = work.len(),
            workers,
            languages = groups.len(),
            "dispatching collection"
        );

        // (clean_title, language) → unique_key
        let lookup: HashMap<(String, String), String> = pages
            .iter()
            .map(|p| {
                (
                    (p.clean_title.clone(), p.language.clone()),
                    p.unique_key.clone(),
                )
            })
            .collect();

        let ctx = CollectorContext {
            start: options.start,
            end: options.end,
            lists: Arc::clone(&self.lists),
            exclude_privileged: options.exclude_privileged,
        };

        // every metric gets a column even if all of its items time out
        let accumulator: DashMap<MetricName, HashMap<String, f64>> = DashMap::new();
        for collector in &self.collectors {
            accumulator.insert(collector.name(), HashMap::new());
        }
        let flagged: DashMap<String, Vec<String>> = DashMap::new();

        let deadline = Duration::from_secs(tuning::WORK_ITEM_DEADLINE_SECS);
        let client = &self.client;
        let ctx_ref = &ctx;
        let lookup_ref = &lookup;
        let accumulator_ref = &accumulator;
        let flagged_ref = &flagged;

        stream::iter(work)
            .map(|item| async move {
                let metric = item.collector.name();
                let outcome = tokio::time::timeout(
                    deadline,
                    item.collector
                        .collect(client, &item.titles, &item.lang, ctx_ref),
                )
                .await;
                match outcome {
                    Ok(output) => {
                        debug!(metric = %metric, lang = %item.lang, batch = item.titles.len(), "work item done");
                        for (title, score) in output.scores {
                            let key = (title, item.lang.clone());
                            if let Some(unique_key) = lookup_ref.get(&key) {
                                accumulator_ref
                                    .entry(metric)
                                    .or_default()
                                    .insert(unique_key.clone(), score * 100.0);
                            }
                        }
                        for (title, users) in output.flagged_users {
                            let key = (title, item.lang.clone());
                            if let Some(unique_key) = lookup_ref.get(&key) {
                                flagged_ref.entry(unique_key.clone()).or_default().extend(users);
                            }
                        }
                    }
                    Err(_) => {
                        warn!(
                            metric = %metric,
                            lang = %item.lang,
                            batch = item.titles.len(),
                            "work item exceeded deadline, cells zeroed"
                        );
                    }
                }
            })
            .buffer_unordered(workers)
            .collect::<Vec<()>>()
            .await;

        let keys: Vec<String> = pages.iter().map(|p| p.unique_key.clone()).collect();
        let matrix = MetricMatrix::materialize(keys, accumulator.into_iter());
        let flagged_users = flagged.into_iter().collect();
        (matrix, flagged_users)
    }
}
