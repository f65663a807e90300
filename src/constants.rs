//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Normalization references and sampling depths for the metric collectors
pub mod scoring {
    /// A pageview spike of this magnitude maps to a score of 1.0
    pub const VIEWS_SPIKE_REFERENCE: f64 = 37.2002;

    /// An edit spike of this magnitude maps to a score of 1.0
    pub const EDITS_SPIKE_REFERENCE: f64 = 22.0;

    /// Score contributed by each talk-page revision inside the window
    pub const DISCUSSION_STEP: f64 = 0.1;

    /// Score contributed by each "citation needed" template
    pub const CITATION_STEP: f64 = 0.1;

    /// Score contributed by each anonymous or temporary-account revision
    pub const ANONYMITY_STEP: f64 = 0.1;

    /// Revision depth used by Staleness (age of the Nth revision)
    pub const STALENESS_DEPTH: usize = 10;

    /// Days after which Staleness and Sporadicity saturate at 1.0
    pub const ACTIVITY_WINDOW_DAYS: f64 = 365.0;

    /// Revisions inspected by the page-level add/delete ratio
    pub const BALANCE_REVISIONS: usize = 10;

    /// Recent contributors sampled by the contributor-pattern metrics
    pub const CONTRIBUTORS_SAMPLE: usize = 10;

    /// Contributions fetched per contributor
    pub const CONTRIBUTIONS_SAMPLE: usize = 100;

    /// Revisions scanned for sockpuppet authors
    pub const SOCKPUPPET_REVISION_DEPTH: usize = 500;
}

/// Orchestrator tuning
pub mod pipeline {
    /// Default number of pages per work-item batch
    pub const DEFAULT_BATCH_SIZE: usize = 20;

    /// Base worker-pool size
    pub const BASE_WORKERS: usize = 16;

    /// Work-set size above which the pool doubles
    pub const LARGE_WORKSET: usize = 50;

    /// Work-set size above which the pool triples
    pub const HUGE_WORKSET: usize = 100;

    /// Pool ceiling when the work set is large
    pub const MAX_WORKERS_LARGE: usize = 32;

    /// Pool ceiling when the work set is huge
    pub const MAX_WORKERS_HUGE: usize = 48;

    /// Hard deadline for a single (metric, language, batch) work item (seconds)
    pub const WORK_ITEM_DEADLINE_SECS: u64 = 120;
}

/// HTTP/Network constants
pub mod network {
    /// Identification sent with every upstream request
    pub const USER_AGENT: &str =
        "wikisense/0.1 (https://github.com/opsci-collective/wikisense; analysis@opsci.ai)";

    /// Default per-request timeout (seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 20;

    /// Timeout for Lift Wing inference calls (seconds)
    pub const INFERENCE_TIMEOUT_SECS: u64 = 10;

    /// Maximum retry attempts for a transient failure
    pub const MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Delay between continuation requests of one paginated listing (milliseconds)
    pub const PAGINATION_DELAY_MS: u64 = 100;

    /// Delay between consecutive single-page lookups inside a collector (milliseconds)
    pub const PAGE_DELAY_MS: u64 = 300;

    /// Delay between per-contributor lookups (milliseconds)
    pub const CONTRIBUTOR_DELAY_MS: u64 = 100;

    /// Delay between Lift Wing prediction calls (milliseconds)
    pub const INFERENCE_DELAY_MS: u64 = 200;

    /// Usernames per `list=users` batch
    pub const USER_GROUP_BATCH: usize = 50;
}

/// Default upstream endpoints; `{lang}` is substituted with the wiki edition
pub mod endpoints {
    /// MediaWiki Action API
    pub const ACTION_API: &str = "https://{lang}.wikipedia.org/w/api.php";

    /// Wikimedia Pageviews REST API (per-article daily counts)
    pub const PAGEVIEWS_API: &str =
        "https://wikimedia.org/api/rest_v1/metrics/pageviews/per-article";

    /// Lift Wing model inference root
    pub const LIFTWING_API: &str = "https://api.wikimedia.org/service/lw/inference/v1/models";
}
