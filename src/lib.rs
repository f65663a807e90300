//! WikiSense - Sensitivity Scoring for Wikipedia Articles
//!
//! Computes a per-article sensitivity score from ~16 independent public
//! signals (pageviews, revision history, protection, sourcing, talk-page
//! activity, contributor statistics, remote model inference, external
//! watchlists), normalized and aggregated into three weighted composites —
//! **Heat**, **Quality** and **Risk** — whose mean is the final
//! **Sensitivity**.
//!
//! ## Quick Start
//!
//! ```ignore
//! use wikisense::{AnalysisOptions, Config, Pipeline};
//!
//! let config = Config::default();
//! let pipeline = Pipeline::new(&config)?;
//! let options = AnalysisOptions::resolve(&config, &pages, start, end);
//! let report = pipeline.analyze(&pages, &options).await;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```
//!
//! ## Modules
//!
//! - [`client`]: MediaWiki Action API, Pageviews REST and Lift Wing access
//! - [`metrics`]: the 16 signal collectors and their reference data
//! - [`pipeline`]: orchestration, scoring, report assembly
//! - [`config`]: layered configuration (defaults → files → env)
//! - [`types`]: page resolution, revision records, result envelope

pub mod client;
pub mod config;
pub mod constants;
pub mod metrics;
pub mod pipeline;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::{Result, WikiError};

// Page resolution
pub use types::{detect_language, resolve, resolve_pages, PageInfo};

// Results
pub use types::{AnalysisReport, CompositeScores, MetricMatrix, PageReport, ScoringResult};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{AnalysisOptions, Pipeline};

// =============================================================================
// Client & Metrics Re-exports
// =============================================================================

pub use client::{InferenceModel, RetryPolicy, RevisionQuery, WikiClient};
pub use metrics::{Category, MetricCollector, MetricName, ReferenceLists};
