//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/wikisense/) and project (wikisense.toml)
//! level configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, network, pipeline};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Analysis defaults (language, batching, worker ceiling)
    pub analysis: AnalysisConfig,

    /// Upstream HTTP settings
    pub network: NetworkConfig,

    /// Reference-list locations
    pub lists: ListsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            analysis: AnalysisConfig::default(),
            network: NetworkConfig::default(),
            lists: ListsConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `WikiError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.analysis.batch_size == 0 {
            return Err(crate::types::WikiError::Config(
                "analysis.batch_size must be greater than 0".to_string(),
            ));
        }
        if self.analysis.max_workers == 0 {
            return Err(crate::types::WikiError::Config(
                "analysis.max_workers must be greater than 0".to_string(),
            ));
        }
        if self.network.request_timeout_secs == 0 {
            return Err(crate::types::WikiError::Config(
                "network.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !self.network.action_api.contains("{lang}") {
            return Err(crate::types::WikiError::Config(format!(
                "network.action_api must contain a {{lang}} placeholder, got '{}'",
                self.network.action_api
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Language attached to inputs that carry none; auto-detected from the
    /// URL inputs when absent, falling back to `fr`
    pub default_language: Option<String>,

    /// Pages per (metric, language) work-item batch
    pub batch_size: usize,

    /// Base worker-pool size; the orchestrator scales it with the work-set
    pub max_workers: usize,

    /// Exclude sysop/bureaucrat/rollbacker/bot editors from the page-level
    /// add/delete ratio
    pub exclude_privileged: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_language: None,
            batch_size: pipeline::DEFAULT_BATCH_SIZE,
            max_workers: pipeline::BASE_WORKERS,
            exclude_privileged: false,
        }
    }
}

// =============================================================================
// Network Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// User-Agent sent with every upstream request
    pub user_agent: String,

    /// Per-request timeout for the Action and Pageviews APIs (seconds)
    pub request_timeout_secs: u64,

    /// Per-request timeout for Lift Wing inference (seconds)
    pub inference_timeout_secs: u64,

    /// Retry attempts for transient failures
    pub max_retries: u32,

    /// MediaWiki Action API; `{lang}` is substituted with the edition code
    pub action_api: String,

    /// Pageviews REST root
    pub pageviews_api: String,

    /// Lift Wing inference root
    pub liftwing_api: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: network::USER_AGENT.to_string(),
            request_timeout_secs: network::REQUEST_TIMEOUT_SECS,
            inference_timeout_secs: network::INFERENCE_TIMEOUT_SECS,
            max_retries: network::MAX_RETRIES,
            action_api: endpoints::ACTION_API.to_string(),
            pageviews_api: endpoints::PAGEVIEWS_API.to_string(),
            liftwing_api: endpoints::LIFTWING_API.to_string(),
        }
    }
}

// =============================================================================
// Reference Lists
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListsConfig {
    /// Suspicious-domain blacklist: one domain per line, or CSV with a
    /// `domain` column
    pub blacklist: Option<PathBuf>,

    /// Sockpuppet watchlist: one username per line (first CSV column)
    pub sockpuppets: Option<PathBuf>,
}
