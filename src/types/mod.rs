//! Core Data Types
//!
//! Page resolution, revision records, the metric matrix and the report
//! envelope, plus the crate-wide error type.

pub mod error;
pub mod page;
pub mod result;
pub mod revision;

pub use error::{Result, WikiError, TRANSIENT_STATUS};
pub use page::{detect_language, resolve, resolve_pages, PageInfo};
pub use result::{
    AnalysisReport, CompositeScores, MetricMatrix, PageReport, ScoreSeries, ScoringResult, Summary,
};
pub use revision::{ProtectionEntry, Revision, UserContrib};
