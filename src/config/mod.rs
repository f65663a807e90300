//! Configuration
//!
//! Serde-backed configuration types and the Figment resolution chain.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AnalysisConfig, Config, ListsConfig, NetworkConfig};
