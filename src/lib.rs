pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;

pub use crate::app::{build_aggregator, load_store, DefaultAggregator};
pub use crate::config::TriageConfig;
pub use crate::core::aggregator::TriageAggregator;
pub use crate::domain::model::{AggregateResult, ApiEnvelope, Coordinate, TriageRequest, TriageResponse};
pub use crate::utils::error::{Result, TriageError};
