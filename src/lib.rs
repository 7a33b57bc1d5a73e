//! Lean flow metrics
//!
//! Rebuilds day-by-day state histories for work items from their sparse
//! state transitions, measures configured cycle times, and folds batches of
//! items into weekly throughput, demand, arrival-rate, cumulative-flow and
//! cycle-time reports.
//!
//! The pipeline is: a [`sources::WorkItemSource`] yields raw items,
//! [`analytics::MetricsAggregator::build`] derives each item's history and
//! cycles once, and the aggregator's report methods produce tables that
//! [`analytics::ReportExporter`] writes out as JSON or CSV.

pub mod analytics;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod sources;

pub use error::{FlowError, Result};
