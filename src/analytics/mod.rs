//! Flow metrics over batches of work items
//!
//! Every report reads finished per-item histories and cycle times and folds
//! them into a table handed to the export layer.
//!
//! # Reports
//!
//! - **Cumulative flow**: each item's state on each day, stacked in canonical order
//! - **Throughput**: items newly done per week, incremental or cumulative
//! - **Demand**: items created per week
//! - **Arrival rate**: transitions into each state per week
//! - **Cycle time**: histograms and summary statistics per cycle
//! - **Details / history**: per-item views for ad hoc analysis
//!
//! # Example
//!
//! ```no_run
//! use lean_flow_metrics::analytics::{MetricsAggregator, ReportWindow, ThroughputOptions};
//! use lean_flow_metrics::config::MetricsConfig;
//! use lean_flow_metrics::sources;
//! use chrono::NaiveDate;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MetricsConfig::load("flow.toml")?;
//!     let raw = sources::open(config.source()?)?.work_items()?;
//!
//!     let to = NaiveDate::from_ymd_opt(2012, 11, 30).unwrap();
//!     let aggregator = MetricsAggregator::build(raw, config.settings()?, Some(to));
//!
//!     let window = ReportWindow::ending(to, 6)?;
//!     let table = aggregator.throughput(window, &ThroughputOptions::cumulative())?;
//!     println!("{} weeks of throughput", table.len());
//!
//!     Ok(())
//! }
//! ```

mod aggregation;
mod arrivals;
mod buckets;
mod cfd;
mod demand;
mod details;
mod export;
mod histogram;
mod reports;
mod statistics;
mod tables;
mod throughput;
mod weeks;

pub use aggregation::{MetricsAggregator, ReportWindow};
pub use arrivals::{arrival_rate, arrivals};
pub use buckets::{auto_edges, bucket_counts, bucket_labels, resolve_edges, BucketEdge};
pub use cfd::{cumulative_flow, CumulativeFlow, StateOrder};
pub use demand::demand;
pub use details::{DetailsTable, HistoryTable};
pub use export::{ExportFormat, ReportExporter};
pub use histogram::{collect_cycle_times, cycle_time_histogram, CycleTimeHistogram, HistogramSeries};
pub use reports::{
    run_report, ReportMetric, ReportOutput, ReportSpec, ReportTable, TypesKeyword, TypesSelector,
};
pub use statistics::CycleTimeStatistics;
pub use tables::{Tabular, WeeklyTable};
pub use throughput::{completion_date, throughput, ThroughputOptions};
pub use weeks::{fill_week_gaps, reindex_weekly, week_commencing, week_start_date};
