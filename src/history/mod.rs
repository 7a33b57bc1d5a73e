//! History reconstruction and cycle-time measurement.
//!
//! [`build_history`] expands a sorted transition list into a [`DailyHistory`];
//! [`cycle_time`] measures a [`crate::models::CycleDefinition`] over it.

mod builder;
mod cycle_time;

pub use builder::{build_history, DailyHistory, StateSpan};
pub use cycle_time::cycle_time;
