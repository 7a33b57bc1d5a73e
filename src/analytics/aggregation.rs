//! Metrics aggregation over a built batch of work items

use crate::analytics::arrivals::arrival_rate;
use crate::analytics::buckets::BucketEdge;
use crate::analytics::cfd::{cumulative_flow, CumulativeFlow};
use crate::analytics::demand::demand;
use crate::analytics::details::{DetailsTable, HistoryTable};
use crate::analytics::histogram::{collect_cycle_times, cycle_time_histogram, CycleTimeHistogram};
use crate::analytics::statistics::CycleTimeStatistics;
use crate::analytics::tables::WeeklyTable;
use crate::analytics::throughput::{throughput, ThroughputOptions};
use crate::config::FlowSettings;
use crate::error::{FlowError, Result};
use crate::models::{HistoryOptions, RawWorkItem, WorkItem};
use chrono::{Duration, Local, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if to < from {
            return Err(FlowError::InvalidDateRange(format!(
                "window ends {} before it starts {}",
                to, from
            )));
        }
        Ok(Self { from, to })
    }

    /// The `weeks` weeks up to and including `to`
    pub fn ending(to: NaiveDate, weeks: u32) -> Result<Self> {
        let from = to
            .checked_sub_signed(Duration::weeks(i64::from(weeks)))
            .ok_or_else(|| {
                FlowError::InvalidDateRange(format!("{} weeks before {} is out of range", weeks, to))
            })?;
        Self::new(from, to)
    }

    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

/// Owns one batch of work items and computes cross-item reports
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    items: Vec<WorkItem>,
    settings: FlowSettings,
}

impl MetricsAggregator {
    pub fn new(items: Vec<WorkItem>, settings: FlowSettings) -> Self {
        Self { items, settings }
    }

    /// Derive histories and cycles for every raw item in parallel.
    ///
    /// Histories run through `until`, or through today when it is `None`. An
    /// item that cannot be built, such as one created after `until`, is logged
    /// and left out; the rest of the batch is kept in input order.
    pub fn build(raw: Vec<RawWorkItem>, settings: FlowSettings, until: Option<NaiveDate>) -> Self {
        let options = HistoryOptions {
            until: Some(until.unwrap_or_else(|| Local::now().date_naive())),
            initial_state: settings.initial_state.clone(),
        };
        let total = raw.len();

        let items: Vec<WorkItem> = raw
            .into_par_iter()
            .filter_map(|raw| {
                let id = raw.id.clone();
                match WorkItem::build(raw, &settings.cycles, &options) {
                    Ok(item) => Some(item),
                    Err(e) => {
                        tracing::warn!(work_item = %id, error = %e, "Skipping work item");
                        None
                    }
                }
            })
            .collect();

        tracing::info!(
            built = items.len(),
            skipped = total - items.len(),
            "Built work item batch"
        );

        Self::new(items, settings)
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn work_item(&self, id: &str) -> Result<&WorkItem> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| FlowError::UnknownWorkItem(id.to_string()))
    }

    /// Items of any of `types`, or every item when `types` is `None`
    fn select(&self, types: Option<&[String]>) -> Result<Vec<&WorkItem>> {
        let Some(types) = types else {
            return Ok(self.items.iter().collect());
        };
        self.settings.groupings.check(types)?;

        let mut selected = Vec::new();
        for item in &self.items {
            if self
                .settings
                .groupings
                .first_match(types, &item.item_type)?
                .is_some()
            {
                selected.push(item);
            }
        }
        Ok(selected)
    }

    fn check_types(&self, types: Option<&[String]>) -> Result<()> {
        types.map_or(Ok(()), |types| self.settings.groupings.check(types))
    }

    pub fn details(&self, fields: Option<&[String]>) -> DetailsTable {
        let items: Vec<&WorkItem> = self.items.iter().collect();
        DetailsTable::build(&items, fields)
    }

    pub fn history(&self, window: ReportWindow, types: Option<&[String]>) -> Result<HistoryTable> {
        let items = self.select(types)?;
        Ok(HistoryTable::build(&items, window.from, window.to))
    }

    pub fn cfd(&self, window: ReportWindow, types: Option<&[String]>) -> Result<CumulativeFlow> {
        let items = self.select(types)?;
        let cfd = cumulative_flow(&items, window.from, window.to, &self.settings.state_order)?;
        tracing::info!(items = items.len(), days = window.days(), "Computed cumulative flow");
        Ok(cfd)
    }

    pub fn throughput(
        &self,
        window: ReportWindow,
        options: &ThroughputOptions,
    ) -> Result<WeeklyTable> {
        self.check_types(options.types.as_deref())?;
        let items: Vec<&WorkItem> = self.items.iter().collect();
        let table = throughput(
            &items,
            window.from,
            window.to,
            &self.settings.counting_states,
            &self.settings.groupings,
            options,
        )?;
        tracing::info!(
            weeks = table.len(),
            cumulative = options.cumulative,
            "Computed throughput"
        );
        Ok(table)
    }

    pub fn demand(&self, window: ReportWindow, types: Option<&[String]>) -> Result<WeeklyTable> {
        self.check_types(types)?;
        let items: Vec<&WorkItem> = self.items.iter().collect();
        let table = demand(
            &items,
            window.from,
            window.to,
            &self.settings.groupings,
            types,
        )?;
        tracing::info!(weeks = table.len(), "Computed demand");
        Ok(table)
    }

    pub fn arrival_rate(
        &self,
        window: ReportWindow,
        types: Option<&[String]>,
    ) -> Result<WeeklyTable> {
        let items = self.select(types)?;
        let table = arrival_rate(&items, window.from, window.to);
        tracing::info!(weeks = table.len(), "Computed arrival rate");
        Ok(table)
    }

    pub fn cycle_time_histogram(
        &self,
        cycle: &str,
        types: Option<&[String]>,
        edges: Option<&[BucketEdge]>,
    ) -> Result<CycleTimeHistogram> {
        self.check_cycle(cycle)?;
        self.check_types(types)?;
        let items: Vec<&WorkItem> = self.items.iter().collect();
        cycle_time_histogram(&items, cycle, &self.settings.groupings, types, edges)
    }

    /// Summary of every configured cycle; `None` where no item has finished it
    pub fn cycle_statistics(&self) -> BTreeMap<String, Option<CycleTimeStatistics>> {
        self.settings
            .cycles
            .keys()
            .map(|cycle| {
                let values: Vec<i64> = self.items.iter().filter_map(|i| i.cycle(cycle)).collect();
                (cycle.clone(), CycleTimeStatistics::from_values(&values))
            })
            .collect()
    }

    /// Per-grouping statistics for one cycle
    pub fn cycle_statistics_by_type(
        &self,
        cycle: &str,
        types: &[String],
    ) -> Result<BTreeMap<String, CycleTimeStatistics>> {
        self.check_cycle(cycle)?;
        self.settings.groupings.check(types)?;
        let items: Vec<&WorkItem> = self.items.iter().collect();

        Ok(
            collect_cycle_times(&items, cycle, &self.settings.groupings, Some(types))?
                .into_iter()
                .filter_map(|(name, values)| {
                    CycleTimeStatistics::from_values(&values).map(|stats| (name, stats))
                })
                .collect(),
        )
    }

    fn check_cycle(&self, cycle: &str) -> Result<()> {
        if self.settings.cycles.contains_key(cycle) {
            Ok(())
        } else {
            Err(FlowError::UnknownCycle(cycle.to_string()))
        }
    }
}
