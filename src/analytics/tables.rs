//! Tabular report shapes handed to the export layer

use crate::analytics::weeks::{fill_week_gaps, week_commencing};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Anything that renders as a header row plus data rows
pub trait Tabular {
    fn header(&self) -> Vec<String>;
    fn rows(&self) -> Vec<Vec<String>>;
}

/// Counts keyed by week commencing (rows) and swimlane or state (columns)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeeklyTable {
    columns: BTreeSet<String>,
    rows: BTreeMap<NaiveDate, BTreeMap<String, u64>>,
}

impl WeeklyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` to the cell for the week containing `date`
    pub fn add(&mut self, date: NaiveDate, column: &str, count: u64) {
        self.columns.insert(column.to_string());
        *self
            .rows
            .entry(week_commencing(date))
            .or_default()
            .entry(column.to_string())
            .or_insert(0) += count;
    }

    pub fn record(&mut self, date: NaiveDate, column: &str) {
        self.add(date, column, 1);
    }

    pub fn get(&self, week: NaiveDate, column: &str) -> u64 {
        self.rows
            .get(&week)
            .and_then(|row| row.get(column))
            .copied()
            .unwrap_or(0)
    }

    pub fn weeks(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_total(&self, column: &str) -> u64 {
        self.rows.values().filter_map(|row| row.get(column)).sum()
    }

    /// Every week between the first and last row present, every column
    /// explicit, missing cells zero
    pub fn gap_filled(&self) -> Self {
        let (Some(first), Some(last)) = (self.rows.keys().next(), self.rows.keys().next_back())
        else {
            return self.clone();
        };

        let rows = fill_week_gaps(*first, *last)
            .into_iter()
            .map(|week| {
                let row = self
                    .columns
                    .iter()
                    .map(|column| (column.clone(), self.get(week, column)))
                    .collect();
                (week, row)
            })
            .collect();

        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Running total per column, gap-filled first
    pub fn cumulative(&self) -> Self {
        let mut table = self.gap_filled();
        let mut totals: BTreeMap<String, u64> = BTreeMap::new();
        for row in table.rows.values_mut() {
            for (column, value) in row.iter_mut() {
                let total = totals.entry(column.clone()).or_insert(0);
                *total += *value;
                *value = *total;
            }
        }
        table
    }

    /// Per-week counts back-computed from a cumulative table by successive
    /// subtraction
    pub fn de_cumulative(&self) -> Self {
        let mut table = self.gap_filled();
        let mut previous: BTreeMap<String, u64> = BTreeMap::new();
        for row in table.rows.values_mut() {
            for (column, value) in row.iter_mut() {
                let running = *value;
                let before = previous.insert(column.clone(), running).unwrap_or(0);
                *value = running.saturating_sub(before);
            }
        }
        table
    }
}

impl Tabular for WeeklyTable {
    fn header(&self) -> Vec<String> {
        std::iter::once("week".to_string())
            .chain(self.columns.iter().cloned())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|(week, row)| {
                std::iter::once(week.to_string())
                    .chain(
                        self.columns
                            .iter()
                            .map(|c| row.get(c).copied().unwrap_or(0).to_string()),
                    )
                    .collect()
            })
            .collect()
    }
}
