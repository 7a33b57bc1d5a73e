//! Cumulative flow: per-day snapshots of every item's state

use crate::analytics::tables::Tabular;
use crate::error::{FlowError, Result};
use crate::models::WorkItem;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Canonical workflow order used to stack states
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateOrder {
    states: Vec<String>,
}

impl StateOrder {
    pub fn new<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            states: states.into_iter().map(Into::into).collect(),
        }
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Sort key for a state; "not yet created" (`None`) sorts first.
    ///
    /// A state outside the ordering is a configuration problem and is
    /// reported by name.
    pub fn rank(&self, state: Option<&str>) -> Result<i64> {
        match state {
            None => Ok(-1),
            Some(state) => self
                .states
                .iter()
                .position(|s| s == state)
                .map(|p| p as i64)
                .ok_or_else(|| FlowError::missing_state(state)),
        }
    }
}

/// Day → item states sorted by canonical order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CumulativeFlow {
    states: Vec<String>,
    days: BTreeMap<NaiveDate, Vec<Option<String>>>,
}

impl CumulativeFlow {
    pub fn days(&self) -> &BTreeMap<NaiveDate, Vec<Option<String>>> {
        &self.days
    }

    pub fn day(&self, date: NaiveDate) -> Option<&[Option<String>]> {
        self.days.get(&date).map(Vec::as_slice)
    }

    /// Items per state per day, in canonical order, zeros included
    pub fn counts(&self) -> BTreeMap<NaiveDate, Vec<(String, u64)>> {
        self.days
            .iter()
            .map(|(day, snapshot)| {
                let counts = self
                    .states
                    .iter()
                    .map(|state| {
                        let count = snapshot
                            .iter()
                            .filter(|s| s.as_deref() == Some(state.as_str()))
                            .count() as u64;
                        (state.clone(), count)
                    })
                    .collect();
                (*day, counts)
            })
            .collect()
    }
}

impl Tabular for CumulativeFlow {
    fn header(&self) -> Vec<String> {
        std::iter::once("day".to_string())
            .chain(self.states.iter().cloned())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.counts()
            .into_iter()
            .map(|(day, counts)| {
                std::iter::once(day.to_string())
                    .chain(counts.into_iter().map(|(_, count)| count.to_string()))
                    .collect()
            })
            .collect()
    }
}

/// Snapshot every item's state on each day of `[from, to]`.
pub fn cumulative_flow(
    items: &[&WorkItem],
    from: NaiveDate,
    to: NaiveDate,
    order: &StateOrder,
) -> Result<CumulativeFlow> {
    let mut days = BTreeMap::new();
    let mut day = from;

    while day <= to {
        let mut ranked = items
            .iter()
            .map(|item| {
                let state = item.state_on(day);
                Ok((order.rank(state)?, state.map(str::to_string)))
            })
            .collect::<Result<Vec<_>>>()?;
        ranked.sort_by_key(|(rank, _)| *rank);

        days.insert(day, ranked.into_iter().map(|(_, state)| state).collect());
        day += Duration::days(1);
    }

    Ok(CumulativeFlow {
        states: order.states().to_vec(),
        days,
    })
}
