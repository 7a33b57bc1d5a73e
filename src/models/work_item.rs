use crate::error::Result;
use crate::history::{build_history, cycle_time, DailyHistory};
use crate::models::cycle::CycleSet;
use crate::models::transition::{repair_gaps, sort_transitions, StateTransition};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Normalized work item as produced by a source adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWorkItem {
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,

    /// Current state as reported by the tracker
    pub state: String,

    #[serde(rename = "type")]
    pub item_type: String,

    /// Swimlane/project grouping the item was fetched under
    pub category: String,

    pub date_created: DateTime<FixedOffset>,

    /// May arrive unsorted; sorted before use
    #[serde(default)]
    pub state_transitions: Vec<StateTransition>,
}

/// How daily histories are reconstructed for a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Last day of every history; `None` ends each on its last transition
    pub until: Option<NaiveDate>,

    /// State assumed before the first transition when its `from` is unknown
    pub initial_state: String,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            until: None,
            initial_state: "Open".to_string(),
        }
    }
}

impl HistoryOptions {
    pub fn until(until: NaiveDate) -> Self {
        Self {
            until: Some(until),
            ..Self::default()
        }
    }
}

/// Flattened scalar view of a work item, one entry per cycle
pub type WorkItemDetail = serde_json::Map<String, Value>;

/// Fixed detail columns, in display order
pub const DETAIL_FIELDS: [&str; 5] = ["id", "title", "state", "type", "date_created"];

/// A work item with its derived daily history and cycle times.
///
/// Derived fields are computed once in [`WorkItem::build`] and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    pub id: String,
    pub title: Option<String>,
    pub state: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub category: String,
    pub date_created: DateTime<FixedOffset>,
    pub state_transitions: Vec<StateTransition>,
    history: DailyHistory,
    cycles: BTreeMap<String, Option<i64>>,
}

impl WorkItem {
    /// Sort and repair transitions, rebuild the daily history and measure
    /// every configured cycle.
    pub fn build(raw: RawWorkItem, cycles: &CycleSet, options: &HistoryOptions) -> Result<Self> {
        let RawWorkItem {
            id,
            title,
            state,
            item_type,
            category,
            date_created,
            mut state_transitions,
        } = raw;

        sort_transitions(&mut state_transitions);
        let state_transitions = repair_gaps(&state_transitions);

        let created = date_created.date_naive();

        let initial_state = if state_transitions.is_empty() && !state.is_empty() {
            state.as_str()
        } else {
            options.initial_state.as_str()
        };

        let history = build_history(created, &state_transitions, options.until, initial_state)?;

        let cycles = cycles
            .iter()
            .map(|(name, definition)| (name.clone(), cycle_time(&history, definition)))
            .collect();

        tracing::debug!(
            work_item = %id,
            days = history.len(),
            transitions = state_transitions.len(),
            "Built work item history"
        );

        Ok(Self {
            id,
            title,
            state,
            item_type,
            category,
            date_created,
            state_transitions,
            history,
            cycles,
        })
    }

    pub fn created_date(&self) -> NaiveDate {
        self.date_created.date_naive()
    }

    pub fn history(&self) -> &DailyHistory {
        &self.history
    }

    pub fn cycles(&self) -> &BTreeMap<String, Option<i64>> {
        &self.cycles
    }

    /// Measured value of `cycle`; `None` if unfinished or not configured
    pub fn cycle(&self, cycle: &str) -> Option<i64> {
        self.cycles.get(cycle).copied().flatten()
    }

    pub fn state_on(&self, date: NaiveDate) -> Option<&str> {
        self.history.state_on(date)
    }

    /// State on `date`, carrying the final state past the end of the history
    pub fn state_as_of(&self, date: NaiveDate) -> Option<&str> {
        if date < self.history.start_date() {
            return None;
        }
        self.history
            .state_on(date)
            .or_else(|| self.history.final_state())
    }

    pub fn detail(&self) -> WorkItemDetail {
        let mut detail = WorkItemDetail::new();
        detail.insert("id".into(), Value::from(self.id.clone()));
        detail.insert(
            "title".into(),
            self.title.clone().map(Value::from).unwrap_or(Value::Null),
        );
        detail.insert("state".into(), Value::from(self.state.clone()));
        detail.insert("type".into(), Value::from(self.item_type.clone()));
        detail.insert(
            "date_created".into(),
            Value::from(self.date_created.to_rfc3339()),
        );
        for (name, value) in &self.cycles {
            detail.insert(name.clone(), value.map(Value::from).unwrap_or(Value::Null));
        }
        detail
    }

    /// Source shape for writing back to a local cache
    pub fn to_raw(&self) -> RawWorkItem {
        RawWorkItem {
            id: self.id.clone(),
            title: self.title.clone(),
            state: self.state.clone(),
            item_type: self.item_type.clone(),
            category: self.category.clone(),
            date_created: self.date_created,
            state_transitions: self.state_transitions.clone(),
        }
    }
}
