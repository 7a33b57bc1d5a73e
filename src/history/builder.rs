//! Dense day-by-day state series reconstructed from sparse transitions

use crate::error::{FlowError, Result};
use crate::models::StateTransition;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One state per calendar day, contiguous from `start_date` to `end_date`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HistoryRecord")]
pub struct DailyHistory {
    start: NaiveDate,
    states: Vec<String>,
}

#[derive(Deserialize)]
struct HistoryRecord {
    start: NaiveDate,
    states: Vec<String>,
}

impl TryFrom<HistoryRecord> for DailyHistory {
    type Error = FlowError;

    fn try_from(record: HistoryRecord) -> Result<Self> {
        Self::from_states(record.start, record.states)
    }
}

/// Consecutive days spent in one state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSpan {
    pub state: String,
    pub start: NaiveDate,
    pub days: i64,
}

impl DailyHistory {
    /// Series from explicit per-day states; `states` must not be empty
    pub fn from_states<I, S>(start: NaiveDate, states: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let states: Vec<String> = states.into_iter().map(Into::into).collect();
        if states.is_empty() {
            return Err(FlowError::InvalidDateRange(
                "a daily history covers at least one day".to_string(),
            ));
        }
        Ok(Self { start, states })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    pub fn end_date(&self) -> NaiveDate {
        self.date_at(self.states.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub(crate) fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    /// State held on `date`, or `None` outside the series
    pub fn state_on(&self, date: NaiveDate) -> Option<&str> {
        let offset = (date - self.start).num_days();
        if offset < 0 {
            return None;
        }
        self.states.get(offset as usize).map(String::as_str)
    }

    pub fn final_state(&self) -> Option<&str> {
        self.states.last().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &str)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| (self.date_at(i), state.as_str()))
    }

    /// Run-length view: how long the item sat in each state, in order
    pub fn time_in_states(&self) -> Vec<StateSpan> {
        let mut spans: Vec<StateSpan> = Vec::new();
        for (date, state) in self.iter() {
            match spans.last_mut() {
                Some(span) if span.state == state => span.days += 1,
                _ => spans.push(StateSpan {
                    state: state.to_string(),
                    start: date,
                    days: 1,
                }),
            }
        }
        spans
    }
}

/// Replay sorted transitions into a [`DailyHistory`].
///
/// Each day holds the state in force at the end of that day: a transition's
/// date shows its `to_state`, earlier days show what came before. The series
/// opens with the first transition's `from_state`, or `initial_state` when it
/// is unknown or there are no transitions. Transitions dated after `until` are
/// not replayed.
///
/// Without `until` the series stops on the later of `created` and the last
/// transition date, so the final state occupies exactly one day.
pub fn build_history(
    created: NaiveDate,
    transitions: &[StateTransition],
    until: Option<NaiveDate>,
    initial_state: &str,
) -> Result<DailyHistory> {
    let until = until.unwrap_or_else(|| {
        transitions
            .last()
            .map(|t| t.date().max(created))
            .unwrap_or(created)
    });

    if until < created {
        return Err(FlowError::InvalidDateRange(format!(
            "history until {} precedes creation on {}",
            until, created
        )));
    }

    let mut current = transitions
        .first()
        .and_then(|t| t.from_state.as_deref())
        .unwrap_or(initial_state);

    let num_days = (until - created).num_days() + 1;
    let mut states = Vec::with_capacity(num_days as usize);
    let mut pending = transitions.iter().peekable();

    for offset in 0..num_days {
        let day = created + Duration::days(offset);
        while let Some(transition) = pending.next_if(|t| t.date() <= day) {
            current = transition.to_state.as_str();
        }
        states.push(current.to_string());
    }

    Ok(DailyHistory {
        start: created,
        states,
    })
}
