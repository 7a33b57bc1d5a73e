//! Cycle-time engine.
//!
//! Works over a [`DailyHistory`] rather than the raw transition list, so every
//! policy sees the same day-level view of the item.

use crate::history::DailyHistory;
use crate::models::{CycleDefinition, EndBoundary, SetMode, StartBoundary};
use std::collections::BTreeSet;

/// Days an item spent in `cycle`, or `None` when it never started or has not
/// finished. `None` must be excluded from aggregates, never read as zero.
pub fn cycle_time(history: &DailyHistory, cycle: &CycleDefinition) -> Option<i64> {
    match cycle {
        CycleDefinition::Set { mode, states } => Some(days_in_set(history, *mode, states)),
        CycleDefinition::Boundary {
            start,
            end,
            reopened_state,
        } => boundary_cycle_time(history, start, end, reopened_state.as_deref()),
    }
}

fn days_in_set(history: &DailyHistory, mode: SetMode, states: &BTreeSet<String>) -> i64 {
    history
        .states()
        .iter()
        .filter(|state| match mode {
            SetMode::Include => states.contains(*state),
            SetMode::Exclude => !states.contains(*state),
        })
        .count() as i64
}

fn boundary_cycle_time(
    history: &DailyHistory,
    start: &StartBoundary,
    end: &EndBoundary,
    reopened_state: Option<&str>,
) -> Option<i64> {
    let states = history.states();

    let start_index = match start {
        StartBoundary::Enter(state) => states.iter().position(|s| s == state),
        StartBoundary::After(state) => exit_index(states, state),
    };

    let end_index = match end {
        EndBoundary::Enter(state) => last_genuine_entry(states, state, reopened_state),
        EndBoundary::Exit(state) => exit_index(states, state),
    }?;

    let Some(start_index) = start_index else {
        // Went straight to the end state from an untracked one: same-day start.
        return Some(1);
    };

    if end_index < start_index {
        return None;
    }

    let elapsed = (history.date_at(end_index) - history.date_at(start_index)).num_days();
    Some(elapsed + end.offset())
}

/// Day after the last day spent in `state`; the last day itself when the
/// series ends there.
fn exit_index(states: &[String], state: &str) -> Option<usize> {
    let last = states.iter().rposition(|s| s == state)?;
    Some((last + 1).min(states.len().saturating_sub(1)))
}

/// Last day the series moves into `state`, skipping moves made straight from
/// `reopened_state`.
fn last_genuine_entry(states: &[String], state: &str, reopened_state: Option<&str>) -> Option<usize> {
    (0..states.len()).rev().find(|&i| {
        if states[i] != state {
            return false;
        }
        match i.checked_sub(1).map(|p| states[p].as_str()) {
            None => true,
            Some(previous) if previous == state => false,
            Some(previous) => reopened_state != Some(previous),
        }
    })
}
