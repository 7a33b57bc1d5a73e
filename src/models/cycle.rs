//! Cycle definitions.
//!
//! A cycle is configured as a loose map of optional keys (`start`, `after`,
//! `end`, `exit`, `ignore`, `include`, `exclude`). It is validated once into a
//! [`CycleDefinition`] so the cycle-time engine never re-checks key
//! combinations.

use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Cycle entry exactly as written in configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<String>,

    /// Reopened state; entries into `end` straight from it are not completions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

/// Where a boundary cycle starts counting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "state")]
pub enum StartBoundary {
    /// Earliest day the item is recorded in the state
    Enter(String),
    /// Day after the item was last recorded in the state
    After(String),
}

/// Where a boundary cycle stops counting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "state")]
pub enum EndBoundary {
    /// Last genuine entry into the state; inclusive day count
    Enter(String),
    /// Day after the item was last recorded in the state; exclusive day count
    Exit(String),
}

impl EndBoundary {
    /// Days added to the raw date difference
    pub fn offset(&self) -> i64 {
        match self {
            EndBoundary::Enter(_) => 1,
            EndBoundary::Exit(_) => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetMode {
    /// Count days spent in any of the states
    Include,
    /// Count days spent outside all of the states
    Exclude,
}

/// A validated cycle measurement policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CycleDefinition {
    Boundary {
        start: StartBoundary,
        end: EndBoundary,
        reopened_state: Option<String>,
    },
    Set {
        mode: SetMode,
        states: BTreeSet<String>,
    },
}

impl CycleDefinition {
    /// `start` → `end`, both measured on entry
    pub fn between(start: &str, end: &str) -> Self {
        CycleDefinition::Boundary {
            start: StartBoundary::Enter(start.to_string()),
            end: EndBoundary::Enter(end.to_string()),
            reopened_state: None,
        }
    }

    pub fn boundary(start: StartBoundary, end: EndBoundary) -> Self {
        CycleDefinition::Boundary {
            start,
            end,
            reopened_state: None,
        }
    }

    pub fn include<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CycleDefinition::Set {
            mode: SetMode::Include,
            states: states.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exclude<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CycleDefinition::Set {
            mode: SetMode::Exclude,
            states: states.into_iter().map(Into::into).collect(),
        }
    }

    /// Ignore entries into the end state that come straight from `state`.
    /// No effect on set cycles.
    pub fn ignoring(self, state: &str) -> Self {
        match self {
            CycleDefinition::Boundary { start, end, .. } => CycleDefinition::Boundary {
                start,
                end,
                reopened_state: Some(state.to_string()),
            },
            set => set,
        }
    }

    /// Validate a raw configuration entry
    pub fn from_spec(name: &str, spec: &CycleSpec) -> Result<Self> {
        let invalid = |reason: &str| FlowError::InvalidCycle {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let has_boundary_key = spec.start.is_some()
            || spec.after.is_some()
            || spec.end.is_some()
            || spec.exit.is_some()
            || spec.ignore.is_some();

        match (&spec.include, &spec.exclude) {
            (Some(_), Some(_)) => return Err(invalid("use only one of 'include' and 'exclude'")),
            (Some(states), None) | (None, Some(states)) => {
                if has_boundary_key {
                    return Err(invalid(
                        "'include'/'exclude' cannot be combined with start/after/end/exit/ignore",
                    ));
                }
                if states.is_empty() {
                    return Err(invalid("state set is empty"));
                }
                return Ok(if spec.include.is_some() {
                    CycleDefinition::include(states.iter().cloned())
                } else {
                    CycleDefinition::exclude(states.iter().cloned())
                });
            }
            (None, None) => {}
        }

        let start = match (&spec.start, &spec.after) {
            (Some(state), None) => StartBoundary::Enter(state.clone()),
            (None, Some(state)) => StartBoundary::After(state.clone()),
            (Some(_), Some(_)) => return Err(invalid("use only one of 'start' and 'after'")),
            (None, None) => return Err(invalid("one of 'start' or 'after' is required")),
        };

        let end = match (&spec.end, &spec.exit) {
            (Some(state), None) => EndBoundary::Enter(state.clone()),
            (None, Some(state)) => EndBoundary::Exit(state.clone()),
            (Some(_), Some(_)) => return Err(invalid("use only one of 'end' and 'exit'")),
            (None, None) => return Err(invalid("one of 'end' or 'exit' is required")),
        };

        Ok(CycleDefinition::Boundary {
            start,
            end,
            reopened_state: spec.ignore.clone(),
        })
    }
}

/// Named cycles, iterated in name order
pub type CycleSet = BTreeMap<String, CycleDefinition>;

/// Validate every configured cycle, failing on the first bad entry
pub fn cycle_set_from_specs(specs: &BTreeMap<String, CycleSpec>) -> Result<CycleSet> {
    specs
        .iter()
        .map(|(name, spec)| Ok((name.clone(), CycleDefinition::from_spec(name, spec)?)))
        .collect()
}
