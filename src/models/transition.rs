use crate::error::{FlowError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single observed change of a work item's status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// State the item left; unknown for the earliest record of some sources
    #[serde(rename = "from")]
    pub from_state: Option<String>,

    /// State the item entered
    #[serde(rename = "to")]
    pub to_state: String,

    /// When the change was recorded
    pub timestamp: DateTime<FixedOffset>,
}

impl StateTransition {
    pub fn new(
        from_state: Option<&str>,
        to_state: &str,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            from_state: from_state.map(str::to_string),
            to_state: to_state.to_string(),
            timestamp,
        }
    }

    /// Calendar day of the transition in the timestamp's own offset
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn is_into(&self, state: &str) -> bool {
        self.to_state == state
    }
}

/// Fill a missing `from_state` with the previous transition's `to_state`.
///
/// The first transition keeps whatever it has. Idempotent.
pub fn repair_gaps(transitions: &[StateTransition]) -> Vec<StateTransition> {
    transitions
        .iter()
        .enumerate()
        .map(|(index, transition)| {
            let mut repaired = transition.clone();
            if repaired.from_state.is_none() && index > 0 {
                repaired.from_state = Some(transitions[index - 1].to_state.clone());
            }
            repaired
        })
        .collect()
}

/// Stable ascending sort by timestamp; same-instant records keep source order.
pub fn sort_transitions(transitions: &mut [StateTransition]) {
    transitions.sort_by_key(|t| t.timestamp);
}

/// Parse the timestamp shapes trackers and local caches emit.
///
/// Accepts RFC 3339 (`2012-11-12T09:54:29.284+00:00`), Jira's compact offset
/// (`2012-11-18T09:54:29.284+0000`), a naive date-time (read as UTC) and a bare
/// date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(ts);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive).fixed_offset());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc
            .from_utc_datetime(&date.and_time(NaiveTime::MIN))
            .fixed_offset());
    }

    Err(FlowError::InvalidTimestamp(raw.to_string()))
}
