//! Weekly throughput: items newly arrived in a counting state

use crate::analytics::tables::WeeklyTable;
use crate::error::Result;
use crate::models::{TypeGroupings, WorkItem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Throughput report options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThroughputOptions {
    /// Running total per week instead of per-week counts
    #[serde(default)]
    pub cumulative: bool,

    /// Only items fetched under this category
    #[serde(default)]
    pub category: Option<String>,

    /// Split swimlanes by the first matching type grouping
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

impl ThroughputOptions {
    pub fn cumulative() -> Self {
        Self {
            cumulative: true,
            ..Self::default()
        }
    }

    pub fn incremental() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_types(mut self, types: Vec<String>) -> Self {
        self.types = Some(types);
        self
    }
}

/// Swimlane for an item: its category, suffixed with the first matching type
/// grouping when groupings are requested. `None` when groupings are requested
/// and none match.
pub(crate) fn swimlane(
    item: &WorkItem,
    groupings: &TypeGroupings,
    types: Option<&[String]>,
) -> Result<Option<String>> {
    match types {
        None => Ok(Some(item.category.clone())),
        Some(types) => Ok(groupings
            .first_match(types, &item.item_type)?
            .map(|grouping| format!("{}-{}", item.category, grouping))),
    }
}

/// Day `item` last moved from a non-counting state into a counting one, on
/// or before `as_of`.
///
/// Only items whose state on `as_of` counts are considered. An item that never
/// made such a move (created straight into a counting state) completes on its
/// creation day.
pub fn completion_date(
    item: &WorkItem,
    counting: &BTreeSet<String>,
    as_of: NaiveDate,
) -> Option<NaiveDate> {
    let current = item.state_as_of(as_of)?;
    if !counting.contains(current) {
        return None;
    }

    item.state_transitions
        .iter()
        .rev()
        .filter(|t| t.date() <= as_of)
        .find(|t| {
            counting.contains(&t.to_state)
                && !t
                    .from_state
                    .as_ref()
                    .is_some_and(|from| counting.contains(from))
        })
        .map(|t| t.date())
        .or_else(|| Some(item.created_date()))
}

/// Weekly throughput over `[from, to]`, gap-filled between the first and last
/// week with a completion.
pub fn throughput(
    items: &[&WorkItem],
    from: NaiveDate,
    to: NaiveDate,
    counting: &BTreeSet<String>,
    groupings: &TypeGroupings,
    options: &ThroughputOptions,
) -> Result<WeeklyTable> {
    let mut table = WeeklyTable::new();

    for item in items {
        if options
            .category
            .as_ref()
            .is_some_and(|category| *category != item.category)
        {
            continue;
        }

        let Some(swimlane) = swimlane(item, groupings, options.types.as_deref())? else {
            continue;
        };

        match completion_date(item, counting, to) {
            Some(done) if done >= from => table.record(done, &swimlane),
            _ => {}
        }
    }

    let table = table.gap_filled();
    Ok(if options.cumulative {
        table.cumulative()
    } else {
        table
    })
}
