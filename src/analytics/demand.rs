//! Weekly demand: items created per week

use crate::analytics::tables::WeeklyTable;
use crate::analytics::throughput::swimlane;
use crate::error::Result;
use crate::models::{TypeGroupings, WorkItem};
use chrono::NaiveDate;

/// Items created in `[from, to]` counted by week of creation and swimlane,
/// with zero rows for weeks that saw no creations.
pub fn demand(
    items: &[&WorkItem],
    from: NaiveDate,
    to: NaiveDate,
    groupings: &TypeGroupings,
    types: Option<&[String]>,
) -> Result<WeeklyTable> {
    let mut table = WeeklyTable::new();

    for item in items {
        let created = item.created_date();
        if created < from || created > to {
            continue;
        }
        if let Some(swimlane) = swimlane(item, groupings, types)? {
            table.record(created, &swimlane);
        }
    }

    Ok(table.gap_filled())
}
