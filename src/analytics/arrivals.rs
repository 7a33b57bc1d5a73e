//! Arrival rate: how often work lands in each state, completion or not

use crate::analytics::tables::WeeklyTable;
use crate::models::WorkItem;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Daily arrivals per state, accumulated into `into`
pub fn arrivals<'a, I>(items: I, into: &mut BTreeMap<NaiveDate, BTreeMap<String, u64>>)
where
    I: IntoIterator<Item = &'a WorkItem>,
{
    for item in items {
        for transition in &item.state_transitions {
            *into
                .entry(transition.date())
                .or_default()
                .entry(transition.to_state.clone())
                .or_insert(0) += 1;
        }
    }
}

/// Weekly sums of arrivals per state over `[from, to]`, weeks commencing Monday
pub fn arrival_rate(items: &[&WorkItem], from: NaiveDate, to: NaiveDate) -> WeeklyTable {
    let mut table = WeeklyTable::new();
    if to < from {
        return table;
    }

    let mut daily = BTreeMap::new();
    arrivals(items.iter().copied(), &mut daily);

    for (day, states) in daily.range(from..=to) {
        for (state, count) in states {
            table.add(*day, state, *count);
        }
    }
    table.gap_filled()
}
