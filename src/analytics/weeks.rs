//! Calendar-week indexing shared by the weekly reports

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

/// Monday that starts week `week` of `year`, counting ISO-style.
///
/// When 1 January falls in the previous ISO year the first Monday after it is
/// week 1; `week_start_date(2013, 53)` is 2013-12-30, the same Monday as
/// 2014 week 1. `None` only for years chrono cannot represent.
pub fn week_start_date(year: i32, week: u32) -> Option<NaiveDate> {
    let jan_first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let delta_days = i64::from(jan_first.weekday().number_from_monday()) - 1;
    let mut delta_weeks = i64::from(week);
    if jan_first.iso_week().year() == year {
        delta_weeks -= 1;
    }
    jan_first
        .checked_sub_signed(Duration::days(delta_days))?
        .checked_add_signed(Duration::weeks(delta_weeks))
}

/// Monday of the ISO week containing `date`
pub fn week_commencing(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Every week start from `first` through `last` at a 7-day stride
pub fn fill_week_gaps(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let first = week_commencing(first);
    let last = week_commencing(last);
    if last < first {
        return Vec::new();
    }
    let weeks = (last - first).num_days() / 7 + 1;
    (0..weeks).map(|i| first + Duration::weeks(i)).collect()
}

/// Reindex a weekly series so every week between its first and last key is
/// present, missing weeks taking `V::default()`.
pub fn reindex_weekly<V: Clone + Default>(series: &BTreeMap<NaiveDate, V>) -> BTreeMap<NaiveDate, V> {
    let (Some(first), Some(last)) = (series.keys().next(), series.keys().next_back()) else {
        return BTreeMap::new();
    };
    fill_week_gaps(*first, *last)
        .into_iter()
        .map(|week| (week, series.get(&week).cloned().unwrap_or_default()))
        .collect()
}
