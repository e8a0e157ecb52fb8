use chrono::NaiveDate;

use crate::models::schedule::{DayContext, ScheduleConfig};
use crate::scheduling::time::weekday_index;

/// Resolves a date's effective working context from a configuration snapshot.
///
/// A day-off entry overrides the weekly schedule outright. A missing weekday
/// entry, a non-working entry or an inverted window all resolve to
/// non-working: absence of schedule data fails closed rather than erroring.
/// Breaks for the weekday are merged with global breaks (no weekday tag);
/// disabled or degenerate breaks are dropped.
pub fn resolve_day(date: NaiveDate, config: &ScheduleConfig) -> DayContext {
    if config.days_off.contains(&date) {
        return DayContext::closed();
    }

    let weekday = weekday_index(date);
    let Some(entry) = config.weekly.get(&weekday) else {
        return DayContext::closed();
    };
    if !entry.is_working || entry.work_end <= entry.work_start {
        return DayContext::closed();
    }

    let mut breaks: Vec<(u16, u16)> = config
        .breaks
        .iter()
        .filter(|b| b.is_enabled)
        .filter(|b| b.weekday.is_none() || b.weekday == Some(weekday))
        .filter(|b| b.end_minute > b.start_minute)
        .map(|b| (b.start_minute, b.end_minute))
        .collect();
    breaks.sort_unstable();

    DayContext {
        is_working: true,
        work_start: Some(entry.work_start),
        work_end: Some(entry.work_end),
        breaks,
    }
}
