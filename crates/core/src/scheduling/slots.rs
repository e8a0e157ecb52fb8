use chrono::{NaiveDate, Timelike};

use crate::models::booking::Booking;
use crate::models::schedule::DayContext;
use crate::models::settings::ShopSettings;
use crate::scheduling::conflict::is_free;
use crate::scheduling::time::ceil_to_step;

/// An explicit clock reading, threaded into slot generation so the lead-time
/// cutoff never depends on ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Now {
    pub date: NaiveDate,
    pub minute: u16,
}

impl Now {
    /// Reads the local wall clock. All scheduling runs in the one implicit
    /// local zone.
    pub fn current() -> Self {
        let now = chrono::Local::now();
        Self {
            date: now.date_naive(),
            minute: (now.hour() * 60 + now.minute()) as u16,
        }
    }
}

/// Produces the ordered, deduplicated list of offerable start times for a
/// service of `duration_minutes` on `date`.
///
/// Candidates walk the base grid from the first grid multiple at or after the
/// window start. Services shorter than the configured threshold additionally
/// unlock an extra candidate inside each grid cell, at the point where the
/// preceding short service's occupied span would end, provided it falls
/// strictly before the next grid point and still finishes inside the window.
///
/// The result is best-effort: callers re-validate at admission time, so this
/// may run unsynchronized against the latest committed booking set.
pub fn free_starts(
    date: NaiveDate,
    duration_minutes: u16,
    day: &DayContext,
    settings: &ShopSettings,
    active: &[Booking],
    now: Now,
) -> Vec<u16> {
    if !day.is_working {
        return Vec::new();
    }
    let (Some(work_start), Some(work_end)) = (day.work_start, day.work_end) else {
        return Vec::new();
    };
    let grid = settings.base_grid_minutes;
    if work_end <= work_start || grid == 0 {
        return Vec::new();
    }

    let busy: Vec<(u16, u16)> = active
        .iter()
        .filter(|b| b.status.is_active())
        .map(|b| b.occupied_interval(settings))
        .collect();

    // Same-day requests may not start before now + lead time.
    let cutoff = if date == now.date {
        work_start.max(now.minute.saturating_add(settings.min_lead_minutes))
    } else {
        work_start
    };

    let mut first = (work_start / grid) * grid;
    if first < work_start {
        first += grid;
    }

    let mut candidates: Vec<u16> = Vec::new();
    let mut t = first;
    while t < work_end {
        candidates.push(t);

        if duration_minutes < settings.short_service_threshold_minutes {
            let offset = ceil_to_step(
                duration_minutes.saturating_add(settings.rest_minutes_after_short),
                settings.extra_round_minutes,
            );
            let extra = t.saturating_add(offset);
            if extra < t + grid && extra.saturating_add(duration_minutes) <= work_end {
                candidates.push(extra);
            }
        }

        t += grid;
    }

    candidates.sort_unstable();
    candidates.dedup();

    candidates
        .into_iter()
        .filter(|&s| s >= work_start && s.saturating_add(duration_minutes) <= work_end)
        .filter(|&s| date != now.date || s >= cutoff)
        .filter(|&s| is_free(s, duration_minutes, &busy, &day.breaks))
        .collect()
}
