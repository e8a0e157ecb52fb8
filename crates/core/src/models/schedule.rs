use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::scheduling::time::{format_minutes, parse_hhmm};

/// One entry of the weekly schedule, keyed by weekday 0 (Monday) .. 6 (Sunday).
/// Exactly one entry exists per weekday; all seven are seeded at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySchedule {
    pub weekday: u8,
    pub is_working: bool,
    pub work_start: u16,
    pub work_end: u16,
}

impl WeekdaySchedule {
    pub fn validate(&self) -> BookingResult<()> {
        if self.weekday > 6 {
            return Err(BookingError::Validation(
                "weekday must be between 0 (Monday) and 6 (Sunday)".to_string(),
            ));
        }
        if self.is_working && (self.work_start >= self.work_end || self.work_end > 24 * 60) {
            return Err(BookingError::Validation(
                "work window must satisfy start < end <= 24:00".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial per-weekday update from the admin surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekdayScheduleUpdate {
    pub is_working: Option<bool>,
    pub work_start: Option<String>,
    pub work_end: Option<String>,
}

impl WeekdayScheduleUpdate {
    pub fn apply_to(&self, current: &WeekdaySchedule) -> BookingResult<WeekdaySchedule> {
        let mut next = current.clone();
        if let Some(v) = self.is_working {
            next.is_working = v;
        }
        if let Some(v) = &self.work_start {
            next.work_start = parse_hhmm(v)?;
        }
        if let Some(v) = &self.work_end {
            next.work_end = parse_hhmm(v)?;
        }
        next.validate()?;
        Ok(next)
    }
}

/// A break interval `[start_minute, end_minute)`. `weekday = None` applies to
/// every day. Disabled breaks stay on record but are ignored by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakInterval {
    pub id: Uuid,
    pub weekday: Option<u8>,
    pub start_minute: u16,
    pub end_minute: u16,
    pub is_enabled: bool,
}

impl BreakInterval {
    pub fn validate(&self) -> BookingResult<()> {
        if let Some(wd) = self.weekday {
            if wd > 6 {
                return Err(BookingError::Validation(
                    "weekday must be between 0 (Monday) and 6 (Sunday)".to_string(),
                ));
            }
        }
        if self.start_minute >= self.end_minute || self.end_minute > 24 * 60 {
            return Err(BookingError::Validation(
                "break interval must satisfy start < end <= 24:00".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBreakRequest {
    pub weekday: Option<u8>,
    pub start_time: String,
    pub end_time: String,
}

/// Snapshot of all administrator-owned schedule configuration, taken once per
/// resolution so the resolver never consults ambient state.
#[derive(Debug, Clone, Default)]
pub struct ScheduleConfig {
    pub weekly: HashMap<u8, WeekdaySchedule>,
    pub days_off: HashSet<NaiveDate>,
    pub breaks: Vec<BreakInterval>,
}

/// A date's effective working context. Non-working days carry no window and
/// no breaks; break intervals are kept as raw `(start, end)` minute pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayContext {
    pub is_working: bool,
    pub work_start: Option<u16>,
    pub work_end: Option<u16>,
    pub breaks: Vec<(u16, u16)>,
}

impl DayContext {
    pub fn closed() -> Self {
        Self {
            is_working: false,
            work_start: None,
            work_end: None,
            breaks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakWindow {
    pub start_time: String,
    pub end_time: String,
}

/// Wire shape of a day's working context:
/// `{is_working, work_start, work_end, breaks: [{start_time, end_time}]}`
/// with times as "HH:MM" or null on non-working days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayContextResponse {
    pub is_working: bool,
    pub work_start: Option<String>,
    pub work_end: Option<String>,
    pub breaks: Vec<BreakWindow>,
}

impl From<&DayContext> for DayContextResponse {
    fn from(ctx: &DayContext) -> Self {
        Self {
            is_working: ctx.is_working,
            work_start: ctx.work_start.map(format_minutes),
            work_end: ctx.work_end.map(format_minutes),
            breaks: ctx
                .breaks
                .iter()
                .map(|&(s, e)| BreakWindow {
                    start_time: format_minutes(s),
                    end_time: format_minutes(e),
                })
                .collect(),
        }
    }
}
