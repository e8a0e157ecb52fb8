use chrono::{Datelike, NaiveDate};

use crate::errors::{BookingError, BookingResult};

/// Parses a strict "HH:MM" wall-clock time into minutes since midnight.
pub fn parse_hhmm(value: &str) -> BookingResult<u16> {
    let invalid = || BookingError::Validation(format!("Invalid time '{value}', expected HH:MM"));

    let (h, m) = value.split_once(':').ok_or_else(invalid)?;
    if h.len() != 2 || m.len() != 2 {
        return Err(invalid());
    }
    let hours: u16 = h.parse().map_err(|_| invalid())?;
    let minutes: u16 = m.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

/// Formats minutes since midnight as "HH:MM".
pub fn format_minutes(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Rounds `value` up to the next multiple of `step`; identity when `step` is
/// zero, saturating at the top of the range.
pub fn ceil_to_step(value: u16, step: u16) -> u16 {
    if step == 0 {
        return value;
    }
    value.div_ceil(step).saturating_mul(step)
}

/// Weekday index with Monday = 0 .. Sunday = 6, matching the weekly schedule
/// keys.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}
