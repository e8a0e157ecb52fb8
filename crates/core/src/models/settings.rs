use serde::{Deserialize, Serialize};

use crate::errors::{BookingError, BookingResult};
use crate::scheduling::time::{format_minutes, parse_hhmm};

/// Allowed spacings for the base appointment grid.
pub const BASE_GRID_CHOICES: [u16; 4] = [30, 60, 90, 120];
/// Allowed rounding steps for short-service occupancy.
pub const EXTRA_ROUND_CHOICES: [u16; 5] = [5, 10, 15, 20, 30];

/// Shop-wide scheduling configuration.
///
/// A single logical record, read by every scheduling operation and mutated
/// only through validated updates. All minute fields are minutes; the default
/// work window is the fallback used when a weekday has no explicit schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSettings {
    pub base_grid_minutes: u16,
    pub short_service_threshold_minutes: u16,
    pub rest_minutes_after_short: u16,
    pub extra_round_minutes: u16,
    pub min_lead_minutes: u16,
    pub default_work_start: u16,
    pub default_work_end: u16,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            base_grid_minutes: 60,
            short_service_threshold_minutes: 40,
            rest_minutes_after_short: 5,
            extra_round_minutes: 15,
            min_lead_minutes: 0,
            default_work_start: 9 * 60,
            default_work_end: 19 * 60,
        }
    }
}

impl ShopSettings {
    /// Checks every field against its allowed range. Invalid settings are
    /// rejected at the write boundary and never persisted.
    pub fn validate(&self) -> BookingResult<()> {
        if !BASE_GRID_CHOICES.contains(&self.base_grid_minutes) {
            return Err(BookingError::Validation(
                "base_grid_minutes must be one of: 30, 60, 90, 120".to_string(),
            ));
        }
        if !(5..=120).contains(&self.short_service_threshold_minutes) {
            return Err(BookingError::Validation(
                "short_service_threshold_minutes must be between 5 and 120".to_string(),
            ));
        }
        if self.rest_minutes_after_short > 60 {
            return Err(BookingError::Validation(
                "rest_minutes_after_short must be between 0 and 60".to_string(),
            ));
        }
        if !EXTRA_ROUND_CHOICES.contains(&self.extra_round_minutes) {
            return Err(BookingError::Validation(
                "extra_round_minutes must be one of: 5, 10, 15, 20, 30".to_string(),
            ));
        }
        if self.min_lead_minutes > 24 * 60 {
            return Err(BookingError::Validation(
                "min_lead_minutes must be between 0 and 1440".to_string(),
            ));
        }
        if self.default_work_start >= self.default_work_end || self.default_work_end > 24 * 60 {
            return Err(BookingError::Validation(
                "default work window must satisfy start < end <= 24:00".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial settings update, as accepted by the admin surface. Work window
/// fields come in as "HH:MM" strings and are parsed before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub base_grid_minutes: Option<u16>,
    pub short_service_threshold_minutes: Option<u16>,
    pub rest_minutes_after_short: Option<u16>,
    pub extra_round_minutes: Option<u16>,
    pub min_lead_minutes: Option<u16>,
    pub default_work_start: Option<String>,
    pub default_work_end: Option<String>,
}

impl SettingsUpdate {
    /// Applies the update on top of `current`, validating the result. The
    /// current settings are untouched on failure.
    pub fn apply_to(&self, current: &ShopSettings) -> BookingResult<ShopSettings> {
        let mut next = current.clone();
        if let Some(v) = self.base_grid_minutes {
            next.base_grid_minutes = v;
        }
        if let Some(v) = self.short_service_threshold_minutes {
            next.short_service_threshold_minutes = v;
        }
        if let Some(v) = self.rest_minutes_after_short {
            next.rest_minutes_after_short = v;
        }
        if let Some(v) = self.extra_round_minutes {
            next.extra_round_minutes = v;
        }
        if let Some(v) = self.min_lead_minutes {
            next.min_lead_minutes = v;
        }
        if let Some(v) = &self.default_work_start {
            next.default_work_start = parse_hhmm(v)?;
        }
        if let Some(v) = &self.default_work_end {
            next.default_work_end = parse_hhmm(v)?;
        }
        next.validate()?;
        Ok(next)
    }
}

/// Settings as rendered to API clients, with the work window formatted
/// "HH:MM" like every other time-of-day value on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub base_grid_minutes: u16,
    pub short_service_threshold_minutes: u16,
    pub rest_minutes_after_short: u16,
    pub extra_round_minutes: u16,
    pub min_lead_minutes: u16,
    pub default_work_start: String,
    pub default_work_end: String,
}

impl From<&ShopSettings> for SettingsResponse {
    fn from(s: &ShopSettings) -> Self {
        Self {
            base_grid_minutes: s.base_grid_minutes,
            short_service_threshold_minutes: s.short_service_threshold_minutes,
            rest_minutes_after_short: s.rest_minutes_after_short,
            extra_round_minutes: s.extra_round_minutes,
            min_lead_minutes: s.min_lead_minutes,
            default_work_start: format_minutes(s.default_work_start),
            default_work_end: format_minutes(s.default_work_end),
        }
    }
}
