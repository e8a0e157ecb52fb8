use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::models::booking::{Booking, BookingStatus, Occupancy};
use slotbook_core::models::reminder::{Reminder, ReminderStatus};
use slotbook_core::models::schedule::{BreakInterval, WeekdaySchedule};
use slotbook_core::models::settings::ShopSettings;
use sqlx::FromRow;
use uuid::Uuid;

fn minute_field(value: i32, field: &str) -> BookingResult<u16> {
    u16::try_from(value)
        .map_err(|_| BookingError::Validation(format!("Stored {field} out of range: {value}")))
}

fn weekday_field(value: i16) -> BookingResult<u8> {
    match u8::try_from(value) {
        Ok(wd) if wd <= 6 => Ok(wd),
        _ => Err(BookingError::Validation(format!(
            "Stored weekday out of range: {value}"
        ))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbShopSettings {
    pub base_grid_minutes: i32,
    pub short_service_threshold_minutes: i32,
    pub rest_minutes_after_short: i32,
    pub extra_round_minutes: i32,
    pub min_lead_minutes: i32,
    pub default_work_start: i32,
    pub default_work_end: i32,
}

impl DbShopSettings {
    pub fn into_core(self) -> BookingResult<ShopSettings> {
        Ok(ShopSettings {
            base_grid_minutes: minute_field(self.base_grid_minutes, "base_grid_minutes")?,
            short_service_threshold_minutes: minute_field(
                self.short_service_threshold_minutes,
                "short_service_threshold_minutes",
            )?,
            rest_minutes_after_short: minute_field(
                self.rest_minutes_after_short,
                "rest_minutes_after_short",
            )?,
            extra_round_minutes: minute_field(self.extra_round_minutes, "extra_round_minutes")?,
            min_lead_minutes: minute_field(self.min_lead_minutes, "min_lead_minutes")?,
            default_work_start: minute_field(self.default_work_start, "default_work_start")?,
            default_work_end: minute_field(self.default_work_end, "default_work_end")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWeekdaySchedule {
    pub weekday: i16,
    pub is_working: bool,
    pub work_start: i32,
    pub work_end: i32,
}

impl DbWeekdaySchedule {
    pub fn into_core(self) -> BookingResult<WeekdaySchedule> {
        Ok(WeekdaySchedule {
            weekday: weekday_field(self.weekday)?,
            is_working: self.is_working,
            work_start: minute_field(self.work_start, "work_start")?,
            work_end: minute_field(self.work_end, "work_end")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBreak {
    pub id: Uuid,
    pub weekday: Option<i16>,
    pub start_minute: i32,
    pub end_minute: i32,
    pub is_enabled: bool,
}

impl DbBreak {
    pub fn into_core(self) -> BookingResult<BreakInterval> {
        Ok(BreakInterval {
            id: self.id,
            weekday: self.weekday.map(weekday_field).transpose()?,
            start_minute: minute_field(self.start_minute, "start_minute")?,
            end_minute: minute_field(self.end_minute, "end_minute")?,
            is_enabled: self.is_enabled,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub client_id: i64,
    pub date: NaiveDate,
    pub start_minute: i32,
    pub duration_minutes: i32,
    pub occupy_minutes: Option<i32>,
    pub service_code: Option<String>,
    pub service_name: String,
    pub price_text: String,
    pub client_name: String,
    pub phone: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbBooking {
    /// Conversion into the domain model. The nullable stored occupancy is
    /// resolved here into the explicit stored-or-derived variant, so nothing
    /// past this boundary branches on a null.
    pub fn into_core(self) -> BookingResult<Booking> {
        let stored = self
            .occupy_minutes
            .map(|v| minute_field(v, "occupy_minutes"))
            .transpose()?;
        Ok(Booking {
            id: self.id,
            client_id: self.client_id,
            date: self.date,
            start_minute: minute_field(self.start_minute, "start_minute")?,
            duration_minutes: minute_field(self.duration_minutes, "duration_minutes")?,
            occupancy: Occupancy::from_stored(stored),
            service_code: self.service_code,
            service_name: self.service_name,
            price_text: self.price_text,
            client_name: self.client_name,
            phone: self.phone,
            status: BookingStatus::parse(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReminder {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub remind_at: DateTime<Utc>,
    pub kind: String,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DbReminder {
    pub fn into_core(self) -> BookingResult<Reminder> {
        Ok(Reminder {
            id: self.id,
            booking_id: self.booking_id,
            remind_at: self.remind_at,
            kind: self.kind,
            status: ReminderStatus::parse(&self.status)?,
            attempts: self.attempts,
            last_error: self.last_error,
            created_at: self.created_at,
        })
    }
}
