//! PostgreSQL-backed implementation of the storage traits.
//!
//! Thin glue over the [`crate::repositories`] free functions: each method
//! delegates to a repository call and converts row types into domain models
//! at the boundary.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::models::booking::{Booking, BookingStatus};
use slotbook_core::models::reminder::Reminder;
use slotbook_core::models::schedule::{
    BreakInterval, ScheduleConfig, WeekdaySchedule, WeekdayScheduleUpdate,
};
use slotbook_core::models::settings::{SettingsUpdate, ShopSettings};
use uuid::Uuid;

use crate::repositories::{booking, reminder, schedule, settings};
use crate::store::{
    AdmitRequest, ApprovalOutcome, BookingStore, ReminderStore, ScheduleStore, SettingsStore,
};
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_settings(&self) -> BookingResult<ShopSettings> {
        settings::get_settings(&self.pool).await?.into_core()
    }
}

#[async_trait]
impl SettingsStore for PgStore {
    async fn settings(&self) -> BookingResult<ShopSettings> {
        self.load_settings().await
    }

    async fn update_settings(&self, update: SettingsUpdate) -> BookingResult<ShopSettings> {
        let current = self.load_settings().await?;
        let next = update.apply_to(&current)?;
        settings::update_settings(&self.pool, &next)
            .await?
            .into_core()
    }
}

#[async_trait]
impl ScheduleStore for PgStore {
    async fn weekly_schedule(&self) -> BookingResult<Vec<WeekdaySchedule>> {
        let entries = schedule::get_weekly_schedule(&self.pool).await?;
        entries.into_iter().map(|e| e.into_core()).collect()
    }

    async fn weekday_schedule(&self, weekday: u8) -> BookingResult<Option<WeekdaySchedule>> {
        let entry = schedule::get_weekday_schedule(&self.pool, weekday).await?;
        entry.map(|e| e.into_core()).transpose()
    }

    async fn set_weekday_schedule(
        &self,
        weekday: u8,
        update: WeekdayScheduleUpdate,
    ) -> BookingResult<WeekdaySchedule> {
        if weekday > 6 {
            return Err(BookingError::Validation(
                "weekday must be between 0 (Monday) and 6 (Sunday)".to_string(),
            ));
        }

        // All seven entries are seeded at startup; fall back to the default
        // work window if one is somehow missing.
        let current = match self.weekday_schedule(weekday).await? {
            Some(entry) => entry,
            None => {
                let defaults = self.load_settings().await?;
                WeekdaySchedule {
                    weekday,
                    is_working: true,
                    work_start: defaults.default_work_start,
                    work_end: defaults.default_work_end,
                }
            }
        };

        let next = update.apply_to(&current)?;
        schedule::upsert_weekday_schedule(&self.pool, &next)
            .await?
            .into_core()
    }

    async fn add_day_off(&self, date: NaiveDate) -> BookingResult<()> {
        schedule::add_day_off(&self.pool, date).await?;
        Ok(())
    }

    async fn remove_day_off(&self, date: NaiveDate) -> BookingResult<()> {
        schedule::remove_day_off(&self.pool, date).await?;
        Ok(())
    }

    async fn days_off(&self) -> BookingResult<Vec<NaiveDate>> {
        Ok(schedule::get_days_off(&self.pool).await?)
    }

    async fn add_break(
        &self,
        weekday: Option<u8>,
        start_minute: u16,
        end_minute: u16,
    ) -> BookingResult<BreakInterval> {
        let candidate = BreakInterval {
            id: Uuid::nil(),
            weekday,
            start_minute,
            end_minute,
            is_enabled: true,
        };
        candidate.validate()?;

        schedule::add_break(&self.pool, weekday, start_minute, end_minute)
            .await?
            .into_core()
    }

    async fn remove_break(&self, id: Uuid) -> BookingResult<()> {
        if schedule::remove_break(&self.pool, id).await? {
            Ok(())
        } else {
            Err(BookingError::NotFound(format!(
                "Break with ID {id} not found"
            )))
        }
    }

    async fn set_break_enabled(&self, id: Uuid, enabled: bool) -> BookingResult<()> {
        if schedule::set_break_enabled(&self.pool, id, enabled).await? {
            Ok(())
        } else {
            Err(BookingError::NotFound(format!(
                "Break with ID {id} not found"
            )))
        }
    }

    async fn breaks_for_weekday(&self, weekday: u8) -> BookingResult<Vec<BreakInterval>> {
        let breaks = schedule::get_breaks_for_weekday(&self.pool, weekday).await?;
        breaks.into_iter().map(|b| b.into_core()).collect()
    }

    async fn schedule_config(&self) -> BookingResult<ScheduleConfig> {
        let weekly: HashMap<u8, WeekdaySchedule> = schedule::get_weekly_schedule(&self.pool)
            .await?
            .into_iter()
            .map(|e| e.into_core().map(|entry| (entry.weekday, entry)))
            .collect::<BookingResult<_>>()?;

        let days_off: HashSet<NaiveDate> =
            schedule::get_days_off(&self.pool).await?.into_iter().collect();

        let breaks: Vec<BreakInterval> = schedule::get_all_breaks(&self.pool)
            .await?
            .into_iter()
            .map(|b| b.into_core())
            .collect::<BookingResult<_>>()?;

        Ok(ScheduleConfig {
            weekly,
            days_off,
            breaks,
        })
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn admit(&self, request: AdmitRequest) -> BookingResult<Booking> {
        let settings = self.load_settings().await?;
        booking::admit_booking(&self.pool, &request, &settings).await
    }

    async fn booking(&self, id: Uuid) -> BookingResult<Option<Booking>> {
        booking::get_booking_by_id(&self.pool, id).await
    }

    async fn active_for_date(&self, date: NaiveDate) -> BookingResult<Vec<Booking>> {
        booking::get_active_bookings_for_date(&self.pool, date).await
    }

    async fn bookings_for_date(&self, date: NaiveDate) -> BookingResult<Vec<Booking>> {
        booking::get_bookings_for_date(&self.pool, date).await
    }

    async fn pending_bookings(&self) -> BookingResult<Vec<Booking>> {
        booking::get_pending_bookings(&self.pool).await
    }

    async fn client_bookings(&self, client_id: i64, limit: i64) -> BookingResult<Vec<Booking>> {
        booking::get_client_bookings(&self.pool, client_id, limit).await
    }

    async fn cancel_by_client(&self, id: Uuid, client_id: i64) -> BookingResult<bool> {
        booking::cancel_booking_by_client(&self.pool, id, client_id).await
    }

    async fn set_status(&self, id: Uuid, status: BookingStatus) -> BookingResult<Booking> {
        booking::update_booking_status(&self.pool, id, status).await
    }

    async fn approve(&self, id: Uuid) -> BookingResult<ApprovalOutcome> {
        let settings = self.load_settings().await?;
        booking::approve_booking(&self.pool, id, &settings).await
    }

    async fn count_active_requests_created_on(
        &self,
        client_id: i64,
        day: NaiveDate,
    ) -> BookingResult<i64> {
        booking::count_active_requests_created_on(&self.pool, client_id, day).await
    }

    async fn booked_starts_for_date(&self, date: NaiveDate) -> BookingResult<Vec<u16>> {
        booking::get_booked_starts_for_date(&self.pool, date).await
    }
}

#[async_trait]
impl ReminderStore for PgStore {
    async fn schedule_for_booking(
        &self,
        booking: &Booking,
        now: DateTime<Utc>,
    ) -> BookingResult<Vec<Reminder>> {
        reminder::schedule_for_booking(&self.pool, booking, now).await
    }

    async fn cancel_for_booking(&self, booking_id: Uuid) -> BookingResult<u64> {
        reminder::cancel_pending_for_booking(&self.pool, booking_id).await
    }

    async fn due_reminders(&self, now: DateTime<Utc>, limit: i64) -> BookingResult<Vec<Reminder>> {
        reminder::get_due_reminders(&self.pool, now, limit).await
    }

    async fn mark_sent(&self, id: Uuid) -> BookingResult<()> {
        reminder::mark_sent(&self.pool, id).await
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> BookingResult<()> {
        reminder::mark_failed(&self.pool, id, error).await
    }
}
