//! Storage traits the booking engine programs against.
//!
//! `admit` and `approve` are the only operations that mutate contended state;
//! implementations must execute them under mutual exclusion per date (a
//! coarser scope is acceptable) so that the re-validation and the write form
//! one atomic unit.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use slotbook_core::errors::BookingResult;
use slotbook_core::models::booking::{Booking, BookingStatus};
use slotbook_core::models::reminder::Reminder;
use slotbook_core::models::schedule::{
    BreakInterval, DayContext, ScheduleConfig, WeekdaySchedule, WeekdayScheduleUpdate,
};
use slotbook_core::models::settings::{SettingsUpdate, ShopSettings};
use slotbook_core::scheduling::calendar::resolve_day;
use uuid::Uuid;

/// Everything needed to admit a booking. When `occupy_minutes` is absent the
/// store derives the occupied span from the duration and current settings.
#[derive(Debug, Clone)]
pub struct AdmitRequest {
    pub client_id: i64,
    pub date: NaiveDate,
    pub start_minute: u16,
    pub duration_minutes: u16,
    pub occupy_minutes: Option<u16>,
    pub service_code: Option<String>,
    pub service_name: String,
    pub price_text: String,
    pub client_name: String,
    pub phone: String,
}

/// Result of the approval transition. A conflict discovered at approval time
/// moves the booking to `rejected` and reports the blocking booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Approved,
    RejectedConflict { conflicting: Uuid },
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn settings(&self) -> BookingResult<ShopSettings>;

    /// Validates and applies a partial update; invalid values are rejected
    /// and nothing is written.
    async fn update_settings(&self, update: SettingsUpdate) -> BookingResult<ShopSettings>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn weekly_schedule(&self) -> BookingResult<Vec<WeekdaySchedule>>;
    async fn weekday_schedule(&self, weekday: u8) -> BookingResult<Option<WeekdaySchedule>>;
    async fn set_weekday_schedule(
        &self,
        weekday: u8,
        update: WeekdayScheduleUpdate,
    ) -> BookingResult<WeekdaySchedule>;

    async fn add_day_off(&self, date: NaiveDate) -> BookingResult<()>;
    async fn remove_day_off(&self, date: NaiveDate) -> BookingResult<()>;
    async fn days_off(&self) -> BookingResult<Vec<NaiveDate>>;

    async fn add_break(
        &self,
        weekday: Option<u8>,
        start_minute: u16,
        end_minute: u16,
    ) -> BookingResult<BreakInterval>;
    async fn remove_break(&self, id: Uuid) -> BookingResult<()>;
    async fn set_break_enabled(&self, id: Uuid, enabled: bool) -> BookingResult<()>;
    async fn breaks_for_weekday(&self, weekday: u8) -> BookingResult<Vec<BreakInterval>>;

    /// Snapshot of all schedule configuration for calendar resolution.
    async fn schedule_config(&self) -> BookingResult<ScheduleConfig>;

    async fn day_context(&self, date: NaiveDate) -> BookingResult<DayContext> {
        let config = self.schedule_config().await?;
        Ok(resolve_day(date, &config))
    }
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// The sole mutation path for creating a booking: re-validates the
    /// candidate interval against the date's live active set and inserts a
    /// `pending` row, all inside one exclusive write scope. Fails with
    /// `SlotTaken` when the interval is no longer free; either commits fully
    /// or leaves no trace.
    async fn admit(&self, request: AdmitRequest) -> BookingResult<Booking>;

    async fn booking(&self, id: Uuid) -> BookingResult<Option<Booking>>;
    async fn active_for_date(&self, date: NaiveDate) -> BookingResult<Vec<Booking>>;
    async fn bookings_for_date(&self, date: NaiveDate) -> BookingResult<Vec<Booking>>;
    async fn pending_bookings(&self) -> BookingResult<Vec<Booking>>;
    async fn client_bookings(&self, client_id: i64, limit: i64) -> BookingResult<Vec<Booking>>;

    /// Cancels an active booking owned by `client_id`. Returns `false` when
    /// the booking is missing, inactive or owned by someone else.
    async fn cancel_by_client(&self, id: Uuid, client_id: i64) -> BookingResult<bool>;

    /// Applies a status transition, enforcing the booking state machine.
    async fn set_status(&self, id: Uuid, status: BookingStatus) -> BookingResult<Booking>;

    /// The approval transition: re-checks the booking's occupied interval
    /// against the date's other active bookings under the same exclusion as
    /// `admit`, auto-rejecting on conflict.
    async fn approve(&self, id: Uuid) -> BookingResult<ApprovalOutcome>;

    /// Active requests this client created on the given day (soft limit).
    async fn count_active_requests_created_on(
        &self,
        client_id: i64,
        day: NaiveDate,
    ) -> BookingResult<i64>;

    /// Start minutes shown as booked in the admin day view: pending,
    /// approved and completed.
    async fn booked_starts_for_date(&self, date: NaiveDate) -> BookingResult<Vec<u16>>;
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Creates the due-queue entries for an admitted booking, skipping
    /// offsets that are already in the past.
    async fn schedule_for_booking(
        &self,
        booking: &Booking,
        now: DateTime<Utc>,
    ) -> BookingResult<Vec<Reminder>>;

    /// Invalidates pending reminders for a booking; returns how many were
    /// cancelled.
    async fn cancel_for_booking(&self, booking_id: Uuid) -> BookingResult<u64>;

    async fn due_reminders(&self, now: DateTime<Utc>, limit: i64) -> BookingResult<Vec<Reminder>>;
    async fn mark_sent(&self, id: Uuid) -> BookingResult<()>;
    async fn mark_failed(&self, id: Uuid, error: &str) -> BookingResult<()>;
}

/// The full storage surface as one object-safe trait.
pub trait Store: SettingsStore + ScheduleStore + BookingStore + ReminderStore {}

impl<T: SettingsStore + ScheduleStore + BookingStore + ReminderStore> Store for T {}

/// The UTC instant a reminder of `offset_minutes` before the booking start
/// should fire. Wall-clock fields are taken as-is: the whole system runs in
/// one implicit zone.
pub fn reminder_instant(booking: &Booking, offset_minutes: i64) -> DateTime<Utc> {
    let minute = u32::from(booking.start_minute.min(1439));
    let start = booking
        .date
        .and_hms_opt(minute / 60, minute % 60, 0)
        .expect("minute below 24:00");
    DateTime::<Utc>::from_naive_utc_and_offset(start, Utc)
        - chrono::Duration::minutes(offset_minutes)
}
