//! In-memory implementation of the storage traits.
//!
//! Backed by a single `RwLock`; `admit` and `approve` hold the write guard
//! for their whole re-validate-then-write sequence, which gives a coarser
//! mutual exclusion than the per-date locking of the Postgres store but the
//! same atomicity. Used by tests and embedded deployments.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::models::booking::{Booking, BookingStatus, Occupancy};
use slotbook_core::models::reminder::{Reminder, ReminderStatus, REMINDER_OFFSETS};
use slotbook_core::models::schedule::{
    BreakInterval, ScheduleConfig, WeekdaySchedule, WeekdayScheduleUpdate,
};
use slotbook_core::models::settings::{SettingsUpdate, ShopSettings};
use slotbook_core::scheduling::admission::find_conflict;
use slotbook_core::scheduling::occupancy::occupied_minutes;
use slotbook_core::scheduling::time::format_minutes;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{
    reminder_instant, AdmitRequest, ApprovalOutcome, BookingStore, ReminderStore, ScheduleStore,
    SettingsStore,
};

#[derive(Debug)]
struct Inner {
    settings: ShopSettings,
    weekly: HashMap<u8, WeekdaySchedule>,
    days_off: HashSet<NaiveDate>,
    breaks: Vec<BreakInterval>,
    bookings: HashMap<Uuid, Booking>,
    reminders: Vec<Reminder>,
}

impl Inner {
    fn active_for_date(&self, date: NaiveDate) -> Vec<Booking> {
        let mut active: Vec<Booking> = self
            .bookings
            .values()
            .filter(|b| b.date == date && b.status.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|b| b.start_minute);
        active
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with default settings and the default weekly schedule:
    /// Monday through Saturday working, Sunday off.
    pub fn new() -> Self {
        let settings = ShopSettings::default();
        let weekly = (0u8..=6)
            .map(|weekday| {
                (
                    weekday,
                    WeekdaySchedule {
                        weekday,
                        is_working: weekday != 6,
                        work_start: settings.default_work_start,
                        work_end: settings.default_work_end,
                    },
                )
            })
            .collect();

        Self {
            inner: Arc::new(RwLock::new(Inner {
                settings,
                weekly,
                days_off: HashSet::new(),
                breaks: Vec::new(),
                bookings: HashMap::new(),
                reminders: Vec::new(),
            })),
        }
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn settings(&self) -> BookingResult<ShopSettings> {
        Ok(self.inner.read().await.settings.clone())
    }

    async fn update_settings(&self, update: SettingsUpdate) -> BookingResult<ShopSettings> {
        let mut inner = self.inner.write().await;
        let next = update.apply_to(&inner.settings)?;
        inner.settings = next.clone();
        Ok(next)
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn weekly_schedule(&self) -> BookingResult<Vec<WeekdaySchedule>> {
        let inner = self.inner.read().await;
        let mut entries: Vec<WeekdaySchedule> = inner.weekly.values().cloned().collect();
        entries.sort_by_key(|e| e.weekday);
        Ok(entries)
    }

    async fn weekday_schedule(&self, weekday: u8) -> BookingResult<Option<WeekdaySchedule>> {
        Ok(self.inner.read().await.weekly.get(&weekday).cloned())
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

        let mut inner = self.inner.write().await;
        let current = match inner.weekly.get(&weekday) {
            Some(entry) => entry.clone(),
            None => WeekdaySchedule {
                weekday,
                is_working: true,
                work_start: inner.settings.default_work_start,
                work_end: inner.settings.default_work_end,
            },
        };

        let next = update.apply_to(&current)?;
        inner.weekly.insert(weekday, next.clone());
        Ok(next)
    }

    async fn add_day_off(&self, date: NaiveDate) -> BookingResult<()> {
        self.inner.write().await.days_off.insert(date);
        Ok(())
    }

    async fn remove_day_off(&self, date: NaiveDate) -> BookingResult<()> {
        self.inner.write().await.days_off.remove(&date);
        Ok(())
    }

    async fn days_off(&self) -> BookingResult<Vec<NaiveDate>> {
        let inner = self.inner.read().await;
        let mut dates: Vec<NaiveDate> = inner.days_off.iter().copied().collect();
        dates.sort();
        Ok(dates)
    }

    async fn add_break(
        &self,
        weekday: Option<u8>,
        start_minute: u16,
        end_minute: u16,
    ) -> BookingResult<BreakInterval> {
        let interval = BreakInterval {
            id: Uuid::new_v4(),
            weekday,
            start_minute,
            end_minute,
            is_enabled: true,
        };
        interval.validate()?;

        self.inner.write().await.breaks.push(interval.clone());
        Ok(interval)
    }

    async fn remove_break(&self, id: Uuid) -> BookingResult<()> {
        let mut inner = self.inner.write().await;
        let before = inner.breaks.len();
        inner.breaks.retain(|b| b.id != id);
        if inner.breaks.len() == before {
            return Err(BookingError::NotFound(format!(
                "Break with ID {id} not found"
            )));
        }
        Ok(())
    }

    async fn set_break_enabled(&self, id: Uuid, enabled: bool) -> BookingResult<()> {
        let mut inner = self.inner.write().await;
        match inner.breaks.iter_mut().find(|b| b.id == id) {
            Some(interval) => {
                interval.is_enabled = enabled;
                Ok(())
            }
            None => Err(BookingError::NotFound(format!(
                "Break with ID {id} not found"
            ))),
        }
    }

    async fn breaks_for_weekday(&self, weekday: u8) -> BookingResult<Vec<BreakInterval>> {
        let inner = self.inner.read().await;
        Ok(inner
            .breaks
            .iter()
            .filter(|b| b.is_enabled && (b.weekday.is_none() || b.weekday == Some(weekday)))
            .cloned()
            .collect())
    }

    async fn schedule_config(&self) -> BookingResult<ScheduleConfig> {
        let inner = self.inner.read().await;
        Ok(ScheduleConfig {
            weekly: inner.weekly.clone(),
            days_off: inner.days_off.clone(),
            breaks: inner.breaks.clone(),
        })
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn admit(&self, request: AdmitRequest) -> BookingResult<Booking> {
        let mut inner = self.inner.write().await;

        let occupy = request
            .occupy_minutes
            .unwrap_or_else(|| occupied_minutes(request.duration_minutes, &inner.settings));

        let active = inner.active_for_date(request.date);
        if find_conflict(request.start_minute, occupy, &active, &inner.settings, None).is_some() {
            return Err(BookingError::SlotTaken(format!(
                "{} {}",
                request.date,
                format_minutes(request.start_minute)
            )));
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            client_id: request.client_id,
            date: request.date,
            start_minute: request.start_minute,
            duration_minutes: request.duration_minutes,
            occupancy: Occupancy::Stored(occupy),
            service_code: request.service_code,
            service_name: request.service_name,
            price_text: request.price_text,
            client_name: request.client_name,
            phone: request.phone,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn booking(&self, id: Uuid) -> BookingResult<Option<Booking>> {
        Ok(self.inner.read().await.bookings.get(&id).cloned())
    }

    async fn active_for_date(&self, date: NaiveDate) -> BookingResult<Vec<Booking>> {
        Ok(self.inner.read().await.active_for_date(date))
    }

    async fn bookings_for_date(&self, date: NaiveDate) -> BookingResult<Vec<Booking>> {
        let inner = self.inner.read().await;
        let mut bookings: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.date == date)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.start_minute);
        Ok(bookings)
    }

    async fn pending_bookings(&self) -> BookingResult<Vec<Booking>> {
        let inner = self.inner.read().await;
        let mut pending: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.status == BookingStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|b| (b.date, b.start_minute));
        Ok(pending)
    }

    async fn client_bookings(&self, client_id: i64, limit: i64) -> BookingResult<Vec<Booking>> {
        let inner = self.inner.read().await;
        let mut bookings: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.client_id == client_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| std::cmp::Reverse((b.date, b.start_minute)));
        bookings.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(bookings)
    }

    async fn cancel_by_client(&self, id: Uuid, client_id: i64) -> BookingResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.bookings.get_mut(&id) {
            Some(booking)
                if booking.client_id == client_id && booking.status.is_active() =>
            {
                booking.status = BookingStatus::CancelledByClient;
                booking.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_status(&self, id: Uuid, status: BookingStatus) -> BookingResult<Booking> {
        let mut inner = self.inner.write().await;
        let booking = inner
            .bookings
            .get_mut(&id)
            .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {id} not found")))?;

        if !booking.status.can_transition_to(status) {
            return Err(BookingError::Validation(format!(
                "Booking {id} cannot move from '{}' to '{}'",
                booking.status.as_str(),
                status.as_str()
            )));
        }

        booking.status = status;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn approve(&self, id: Uuid) -> BookingResult<ApprovalOutcome> {
        let mut inner = self.inner.write().await;
        let booking = inner
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {id} not found")))?;

        if !booking.status.can_transition_to(BookingStatus::Approved) {
            return Err(BookingError::Validation(format!(
                "Booking {id} cannot be approved from status '{}'",
                booking.status.as_str()
            )));
        }

        let active = inner.active_for_date(booking.date);
        let (start, end) = booking.occupied_interval(&inner.settings);
        let conflict = find_conflict(start, end - start, &active, &inner.settings, Some(id));

        let (next_status, outcome) = match conflict {
            Some(conflicting) => (
                BookingStatus::Rejected,
                ApprovalOutcome::RejectedConflict { conflicting },
            ),
            None => (BookingStatus::Approved, ApprovalOutcome::Approved),
        };

        let entry = inner
            .bookings
            .get_mut(&id)
            .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {id} not found")))?;
        entry.status = next_status;
        entry.updated_at = Utc::now();
        Ok(outcome)
    }

    async fn count_active_requests_created_on(
        &self,
        client_id: i64,
        day: NaiveDate,
    ) -> BookingResult<i64> {
        let inner = self.inner.read().await;
        let count = inner
            .bookings
            .values()
            .filter(|b| {
                b.client_id == client_id
                    && b.created_at.date_naive() == day
                    && b.status.is_active()
            })
            .count();
        Ok(count as i64)
    }

    async fn booked_starts_for_date(&self, date: NaiveDate) -> BookingResult<Vec<u16>> {
        let inner = self.inner.read().await;
        let mut starts: Vec<u16> = inner
            .bookings
            .values()
            .filter(|b| {
                b.date == date && (b.status.is_active() || b.status == BookingStatus::Completed)
            })
            .map(|b| b.start_minute)
            .collect();
        starts.sort_unstable();
        Ok(starts)
    }
}

#[async_trait]
impl ReminderStore for MemoryStore {
    async fn schedule_for_booking(
        &self,
        booking: &Booking,
        now: DateTime<Utc>,
    ) -> BookingResult<Vec<Reminder>> {
        let mut inner = self.inner.write().await;
        let mut created = Vec::new();

        for (kind, offset_minutes) in REMINDER_OFFSETS {
            let remind_at = reminder_instant(booking, offset_minutes);
            if remind_at <= now {
                continue;
            }

            let reminder = Reminder {
                id: Uuid::new_v4(),
                booking_id: booking.id,
                remind_at,
                kind: kind.to_string(),
                status: ReminderStatus::Pending,
                attempts: 0,
                last_error: None,
                created_at: now,
            };
            inner.reminders.push(reminder.clone());
            created.push(reminder);
        }

        Ok(created)
    }

    async fn cancel_for_booking(&self, booking_id: Uuid) -> BookingResult<u64> {
        let mut inner = self.inner.write().await;
        let mut cancelled = 0u64;
        for reminder in inner
            .reminders
            .iter_mut()
            .filter(|r| r.booking_id == booking_id && r.status == ReminderStatus::Pending)
        {
            reminder.status = ReminderStatus::Canceled;
            cancelled += 1;
        }
        Ok(cancelled)
    }

    async fn due_reminders(&self, now: DateTime<Utc>, limit: i64) -> BookingResult<Vec<Reminder>> {
        let inner = self.inner.read().await;
        let mut due: Vec<Reminder> = inner
            .reminders
            .iter()
            .filter(|r| r.status == ReminderStatus::Pending && r.remind_at <= now)
            .cloned()
            .collect();
        due.sort_by_key(|r| r.remind_at);
        due.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(due)
    }

    async fn mark_sent(&self, id: Uuid) -> BookingResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(reminder) = inner.reminders.iter_mut().find(|r| r.id == id) {
            reminder.status = ReminderStatus::Sent;
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> BookingResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(reminder) = inner.reminders.iter_mut().find(|r| r.id == id) {
            reminder.status = ReminderStatus::Failed;
            reminder.attempts += 1;
            reminder.last_error = Some(error.chars().take(500).collect());
        }
        Ok(())
    }
}
