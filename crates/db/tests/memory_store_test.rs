use chrono::{Duration, NaiveDate, Utc};
use pretty_assertions::assert_eq;
use slotbook_core::errors::BookingError;
use slotbook_core::models::booking::{BookingStatus, Occupancy};
use slotbook_core::models::reminder::ReminderStatus;
use slotbook_core::models::settings::SettingsUpdate;
use slotbook_db::mock::MemoryStore;
use slotbook_db::store::{
    AdmitRequest, ApprovalOutcome, BookingStore, ReminderStore, ScheduleStore, SettingsStore,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn admit_request(client_id: i64, day: NaiveDate, start_minute: u16, duration: u16) -> AdmitRequest {
    AdmitRequest {
        client_id,
        date: day,
        start_minute,
        duration_minutes: duration,
        occupy_minutes: None,
        service_code: Some("haircut".to_string()),
        service_name: "Haircut".to_string(),
        price_text: "25".to_string(),
        client_name: "Alex".to_string(),
        phone: "+100000000".to_string(),
    }
}

#[tokio::test]
async fn admit_creates_pending_booking_with_stored_occupancy() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    let booking = store.admit(admit_request(1, day, 600, 30)).await.unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.start_minute, 600);
    // 30 < threshold 40, so occupancy is ceil(30 + 5, 15) = 45.
    assert_eq!(booking.occupancy, Occupancy::Stored(45));
}

#[tokio::test]
async fn admit_rejects_overlap_and_leaves_table_unchanged() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    let err = store
        .admit(admit_request(2, day, 630, 60))
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::SlotTaken(_)));
    assert_eq!(store.bookings_for_date(day).await.unwrap().len(), 1);
}

#[tokio::test]
async fn admit_allows_back_to_back_bookings() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    let second = store.admit(admit_request(2, day, 660, 60)).await;

    assert!(second.is_ok());
}

#[tokio::test]
async fn concurrent_admits_for_same_slot_admit_exactly_one() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    let a = {
        let store = store.clone();
        tokio::spawn(async move { store.admit(admit_request(1, day, 600, 60)).await })
    };
    let b = {
        let store = store.clone();
        tokio::spawn(async move { store.admit(admit_request(2, day, 600, 60)).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let admitted = results.iter().filter(|r| r.is_ok()).count();

    assert_eq!(admitted, 1);
    assert_eq!(store.active_for_date(day).await.unwrap().len(), 1);
}

#[tokio::test]
async fn approve_transitions_pending_to_approved() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    let booking = store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    let outcome = store.approve(booking.id).await.unwrap();

    assert_eq!(outcome, ApprovalOutcome::Approved);
    let reloaded = store.booking(booking.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, BookingStatus::Approved);
}

#[tokio::test]
async fn approving_adjacent_bookings_succeeds() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    let first = store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    let second = store.admit(admit_request(2, day, 660, 60)).await.unwrap();

    assert_eq!(store.approve(first.id).await.unwrap(), ApprovalOutcome::Approved);
    assert_eq!(store.approve(second.id).await.unwrap(), ApprovalOutcome::Approved);
}

#[tokio::test]
async fn admission_blocks_overlap_with_pending_booking() {
    // Admission validates against pending bookings too, so two overlapping
    // requests never coexist in the active set.
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    store.admit(admit_request(1, day, 600, 60)).await.unwrap();

    let mut wide = admit_request(2, day, 630, 60);
    wide.occupy_minutes = Some(90);
    let err = store.admit(wide).await.unwrap_err();
    assert!(matches!(err, BookingError::SlotTaken(_)));
}

#[tokio::test]
async fn approve_fails_for_terminal_booking() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    let booking = store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    store
        .set_status(booking.id, BookingStatus::Rejected)
        .await
        .unwrap();

    let err = store.approve(booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));
}

#[tokio::test]
async fn approve_after_client_cancel_does_not_resurrect_booking() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    let booking = store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    assert!(store.cancel_by_client(booking.id, 1).await.unwrap());

    let err = store.approve(booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));

    let stored = store.booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::CancelledByClient);
}

#[tokio::test]
async fn cancel_by_client_enforces_ownership() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    let booking = store.admit(admit_request(1, day, 600, 60)).await.unwrap();

    assert!(!store.cancel_by_client(booking.id, 999).await.unwrap());
    assert!(store.cancel_by_client(booking.id, 1).await.unwrap());
    // Already cancelled, no longer active.
    assert!(!store.cancel_by_client(booking.id, 1).await.unwrap());

    let reloaded = store.booking(booking.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, BookingStatus::CancelledByClient);
}

#[tokio::test]
async fn cancelled_booking_frees_its_slot() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    let booking = store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    store.cancel_by_client(booking.id, 1).await.unwrap();

    let retry = store.admit(admit_request(2, day, 600, 60)).await;
    assert!(retry.is_ok());
}

#[tokio::test]
async fn set_status_rejects_illegal_transition() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    let booking = store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    let err = store
        .set_status(booking.id, BookingStatus::Completed)
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::Validation(_)));
    let reloaded = store.booking(booking.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, BookingStatus::Pending);
}

#[tokio::test]
async fn update_settings_rejects_invalid_values_without_writing() {
    let store = MemoryStore::new();
    let before = store.settings().await.unwrap();

    let err = store
        .update_settings(SettingsUpdate {
            base_grid_minutes: Some(45),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::Validation(_)));
    assert_eq!(store.settings().await.unwrap(), before);
}

#[tokio::test]
async fn update_settings_applies_partial_update() {
    let store = MemoryStore::new();

    let updated = store
        .update_settings(SettingsUpdate {
            base_grid_minutes: Some(30),
            default_work_start: Some("10:00".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.base_grid_minutes, 30);
    assert_eq!(updated.default_work_start, 600);
    // Untouched field keeps its value.
    assert_eq!(updated.extra_round_minutes, 15);
}

#[tokio::test]
async fn day_context_reflects_schedule_and_days_off() {
    let store = MemoryStore::new();
    // 2026-09-07 is a Monday.
    let monday = date(2026, 9, 7);
    let sunday = date(2026, 9, 13);

    let ctx = store.day_context(monday).await.unwrap();
    assert!(ctx.is_working);
    assert_eq!(ctx.work_start, Some(540));
    assert_eq!(ctx.work_end, Some(1140));

    assert!(!store.day_context(sunday).await.unwrap().is_working);

    store.add_day_off(monday).await.unwrap();
    assert!(!store.day_context(monday).await.unwrap().is_working);

    store.remove_day_off(monday).await.unwrap();
    assert!(store.day_context(monday).await.unwrap().is_working);
}

#[tokio::test]
async fn breaks_are_filtered_by_weekday_and_enablement() {
    let store = MemoryStore::new();

    let global = store.add_break(None, 780, 840).await.unwrap();
    let tuesday_only = store.add_break(Some(1), 600, 630).await.unwrap();

    let monday_breaks = store.breaks_for_weekday(0).await.unwrap();
    assert_eq!(monday_breaks.len(), 1);
    assert_eq!(monday_breaks[0].id, global.id);

    let tuesday_breaks = store.breaks_for_weekday(1).await.unwrap();
    assert_eq!(tuesday_breaks.len(), 2);

    store.set_break_enabled(global.id, false).await.unwrap();
    assert!(store.breaks_for_weekday(0).await.unwrap().is_empty());

    store.remove_break(tuesday_only.id).await.unwrap();
    let err = store.remove_break(tuesday_only.id).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
}

#[tokio::test]
async fn add_break_validates_interval() {
    let store = MemoryStore::new();

    let err = store.add_break(None, 840, 780).await.unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));
}

#[tokio::test]
async fn reminders_are_scheduled_and_cancelled_with_booking() {
    let store = MemoryStore::new();
    let day = Utc::now().date_naive() + Duration::days(7);

    let booking = store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    let now = Utc::now();
    let reminders = store.schedule_for_booking(&booking, now).await.unwrap();

    assert_eq!(reminders.len(), 2);
    let offsets: Vec<i64> = reminders
        .iter()
        .map(|r| {
            let start = slotbook_db::store::reminder_instant(&booking, 0);
            (start - r.remind_at).num_minutes()
        })
        .collect();
    assert_eq!(offsets, vec![120, 30]);
    assert!(reminders.iter().all(|r| r.status == ReminderStatus::Pending));

    let cancelled = store.cancel_for_booking(booking.id).await.unwrap();
    assert_eq!(cancelled, 2);
    // Nothing left pending to cancel.
    assert_eq!(store.cancel_for_booking(booking.id).await.unwrap(), 0);
}

#[tokio::test]
async fn past_reminder_offsets_are_skipped() {
    let store = MemoryStore::new();
    let day = Utc::now().date_naive() + Duration::days(7);

    let booking = store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    // Pretend it is already one hour before the appointment.
    let late = slotbook_db::store::reminder_instant(&booking, 60);
    let reminders = store.schedule_for_booking(&booking, late).await.unwrap();

    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].kind, "30m");
}

#[tokio::test]
async fn due_reminders_are_ordered_and_limited() {
    let store = MemoryStore::new();
    let day = Utc::now().date_naive() + Duration::days(7);

    let booking = store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    let reminders = store
        .schedule_for_booking(&booking, Utc::now())
        .await
        .unwrap();

    let after_start = slotbook_db::store::reminder_instant(&booking, -60);
    let due = store.due_reminders(after_start, 10).await.unwrap();
    assert_eq!(due.len(), 2);
    assert!(due[0].remind_at <= due[1].remind_at);

    store.mark_sent(reminders[0].id).await.unwrap();
    let due = store.due_reminders(after_start, 10).await.unwrap();
    assert_eq!(due.len(), 1);

    store.mark_failed(reminders[1].id, "delivery timed out").await.unwrap();
    assert!(store.due_reminders(after_start, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn count_active_requests_tracks_daily_creations() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);
    let today = Utc::now().date_naive();

    store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    store.admit(admit_request(1, day, 720, 60)).await.unwrap();
    let cancelled = store.admit(admit_request(1, day, 840, 60)).await.unwrap();
    store.cancel_by_client(cancelled.id, 1).await.unwrap();

    let count = store
        .count_active_requests_created_on(1, today)
        .await
        .unwrap();
    assert_eq!(count, 2);

    assert_eq!(
        store
            .count_active_requests_created_on(2, today)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn active_set_never_overlaps_under_mixed_workload() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);
    let settings = store.settings().await.unwrap();

    let mut client = 0i64;
    for start in (540..1140).step_by(30) {
        client += 1;
        let request = admit_request(client, day, start, 45);
        let _ = store.admit(request).await;
    }

    let first = store.active_for_date(day).await.unwrap();
    store.cancel_by_client(first[0].id, first[0].client_id).await.unwrap();
    let _ = store.admit(admit_request(900, day, first[0].start_minute, 30)).await;
    for booking in store.active_for_date(day).await.unwrap() {
        let _ = store.approve(booking.id).await;
    }

    let active = store.active_for_date(day).await.unwrap();
    for (i, a) in active.iter().enumerate() {
        for b in active.iter().skip(i + 1) {
            let (a_start, a_end) = a.occupied_interval(&settings);
            let (b_start, b_end) = b.occupied_interval(&settings);
            assert!(
                a_end <= b_start || b_end <= a_start,
                "overlap between {a_start}..{a_end} and {b_start}..{b_end}"
            );
        }
    }
}

#[tokio::test]
async fn booked_starts_include_completed_bookings() {
    let store = MemoryStore::new();
    let day = date(2026, 9, 7);

    let done = store.admit(admit_request(1, day, 600, 60)).await.unwrap();
    store.approve(done.id).await.unwrap();
    store
        .set_status(done.id, BookingStatus::Completed)
        .await
        .unwrap();

    let pending = store.admit(admit_request(2, day, 720, 60)).await.unwrap();
    let gone = store.admit(admit_request(3, day, 840, 60)).await.unwrap();
    store.cancel_by_client(gone.id, 3).await.unwrap();

    let starts = store.booked_starts_for_date(day).await.unwrap();
    assert_eq!(starts, vec![600, 720]);

    // Completed no longer blocks admission, but still shows as booked.
    let active = store.active_for_date(day).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, pending.id);
}
