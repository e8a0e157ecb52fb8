use chrono::{DateTime, Utc};
use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::models::booking::Booking;
use slotbook_core::models::reminder::{Reminder, REMINDER_OFFSETS};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::DbReminder;
use crate::store::reminder_instant;

const REMINDER_COLUMNS: &str = r#"
    id, booking_id, remind_at, kind, status, attempts, last_error, created_at
"#;

fn db_err(err: sqlx::Error) -> BookingError {
    BookingError::Database(err.into())
}

/// Creates pending due-queue entries for a booking at each configured offset,
/// skipping offsets whose instant has already passed.
pub async fn schedule_for_booking(
    pool: &Pool<Postgres>,
    booking: &Booking,
    now: DateTime<Utc>,
) -> BookingResult<Vec<Reminder>> {
    let mut created = Vec::new();

    for (kind, offset_minutes) in REMINDER_OFFSETS {
        let remind_at = reminder_instant(booking, offset_minutes);
        if remind_at <= now {
            continue;
        }

        let row = sqlx::query_as::<_, DbReminder>(&format!(
            r#"
            INSERT INTO reminders (id, booking_id, remind_at, kind, status, attempts, created_at)
            VALUES ($1, $2, $3, $4, 'pending', 0, $5)
            RETURNING {REMINDER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(booking.id)
        .bind(remind_at)
        .bind(kind)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(db_err)?;

        created.push(row.into_core()?);
    }

    Ok(created)
}

pub async fn cancel_pending_for_booking(
    pool: &Pool<Postgres>,
    booking_id: Uuid,
) -> BookingResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE reminders
        SET status = 'canceled'
        WHERE booking_id = $1 AND status = 'pending'
        "#,
    )
    .bind(booking_id)
    .execute(pool)
    .await
    .map_err(db_err)?;

    Ok(result.rows_affected())
}

pub async fn get_due_reminders(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
    limit: i64,
) -> BookingResult<Vec<Reminder>> {
    let rows = sqlx::query_as::<_, DbReminder>(&format!(
        r#"
        SELECT {REMINDER_COLUMNS}
        FROM reminders
        WHERE status = 'pending' AND remind_at <= $1
        ORDER BY remind_at
        LIMIT $2
        "#
    ))
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    rows.into_iter().map(DbReminder::into_core).collect()
}

pub async fn mark_sent(pool: &Pool<Postgres>, id: Uuid) -> BookingResult<()> {
    sqlx::query("UPDATE reminders SET status = 'sent' WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_err)?;

    Ok(())
}

pub async fn mark_failed(pool: &Pool<Postgres>, id: Uuid, error: &str) -> BookingResult<()> {
    let truncated: String = error.chars().take(500).collect();
    sqlx::query(
        r#"
        UPDATE reminders
        SET status = 'failed', attempts = attempts + 1, last_error = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(truncated)
    .execute(pool)
    .await
    .map_err(db_err)?;

    Ok(())
}
