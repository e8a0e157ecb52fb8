use chrono::{Datelike, NaiveDate, Utc};
use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::models::booking::{Booking, BookingStatus};
use slotbook_core::models::settings::ShopSettings;
use slotbook_core::scheduling::admission::find_conflict;
use slotbook_core::scheduling::occupancy::occupied_minutes;
use slotbook_core::scheduling::time::format_minutes;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::models::DbBooking;
use crate::store::{AdmitRequest, ApprovalOutcome};

const BOOKING_COLUMNS: &str = r#"
    id, client_id, date, start_minute, duration_minutes, occupy_minutes,
    service_code, service_name, price_text, client_name, phone, status,
    created_at, updated_at
"#;

fn db_err(err: sqlx::Error) -> BookingError {
    BookingError::Database(err.into())
}

/// Advisory lock key for a date's booking set. One key per calendar day gives
/// mutual exclusion per date without blocking other dates.
fn date_lock_key(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

async fn lock_date(conn: &mut PgConnection, date: NaiveDate) -> BookingResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(date_lock_key(date))
        .execute(conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

async fn active_rows_for_date(
    conn: &mut PgConnection,
    date: NaiveDate,
) -> BookingResult<Vec<Booking>> {
    let rows = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE date = $1 AND status IN ('pending', 'approved')
        "#
    ))
    .bind(date)
    .fetch_all(conn)
    .await
    .map_err(db_err)?;

    rows.into_iter().map(DbBooking::into_core).collect()
}

/// Atomic reserve-or-reject. Takes the per-date advisory lock, re-reads the
/// active set, re-runs the overlap check against the candidate's occupied
/// interval and only then inserts the `pending` row. The transaction either
/// commits the insert or rolls back with no partial effect.
pub async fn admit_booking(
    pool: &Pool<Postgres>,
    request: &AdmitRequest,
    settings: &ShopSettings,
) -> BookingResult<Booking> {
    let occupy = request
        .occupy_minutes
        .unwrap_or_else(|| occupied_minutes(request.duration_minutes, settings));

    let mut tx = pool.begin().await.map_err(db_err)?;
    lock_date(&mut *tx, request.date).await?;

    let active = active_rows_for_date(&mut *tx, request.date).await?;
    if find_conflict(request.start_minute, occupy, &active, settings, None).is_some() {
        tracing::debug!(
            "Admission conflict: date={}, start={}",
            request.date,
            format_minutes(request.start_minute)
        );
        return Err(BookingError::SlotTaken(format!(
            "{} {}",
            request.date,
            format_minutes(request.start_minute)
        )));
    }

    let now = Utc::now();
    let row = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        INSERT INTO bookings
            (id, client_id, date, start_minute, duration_minutes, occupy_minutes,
             service_code, service_name, price_text, client_name, phone, status,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending', $12, $12)
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(request.client_id)
    .bind(request.date)
    .bind(i32::from(request.start_minute))
    .bind(i32::from(request.duration_minutes))
    .bind(i32::from(occupy))
    .bind(request.service_code.as_deref())
    .bind(&request.service_name)
    .bind(&request.price_text)
    .bind(&request.client_name)
    .bind(&request.phone)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_err)?;

    tx.commit().await.map_err(db_err)?;
    row.into_core()
}

/// Approval transition with post-hoc conflict detection: two overlapping
/// requests may both be pending, so the winner is decided here under the same
/// per-date exclusion as admission. A losing booking is auto-rejected.
pub async fn approve_booking(
    pool: &Pool<Postgres>,
    id: Uuid,
    settings: &ShopSettings,
) -> BookingResult<ApprovalOutcome> {
    let mut tx = pool.begin().await.map_err(db_err)?;

    // Row lock before the status check: a concurrent client cancel either
    // commits first and is seen here, or blocks until this transaction ends.
    let row = sqlx::query_as::<_, DbBooking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(db_err)?
    .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {id} not found")))?;

    let booking = row.into_core()?;
    if !booking.status.can_transition_to(BookingStatus::Approved) {
        return Err(BookingError::Validation(format!(
            "Booking {id} cannot be approved from status '{}'",
            booking.status.as_str()
        )));
    }

    lock_date(&mut *tx, booking.date).await?;

    let active = active_rows_for_date(&mut *tx, booking.date).await?;
    let (candidate_start, candidate_end) = booking.occupied_interval(settings);
    let conflict = find_conflict(
        candidate_start,
        candidate_end - candidate_start,
        &active,
        settings,
        Some(booking.id),
    );

    let (next_status, outcome) = match conflict {
        Some(conflicting) => (
            BookingStatus::Rejected,
            ApprovalOutcome::RejectedConflict { conflicting },
        ),
        None => (BookingStatus::Approved, ApprovalOutcome::Approved),
    };

    sqlx::query("UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(next_status.as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

    tx.commit().await.map_err(db_err)?;
    Ok(outcome)
}

pub async fn get_booking_by_id(pool: &Pool<Postgres>, id: Uuid) -> BookingResult<Option<Booking>> {
    let row = sqlx::query_as::<_, DbBooking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_err)?;

    row.map(DbBooking::into_core).transpose()
}

pub async fn get_active_bookings_for_date(
    pool: &Pool<Postgres>,
    date: NaiveDate,
) -> BookingResult<Vec<Booking>> {
    let rows = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE date = $1 AND status IN ('pending', 'approved')
        ORDER BY start_minute
        "#
    ))
    .bind(date)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    rows.into_iter().map(DbBooking::into_core).collect()
}

pub async fn get_bookings_for_date(
    pool: &Pool<Postgres>,
    date: NaiveDate,
) -> BookingResult<Vec<Booking>> {
    let rows = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE date = $1
        ORDER BY start_minute
        "#
    ))
    .bind(date)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    rows.into_iter().map(DbBooking::into_core).collect()
}

pub async fn get_pending_bookings(pool: &Pool<Postgres>) -> BookingResult<Vec<Booking>> {
    let rows = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE status = 'pending'
        ORDER BY date, start_minute
        "#
    ))
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    rows.into_iter().map(DbBooking::into_core).collect()
}

pub async fn get_client_bookings(
    pool: &Pool<Postgres>,
    client_id: i64,
    limit: i64,
) -> BookingResult<Vec<Booking>> {
    let rows = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE client_id = $1
        ORDER BY date DESC, start_minute DESC
        LIMIT $2
        "#
    ))
    .bind(client_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    rows.into_iter().map(DbBooking::into_core).collect()
}

/// A client may cancel only their own active booking.
pub async fn cancel_booking_by_client(
    pool: &Pool<Postgres>,
    id: Uuid,
    client_id: i64,
) -> BookingResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET status = 'cancelled_by_client', updated_at = $3
        WHERE id = $1
          AND client_id = $2
          AND status IN ('pending', 'approved')
        "#,
    )
    .bind(id)
    .bind(client_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(db_err)?;

    Ok(result.rows_affected() > 0)
}

/// Guarded status transition. The update carries the set of states the target
/// may legally be entered from, so a transition that lost a race writes
/// nothing instead of overwriting a terminal state.
pub async fn update_booking_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: BookingStatus,
) -> BookingResult<Booking> {
    const STATUSES: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::Approved,
        BookingStatus::Completed,
        BookingStatus::Rejected,
        BookingStatus::CancelledByClient,
        BookingStatus::CancelledByAdmin,
    ];
    let allowed_from: Vec<String> = STATUSES
        .iter()
        .filter(|from| from.can_transition_to(status))
        .map(|from| from.as_str().to_string())
        .collect();

    let row = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        UPDATE bookings
        SET status = $2, updated_at = $3
        WHERE id = $1 AND status = ANY($4)
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status.as_str())
    .bind(Utc::now())
    .bind(&allowed_from)
    .fetch_optional(pool)
    .await
    .map_err(db_err)?;

    match row {
        Some(row) => row.into_core(),
        None => {
            let booking = get_booking_by_id(pool, id)
                .await?
                .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {id} not found")))?;
            Err(BookingError::Validation(format!(
                "Booking {id} cannot move from '{}' to '{}'",
                booking.status.as_str(),
                status.as_str()
            )))
        }
    }
}

pub async fn count_active_requests_created_on(
    pool: &Pool<Postgres>,
    client_id: i64,
    day: NaiveDate,
) -> BookingResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM bookings
        WHERE client_id = $1
          AND created_at::date = $2
          AND status IN ('pending', 'approved')
        "#,
    )
    .bind(client_id)
    .bind(day)
    .fetch_one(pool)
    .await
    .map_err(db_err)?;

    Ok(count)
}

/// Completed bookings count as booked here, unlike in slot generation.
pub async fn get_booked_starts_for_date(
    pool: &Pool<Postgres>,
    date: NaiveDate,
) -> BookingResult<Vec<u16>> {
    let starts = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT start_minute
        FROM bookings
        WHERE date = $1 AND status IN ('pending', 'approved', 'completed')
        ORDER BY start_minute
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    Ok(starts
        .into_iter()
        .filter_map(|s| u16::try_from(s).ok())
        .collect())
}
