use chrono::NaiveDate;
use eyre::Result;
use slotbook_core::models::schedule::WeekdaySchedule;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::{DbBreak, DbWeekdaySchedule};

pub async fn get_weekly_schedule(pool: &Pool<Postgres>) -> Result<Vec<DbWeekdaySchedule>> {
    let entries = sqlx::query_as::<_, DbWeekdaySchedule>(
        r#"
        SELECT weekday, is_working, work_start, work_end
        FROM weekly_schedule
        ORDER BY weekday
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn get_weekday_schedule(
    pool: &Pool<Postgres>,
    weekday: u8,
) -> Result<Option<DbWeekdaySchedule>> {
    let entry = sqlx::query_as::<_, DbWeekdaySchedule>(
        r#"
        SELECT weekday, is_working, work_start, work_end
        FROM weekly_schedule
        WHERE weekday = $1
        "#,
    )
    .bind(i16::from(weekday))
    .fetch_optional(pool)
    .await?;

    Ok(entry)
}

pub async fn upsert_weekday_schedule(
    pool: &Pool<Postgres>,
    entry: &WeekdaySchedule,
) -> Result<DbWeekdaySchedule> {
    tracing::debug!(
        "Setting weekday schedule: weekday={}, working={}, window={}-{}",
        entry.weekday,
        entry.is_working,
        entry.work_start,
        entry.work_end
    );

    let updated = sqlx::query_as::<_, DbWeekdaySchedule>(
        r#"
        INSERT INTO weekly_schedule (weekday, is_working, work_start, work_end)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (weekday) DO UPDATE SET
            is_working = EXCLUDED.is_working,
            work_start = EXCLUDED.work_start,
            work_end = EXCLUDED.work_end
        RETURNING weekday, is_working, work_start, work_end
        "#,
    )
    .bind(i16::from(entry.weekday))
    .bind(entry.is_working)
    .bind(i32::from(entry.work_start))
    .bind(i32::from(entry.work_end))
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

pub async fn add_day_off(pool: &Pool<Postgres>, date: NaiveDate) -> Result<()> {
    sqlx::query("INSERT INTO days_off (date) VALUES ($1) ON CONFLICT (date) DO NOTHING")
        .bind(date)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn remove_day_off(pool: &Pool<Postgres>, date: NaiveDate) -> Result<()> {
    sqlx::query("DELETE FROM days_off WHERE date = $1")
        .bind(date)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn get_days_off(pool: &Pool<Postgres>) -> Result<Vec<NaiveDate>> {
    let dates = sqlx::query_scalar::<_, NaiveDate>("SELECT date FROM days_off ORDER BY date")
        .fetch_all(pool)
        .await?;

    Ok(dates)
}

pub async fn add_break(
    pool: &Pool<Postgres>,
    weekday: Option<u8>,
    start_minute: u16,
    end_minute: u16,
) -> Result<DbBreak> {
    let created = sqlx::query_as::<_, DbBreak>(
        r#"
        INSERT INTO schedule_breaks (id, weekday, start_minute, end_minute, is_enabled)
        VALUES ($1, $2, $3, $4, TRUE)
        RETURNING id, weekday, start_minute, end_minute, is_enabled
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(weekday.map(i16::from))
    .bind(i32::from(start_minute))
    .bind(i32::from(end_minute))
    .fetch_one(pool)
    .await?;

    Ok(created)
}

pub async fn remove_break(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM schedule_breaks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn set_break_enabled(pool: &Pool<Postgres>, id: Uuid, enabled: bool) -> Result<bool> {
    let result = sqlx::query("UPDATE schedule_breaks SET is_enabled = $2 WHERE id = $1")
        .bind(id)
        .bind(enabled)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Breaks that apply to a weekday: weekday-specific plus global (no weekday).
pub async fn get_breaks_for_weekday(pool: &Pool<Postgres>, weekday: u8) -> Result<Vec<DbBreak>> {
    let breaks = sqlx::query_as::<_, DbBreak>(
        r#"
        SELECT id, weekday, start_minute, end_minute, is_enabled
        FROM schedule_breaks
        WHERE is_enabled AND (weekday = $1 OR weekday IS NULL)
        ORDER BY COALESCE(weekday, -1), start_minute
        "#,
    )
    .bind(i16::from(weekday))
    .fetch_all(pool)
    .await?;

    Ok(breaks)
}

pub async fn get_all_breaks(pool: &Pool<Postgres>) -> Result<Vec<DbBreak>> {
    let breaks = sqlx::query_as::<_, DbBreak>(
        r#"
        SELECT id, weekday, start_minute, end_minute, is_enabled
        FROM schedule_breaks
        ORDER BY COALESCE(weekday, -1), start_minute
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(breaks)
}
