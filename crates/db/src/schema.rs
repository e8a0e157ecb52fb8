use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Singleton settings row (id = 1)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shop_settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            base_grid_minutes INTEGER NOT NULL DEFAULT 60,
            short_service_threshold_minutes INTEGER NOT NULL DEFAULT 40,
            rest_minutes_after_short INTEGER NOT NULL DEFAULT 5,
            extra_round_minutes INTEGER NOT NULL DEFAULT 15,
            min_lead_minutes INTEGER NOT NULL DEFAULT 0,
            default_work_start INTEGER NOT NULL DEFAULT 540,
            default_work_end INTEGER NOT NULL DEFAULT 1140
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT INTO shop_settings (id) VALUES (1) ON CONFLICT (id) DO NOTHING;")
        .execute(pool)
        .await?;

    // Weekly schedule, one row per weekday (0 = Monday .. 6 = Sunday)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weekly_schedule (
            weekday SMALLINT PRIMARY KEY CHECK (weekday BETWEEN 0 AND 6),
            is_working BOOLEAN NOT NULL DEFAULT TRUE,
            work_start INTEGER NOT NULL DEFAULT 540,
            work_end INTEGER NOT NULL DEFAULT 1140
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Seed all seven weekdays: Mon-Sat working, Sunday off.
    sqlx::query(
        r#"
        INSERT INTO weekly_schedule (weekday, is_working)
        SELECT wd, wd <> 6 FROM generate_series(0, 6) AS wd
        ON CONFLICT (weekday) DO NOTHING;
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS days_off (
            date DATE PRIMARY KEY
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schedule_breaks (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            weekday SMALLINT NULL CHECK (weekday BETWEEN 0 AND 6),
            start_minute INTEGER NOT NULL,
            end_minute INTEGER NOT NULL,
            is_enabled BOOLEAN NOT NULL DEFAULT TRUE,
            CONSTRAINT valid_break_range CHECK (end_minute > start_minute)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            client_id BIGINT NOT NULL,
            date DATE NOT NULL,
            start_minute INTEGER NOT NULL,
            duration_minutes INTEGER NOT NULL,
            occupy_minutes INTEGER NULL,
            service_code VARCHAR(64) NULL,
            service_name VARCHAR(255) NOT NULL,
            price_text VARCHAR(255) NOT NULL,
            client_name VARCHAR(255) NOT NULL,
            phone VARCHAR(32) NOT NULL,
            status VARCHAR(32) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reminders (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            booking_id UUID NOT NULL REFERENCES bookings(id),
            remind_at TIMESTAMP WITH TIME ZONE NOT NULL,
            kind VARCHAR(16) NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            attempts INTEGER NOT NULL DEFAULT 0,
            last_error TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_bookings_date ON bookings(date);
        CREATE INDEX IF NOT EXISTS idx_bookings_client ON bookings(client_id);
        CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);
        CREATE INDEX IF NOT EXISTS idx_bookings_date_status ON bookings(date, status, start_minute);
        CREATE INDEX IF NOT EXISTS idx_breaks_weekday ON schedule_breaks(weekday);
        CREATE INDEX IF NOT EXISTS idx_reminders_status_time ON reminders(status, remind_at);
        CREATE INDEX IF NOT EXISTS idx_reminders_booking ON reminders(booking_id);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
