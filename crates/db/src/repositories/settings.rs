use eyre::Result;
use slotbook_core::models::settings::ShopSettings;
use sqlx::{Pool, Postgres};

use crate::models::DbShopSettings;

const SETTINGS_COLUMNS: &str = r#"
    base_grid_minutes,
    short_service_threshold_minutes,
    rest_minutes_after_short,
    extra_round_minutes,
    min_lead_minutes,
    default_work_start,
    default_work_end
"#;

pub async fn get_settings(pool: &Pool<Postgres>) -> Result<DbShopSettings> {
    let settings = sqlx::query_as::<_, DbShopSettings>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM shop_settings WHERE id = 1"
    ))
    .fetch_one(pool)
    .await?;

    Ok(settings)
}

pub async fn update_settings(
    pool: &Pool<Postgres>,
    settings: &ShopSettings,
) -> Result<DbShopSettings> {
    tracing::debug!(
        "Updating shop settings: grid={}, threshold={}, rest={}, round={}, lead={}",
        settings.base_grid_minutes,
        settings.short_service_threshold_minutes,
        settings.rest_minutes_after_short,
        settings.extra_round_minutes,
        settings.min_lead_minutes
    );

    let updated = sqlx::query_as::<_, DbShopSettings>(&format!(
        r#"
        UPDATE shop_settings
        SET base_grid_minutes = $1,
            short_service_threshold_minutes = $2,
            rest_minutes_after_short = $3,
            extra_round_minutes = $4,
            min_lead_minutes = $5,
            default_work_start = $6,
            default_work_end = $7
        WHERE id = 1
        RETURNING {SETTINGS_COLUMNS}
        "#
    ))
    .bind(i32::from(settings.base_grid_minutes))
    .bind(i32::from(settings.short_service_threshold_minutes))
    .bind(i32::from(settings.rest_minutes_after_short))
    .bind(i32::from(settings.extra_round_minutes))
    .bind(i32::from(settings.min_lead_minutes))
    .bind(i32::from(settings.default_work_start))
    .bind(i32::from(settings.default_work_end))
    .fetch_one(pool)
    .await?;

    Ok(updated)
}
