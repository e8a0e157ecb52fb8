use std::sync::Arc;

use axum::{extract::State, Json};
use slotbook_core::models::settings::{SettingsResponse, SettingsUpdate};

use crate::middleware::error_handling::AppError;
use crate::ApiState;

pub async fn get_settings(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = state.store.settings().await?;
    Ok(Json(SettingsResponse::from(&settings)))
}

pub async fn update_settings(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<SettingsUpdate>,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = state.store.update_settings(payload).await?;
    Ok(Json(SettingsResponse::from(&settings)))
}
