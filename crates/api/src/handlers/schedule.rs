use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use slotbook_core::models::schedule::{
    BreakInterval, CreateBreakRequest, DayContextResponse, WeekdaySchedule, WeekdayScheduleUpdate,
};
use slotbook_core::scheduling::time::{format_minutes, parse_hhmm};
use uuid::Uuid;

use crate::middleware::error_handling::AppError;
use crate::ApiState;

/// Weekly schedule entry as rendered on the wire, with "HH:MM" times.
#[derive(Debug, Serialize, Deserialize)]
pub struct WeekdayScheduleResponse {
    pub weekday: u8,
    pub is_working: bool,
    pub work_start: String,
    pub work_end: String,
}

impl From<&WeekdaySchedule> for WeekdayScheduleResponse {
    fn from(entry: &WeekdaySchedule) -> Self {
        Self {
            weekday: entry.weekday,
            is_working: entry.is_working,
            work_start: format_minutes(entry.work_start),
            work_end: format_minutes(entry.work_end),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BreakResponse {
    pub id: Uuid,
    pub weekday: Option<u8>,
    pub start_time: String,
    pub end_time: String,
    pub is_enabled: bool,
}

impl From<&BreakInterval> for BreakResponse {
    fn from(interval: &BreakInterval) -> Self {
        Self {
            id: interval.id,
            weekday: interval.weekday,
            start_time: format_minutes(interval.start_minute),
            end_time: format_minutes(interval.end_minute),
            is_enabled: interval.is_enabled,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DayOffRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct BreakListQuery {
    pub weekday: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct SetBreakEnabledRequest {
    pub enabled: bool,
}

pub async fn get_weekly_schedule(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<WeekdayScheduleResponse>>, AppError> {
    let entries = state.store.weekly_schedule().await?;
    Ok(Json(entries.iter().map(WeekdayScheduleResponse::from).collect()))
}

pub async fn update_weekday_schedule(
    State(state): State<Arc<ApiState>>,
    Path(weekday): Path<u8>,
    Json(payload): Json<WeekdayScheduleUpdate>,
) -> Result<Json<WeekdayScheduleResponse>, AppError> {
    let entry = state.store.set_weekday_schedule(weekday, payload).await?;
    Ok(Json(WeekdayScheduleResponse::from(&entry)))
}

pub async fn get_days_off(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    Ok(Json(state.store.days_off().await?))
}

pub async fn add_day_off(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<DayOffRequest>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    state.store.add_day_off(payload.date).await?;
    Ok(Json(state.store.days_off().await?))
}

pub async fn remove_day_off(
    State(state): State<Arc<ApiState>>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    state.store.remove_day_off(date).await?;
    Ok(Json(state.store.days_off().await?))
}

pub async fn get_breaks(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<BreakListQuery>,
) -> Result<Json<Vec<BreakResponse>>, AppError> {
    let breaks = match query.weekday {
        Some(weekday) => state.store.breaks_for_weekday(weekday).await?,
        None => {
            let config = state.store.schedule_config().await?;
            config.breaks
        }
    };
    Ok(Json(breaks.iter().map(BreakResponse::from).collect()))
}

pub async fn add_break(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateBreakRequest>,
) -> Result<Json<BreakResponse>, AppError> {
    let start = parse_hhmm(&payload.start_time)?;
    let end = parse_hhmm(&payload.end_time)?;
    let interval = state.store.add_break(payload.weekday, start, end).await?;
    Ok(Json(BreakResponse::from(&interval)))
}

pub async fn remove_break(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.store.remove_break(id).await?;
    Ok(Json(serde_json::json!({ "removed": true })))
}

pub async fn set_break_enabled(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetBreakEnabledRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.store.set_break_enabled(id, payload.enabled).await?;
    Ok(Json(serde_json::json!({ "enabled": payload.enabled })))
}

/// Resolved working context for one calendar date: the day-off override,
/// the weekday entry and the applicable breaks folded into one shape.
pub async fn get_day_context(
    State(state): State<Arc<ApiState>>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<DayContextResponse>, AppError> {
    let ctx = state.store.day_context(date).await?;
    Ok(Json(DayContextResponse::from(&ctx)))
}
