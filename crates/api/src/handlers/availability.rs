use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use slotbook_core::errors::BookingError;
use slotbook_core::models::booking::{FreeSlotsResponse, MAX_SERVICE_MINUTES};
use slotbook_core::scheduling::slots::{free_starts, Now};
use slotbook_core::scheduling::time::format_minutes;

use crate::middleware::error_handling::AppError;
use crate::ApiState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub duration: u16,
}

/// Offerable start times for a service on a date: resolves the day context,
/// loads the active bookings and runs slot generation against the current
/// clock. The list is advisory; admission re-validates.
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<FreeSlotsResponse>, AppError> {
    if query.duration == 0 || query.duration > MAX_SERVICE_MINUTES {
        return Err(AppError(BookingError::Validation(format!(
            "duration must be between 1 and {MAX_SERVICE_MINUTES}"
        ))));
    }

    let settings = state.store.settings().await?;
    let day = state.store.day_context(query.date).await?;
    let active = state.store.active_for_date(query.date).await?;

    let starts = free_starts(
        query.date,
        query.duration,
        &day,
        &settings,
        &active,
        Now::current(),
    );

    Ok(Json(FreeSlotsResponse {
        date: query.date,
        duration_minutes: query.duration,
        starts: starts.into_iter().map(format_minutes).collect(),
    }))
}
