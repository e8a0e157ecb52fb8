use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use slotbook_core::errors::BookingError;
use slotbook_core::models::booking::{
    BookingRequest, BookingResponse, BookingStatus, CancelBookingRequest, MAX_SERVICE_MINUTES,
};
use slotbook_core::scheduling::time::parse_hhmm;
use slotbook_db::store::{AdmitRequest, ApprovalOutcome};
use uuid::Uuid;

use crate::middleware::error_handling::AppError;
use crate::ApiState;

/// A client may hold at most this many active requests created per calendar
/// day. Soft limit, checked before admission.
const MAX_ACTIVE_REQUESTS_PER_DAY: i64 = 1;

const DEFAULT_CLIENT_HISTORY_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ClientBookingsQuery {
    pub limit: Option<i64>,
}

pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<BookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    if payload.duration_minutes == 0 || payload.duration_minutes > MAX_SERVICE_MINUTES {
        return Err(AppError(BookingError::Validation(format!(
            "duration_minutes must be between 1 and {MAX_SERVICE_MINUTES}"
        ))));
    }

    // Bucketed by the UTC date of creation, matching how the stores count.
    let today = Utc::now().date_naive();
    let active_today = state
        .store
        .count_active_requests_created_on(payload.client_id, today)
        .await?;
    if active_today >= MAX_ACTIVE_REQUESTS_PER_DAY {
        return Err(AppError(BookingError::Validation(
            "An active request created today already exists for this client".to_string(),
        )));
    }

    let start_minute = parse_hhmm(&payload.start_time)?;
    let booking = state
        .store
        .admit(AdmitRequest {
            client_id: payload.client_id,
            date: payload.date,
            start_minute,
            duration_minutes: payload.duration_minutes,
            occupy_minutes: None,
            service_code: payload.service_code,
            service_name: payload.service_name,
            price_text: payload.price_text,
            client_name: payload.client_name,
            phone: payload.phone,
        })
        .await?;

    let reminders = state
        .store
        .schedule_for_booking(&booking, Utc::now())
        .await?;
    tracing::info!(
        "Admitted booking {} for {} at {} ({} reminders scheduled)",
        booking.id,
        booking.date,
        payload.start_time,
        reminders.len()
    );

    Ok(Json(BookingResponse::from(&booking)))
}

pub async fn get_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .store
        .booking(id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {id} not found")))?;
    Ok(Json(BookingResponse::from(&booking)))
}

pub async fn list_bookings(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = state.store.bookings_for_date(query.date).await?;
    Ok(Json(bookings.iter().map(BookingResponse::from).collect()))
}

pub async fn pending_bookings(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = state.store.pending_bookings().await?;
    Ok(Json(bookings.iter().map(BookingResponse::from).collect()))
}

pub async fn client_bookings(
    State(state): State<Arc<ApiState>>,
    Path(client_id): Path<i64>,
    Query(query): Query<ClientBookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_CLIENT_HISTORY_LIMIT);
    let bookings = state.store.client_bookings(client_id, limit).await?;
    Ok(Json(bookings.iter().map(BookingResponse::from).collect()))
}

pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let cancelled = state.store.cancel_by_client(id, payload.client_id).await?;
    if !cancelled {
        return Err(AppError(BookingError::NotFound(format!(
            "Active booking {id} owned by client {} not found",
            payload.client_id
        ))));
    }

    state.store.cancel_for_booking(id).await?;

    let booking = state
        .store
        .booking(id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {id} not found")))?;
    Ok(Json(BookingResponse::from(&booking)))
}

/// Approves a pending booking. A conflict discovered here auto-rejects the
/// booking, invalidates its reminders and surfaces as 409.
pub async fn approve_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    match state.store.approve(id).await? {
        ApprovalOutcome::Approved => {
            let booking = state
                .store
                .booking(id)
                .await?
                .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {id} not found")))?;
            Ok(Json(BookingResponse::from(&booking)))
        }
        ApprovalOutcome::RejectedConflict { conflicting } => {
            state.store.cancel_for_booking(id).await?;
            tracing::warn!(
                "Booking {} auto-rejected at approval: conflicts with {}",
                id,
                conflicting
            );
            Err(AppError(BookingError::SlotTaken(format!(
                "Booking {id} was rejected: its slot is held by booking {conflicting}"
            ))))
        }
    }
}

pub async fn reject_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.store.set_status(id, BookingStatus::Rejected).await?;
    state.store.cancel_for_booking(id).await?;
    Ok(Json(BookingResponse::from(&booking)))
}

pub async fn complete_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.store.set_status(id, BookingStatus::Completed).await?;
    Ok(Json(BookingResponse::from(&booking)))
}
