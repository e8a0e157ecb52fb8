use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/bookings", post(handlers::booking::create_booking))
        .route("/api/bookings", get(handlers::booking::list_bookings))
        .route(
            "/api/bookings/pending",
            get(handlers::booking::pending_bookings),
        )
        .route("/api/bookings/:id", get(handlers::booking::get_booking))
        .route(
            "/api/bookings/:id/cancel",
            post(handlers::booking::cancel_booking),
        )
        .route(
            "/api/bookings/:id/approve",
            post(handlers::booking::approve_booking),
        )
        .route(
            "/api/bookings/:id/reject",
            post(handlers::booking::reject_booking),
        )
        .route(
            "/api/bookings/:id/complete",
            post(handlers::booking::complete_booking),
        )
        .route(
            "/api/clients/:client_id/bookings",
            get(handlers::booking::client_bookings),
        )
}
