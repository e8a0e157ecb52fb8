use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/schedule", get(handlers::schedule::get_weekly_schedule))
        .route(
            "/api/schedule/:weekday",
            put(handlers::schedule::update_weekday_schedule),
        )
        .route("/api/days-off", get(handlers::schedule::get_days_off))
        .route("/api/days-off", post(handlers::schedule::add_day_off))
        .route(
            "/api/days-off/:date",
            delete(handlers::schedule::remove_day_off),
        )
        .route("/api/breaks", get(handlers::schedule::get_breaks))
        .route("/api/breaks", post(handlers::schedule::add_break))
        .route("/api/breaks/:id", delete(handlers::schedule::remove_break))
        .route(
            "/api/breaks/:id/enabled",
            put(handlers::schedule::set_break_enabled),
        )
        .route("/api/days/:date", get(handlers::schedule::get_day_context))
}
