pub mod bookings;
pub mod catalog;
pub mod health;
pub mod payments;
pub mod session;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, patch, post};
use axum::Router;
use chrono::Utc;

use crate::errors::AppError;
use crate::models::SessionToken;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/bookings/validate", post(bookings::validate_booking))
        .route("/api/bookings", post(bookings::create_booking))
        .route("/api/payments", get(payments::get_payments))
        .route("/api/payments/refresh", post(payments::refresh_payments))
        .route("/api/payments/events", get(payments::events_stream))
        .route(
            "/api/payments/:booking_id/status",
            patch(payments::update_payment_status),
        )
        .route(
            "/api/session",
            get(session::get_session)
                .post(session::login)
                .delete(session::logout),
        )
        .route("/api/session/restore", post(session::restore))
        .route(
            "/api/catalog/nationalities",
            get(catalog::nationalities),
        )
        .route("/api/catalog/room_types", get(catalog::room_types))
        .with_state(state)
}

pub(crate) fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// The caller must present the token of the active session.
pub(crate) fn check_auth(headers: &HeaderMap, state: &AppState) -> Result<SessionToken, AppError> {
    let session = state
        .session
        .current(Utc::now())?
        .ok_or(AppError::Unauthorized)?;
    match bearer(headers) {
        Some(token) if token == session.token => Ok(session),
        _ => Err(AppError::Unauthorized),
    }
}
