use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Local, Utc};
use serde::Deserialize;

use super::{bearer, check_auth};
use crate::errors::AppError;
use crate::models::{BookingForm, BookingSurface, ValidationResult};
use crate::services::validation::{self, ValidationContext};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SurfaceQuery {
    #[serde(default)]
    pub context: BookingSurface,
}

// POST /api/bookings/validate
pub async fn validate_booking(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SurfaceQuery>,
    Json(form): Json<BookingForm>,
) -> Json<ValidationResult> {
    let ctx = ValidationContext::for_surface(query.context, state.config.max_stay_days);
    Json(validation::validate(&form, &ctx, Local::now().date_naive()))
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SurfaceQuery>,
    Json(form): Json<BookingForm>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let token = match query.context {
        BookingSurface::Admin => Some(check_auth(&headers, &state)?.token),
        _ => match bearer(&headers) {
            Some(token) => Some(token.to_string()),
            None => state.session.current(Utc::now())?.map(|s| s.token),
        },
    };

    let ctx = ValidationContext::for_surface(query.context, state.config.max_stay_days);
    let request = validation::build(&form, &ctx, Local::now().date_naive()).map_err(|result| {
        tracing::debug!(
            surface = query.context.as_str(),
            failing = result.field_errors.len(),
            "booking rejected by validation"
        );
        AppError::Validation(result)
    })?;

    let created = state.api.create_booking(token.as_deref(), &request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
