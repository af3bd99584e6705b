use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tokio_stream::StreamExt;

use super::check_auth;
use crate::errors::AppError;
use crate::models::{PaymentStatus, PaymentView};
use crate::state::AppState;

// GET /api/payments
pub async fn get_payments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<PaymentView>, AppError> {
    check_auth(&headers, &state)?;
    Ok(Json(state.payments.view()))
}

// POST /api/payments/refresh
pub async fn refresh_payments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<PaymentView>, AppError> {
    let session = check_auth(&headers, &state)?;
    let view = state.payments.refresh(&session.token).await?;
    Ok(Json(view))
}

// PATCH /api/payments/:booking_id/status
#[derive(Deserialize)]
pub struct StatusChange {
    pub payment_status: String,
}

pub async fn update_payment_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
    Json(body): Json<StatusChange>,
) -> Result<Json<PaymentView>, AppError> {
    let session = check_auth(&headers, &state)?;
    let status = PaymentStatus::parse(&body.payment_status).ok_or_else(|| {
        AppError::BadRequest(format!("unknown payment status: {}", body.payment_status))
    })?;

    let view = state
        .payments
        .change_status(&session.token, &booking_id, status)
        .await?;
    Ok(Json(view))
}

// GET /api/payments/events — SSE stream
#[derive(Deserialize)]
pub struct SseQuery {
    pub token: Option<String>,
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // EventSource can't set headers, so the token comes in the query
    let session = state
        .session
        .current(Utc::now())?
        .ok_or(AppError::Unauthorized)?;
    if query.token.as_deref() != Some(session.token.as_str()) {
        return Err(AppError::Unauthorized);
    }

    let current = state.payments.view();
    let catchup_stream = tokio_stream::once(Ok::<_, Infallible>(view_event(&current)));

    let live_stream = state
        .payments
        .subscribe()
        .filter_map(|result| match result {
            Ok(view) => Some(Ok(view_event(&view))),
            Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
        });

    let keepalive_stream = tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(
        Duration::from_secs(30),
    ))
    .map(|_| Ok(Event::default().comment("keepalive")));

    let combined = catchup_stream.chain(live_stream);
    let merged = StreamExt::merge(combined, keepalive_stream);

    Ok(Sse::new(merged))
}

fn view_event(view: &PaymentView) -> Event {
    let data = serde_json::to_string(view).unwrap_or_default();
    Event::default().data(data).event("payments")
}
