use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{SessionToken, User};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    active: bool,
    token: Option<String>,
    expiry: Option<String>,
    user: Option<User>,
}

impl SessionResponse {
    fn from_session(state: &AppState, session: Option<SessionToken>) -> Result<Self, AppError> {
        let user = match &session {
            Some(_) => state.session.user()?,
            None => None,
        };
        Ok(Self {
            active: session.is_some(),
            expiry: session.as_ref().map(|s| s.expiry.to_rfc3339()),
            token: session.map(|s| s.token),
            user,
        })
    }
}

// GET /api/session
pub async fn get_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.session.current(Utc::now())?;
    Ok(Json(SessionResponse::from_session(&state, session)?))
}

// POST /api/session
#[derive(Deserialize)]
pub struct LoginRequest {
    pub token: String,
    #[serde(default)]
    pub remember: bool,
    #[serde(default)]
    pub user: Option<User>,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let token = body.token.trim();
    if token.is_empty() {
        return Err(AppError::BadRequest("token is required".to_string()));
    }

    let session = state
        .session
        .login(token, body.user, body.remember, Utc::now())?;
    Ok(Json(SessionResponse::from_session(&state, Some(session))?))
}

// DELETE /api/session
pub async fn logout(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.session.logout(Utc::now())?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// POST /api/session/restore
pub async fn restore(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.session.restore(Utc::now())?;
    Ok(Json(SessionResponse::from_session(&state, session)?))
}
