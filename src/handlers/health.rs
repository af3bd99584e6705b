use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::state::AppState;

// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store_ok = state
        .db
        .lock()
        .map(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).is_ok())
        .unwrap_or(false);

    Json(serde_json::json!({
        "status": if store_ok { "ok" } else { "degraded" },
        "pending_operations": state.payments.view().pending_operations,
    }))
}
