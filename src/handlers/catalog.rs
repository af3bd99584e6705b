use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::services::catalog::{Catalog, CatalogKind};
use crate::state::AppState;

// GET /api/catalog/nationalities
pub async fn nationalities(State(state): State<Arc<AppState>>) -> Json<Catalog> {
    Json(state.catalog.get(CatalogKind::Nationalities).await)
}

// GET /api/catalog/room_types
pub async fn room_types(State(state): State<Arc<AppState>>) -> Json<Catalog> {
    Json(state.catalog.get(CatalogKind::RoomTypes).await)
}
