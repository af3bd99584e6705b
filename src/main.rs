use std::sync::Arc;

use axum::http::HeaderValue;
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use southcoast::config::AppConfig;
use southcoast::db;
use southcoast::handlers;
use southcoast::services::api::HttpBookingApi;
use southcoast::services::payments::spawn_poller;
use southcoast::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    tracing::info!("using remote API at {}", config.api_base_url);
    let api = Arc::new(HttpBookingApi::new(config.api_base_url.clone()));

    let state = Arc::new(AppState::new(config.clone(), conn, api));

    match state.session.restore(Utc::now())? {
        Some(session) => tracing::info!(expiry = %session.expiry, "resuming stored session"),
        None => tracing::info!("no stored session, waiting for login"),
    }

    let _poller = spawn_poller(
        state.payments.clone(),
        state.session.clone(),
        config.poll_interval,
    );

    let cors = match &config.allowed_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    };

    let app = handlers::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
