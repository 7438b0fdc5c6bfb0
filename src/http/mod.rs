//! JSON API over the attendance service.

pub mod handlers;
pub mod identity;
pub(crate) mod request_tracing;
pub mod response;

use crate::core::service::AttendanceService;
use crate::errors::AppResult;
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AttendanceService>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(service: Arc<AttendanceService>) -> Self {
        Self {
            service,
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz_handler))
        .route("/attendance", get(handlers::list_handler))
        .route("/attendance/check-in", post(handlers::check_in_handler))
        .route("/attendance/check-out", post(handlers::check_out_handler))
        .route(
            "/attendance/daily-summary",
            get(handlers::daily_summary_handler),
        )
        .route("/attendance/me", get(handlers::me_handler))
        .route("/attendance/today", get(handlers::today_handler))
        .route("/attendance/:id/override", post(handlers::override_handler))
        .layer(from_fn_with_state(
            state.clone(),
            request_tracing::request_tracing_middleware,
        ))
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(bind: &str, state: AppState) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "attendance api listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("attendance api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for shutdown signal");
    }
}
