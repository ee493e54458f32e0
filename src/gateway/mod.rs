//! HTTP gateway (Axum) receiving Telegram webhook updates.
//!
//! Used by the `hf-relay` binary in its default (webhook) mode.

pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::telegram_webhook_handler;
pub use state::HandlerState;

use crate::inference::InferenceTransport;
use crate::telegram::ChatSender;

pub fn create_router_with_state<T, S>(state: HandlerState<T, S>) -> Router
where
    T: InferenceTransport + 'static,
    S: ChatSender + ?Sized + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/telegram_webhook", post(telegram_webhook_handler::<T, S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}
