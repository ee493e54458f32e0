use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid update: {0}")]
    InvalidUpdate(#[from] serde_json::Error),
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidUpdate(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(ErrorResponse {
            ok: false,
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
