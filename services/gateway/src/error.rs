//! Central error type for the HTTP surface

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::OrderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Insufficient margin")]
    MarginShortfall {
        equity: rust_decimal::Decimal,
        required: rust_decimal::Decimal,
        shortfall: rust_decimal::Decimal,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::MarginShortfall {
                equity,
                required,
                shortfall,
            } => AppError::MarginShortfall {
                equity,
                required,
                shortfall,
            },
            OrderError::NotFound { order_id } => AppError::NotFound(order_id),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "BAD_REQUEST", "message": msg }),
            ),
            // Rejection carries the numbers so the client can size down
            AppError::MarginShortfall {
                equity,
                required,
                shortfall,
            } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "INSUFFICIENT_MARGIN",
                    "message": format!("Insufficient margin: required {required}, equity {equity}"),
                    "equity": equity,
                    "required": required,
                    "shortfall": shortfall,
                }),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "NOT_FOUND", "message": msg }),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "INTERNAL_ERROR", "message": "Internal server error" }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
