use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::Envelope;
use service::creations::errors::StoreError;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by the store routes, rendered as `{"ok": false, "error": ..}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::CommitFailed(_)) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Numeric code for store failures; request-shape errors carry none.
    pub fn code(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest(_) => None,
            ApiError::Store(e) => Some(e.code()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let msg = self.to_string();
        if status.is_server_error() {
            error!(error = %msg, status = status.as_u16(), code = ?code, "request failed");
        } else {
            warn!(error = %msg, status = status.as_u16(), code = ?code, "request rejected");
        }
        (status, Json(Envelope::<()>::error_with_code(msg, code))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
