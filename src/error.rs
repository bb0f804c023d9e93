//! Errors surfaced to callers of the song library.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("bad request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("upstream returned malformed data: {0}")]
    UpstreamMalformed(String),

    #[error("storage failure: {0}")]
    StorageFailure(#[from] anyhow::Error),

    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::InvalidRequest(_) | CatalogError::InvalidDateFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::UpstreamUnavailable(_)
            | CatalogError::UpstreamMalformed(_)
            | CatalogError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        }
        // Storage details stay in the log.
        let message = match &self {
            CatalogError::StorageFailure(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        (status, message).into_response()
    }
}
