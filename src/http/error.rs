use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::domain::order::OrderError;
use crate::domain::product::ProductError;
use crate::domain::user::UserError;

// ============================================================================
// API Error
// ============================================================================
//
// Every handler failure maps onto one of these. The wire shape is always
// `{"message": ...}` with the matching status code; unexpected failures
// surface as a generic 500 and the cause goes to the log, not the caller.
//
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(source) = self {
            tracing::error!(error = %source, "Unhandled failure");
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string(),
        }))
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::NotFound | OrderError::ProductNotFound(_) => ApiError::NotFound(message),
            _ => ApiError::BadRequest(message),
        }
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        let message = err.to_string();
        match err {
            ProductError::NotFound => ApiError::NotFound(message),
            _ => ApiError::BadRequest(message),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
