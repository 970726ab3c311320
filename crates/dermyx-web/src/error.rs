//! API error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dermyx_db::DbError;
use dermyx_engine::ClassifierError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Catalog unavailable: {0}")]
    Store(#[from] DbError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("Image classifier is not configured")]
    ClassifierUnavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::BAD_GATEWAY,
            ApiError::ClassifierUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Classifier(e) => match e {
                ClassifierError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ClassifierError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                ClassifierError::InvalidImage(_) | ClassifierError::InvalidRequest(_) => {
                    StatusCode::BAD_REQUEST
                }
                ClassifierError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ClassifierError::Http(_)
                | ClassifierError::Status { .. }
                | ClassifierError::Decode(_) => StatusCode::BAD_GATEWAY,
                ClassifierError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
