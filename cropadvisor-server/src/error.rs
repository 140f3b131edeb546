//! API error types

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid {0} ID format")]
    InvalidId(&'static str),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Prediction not found")]
    PredictionNotFound,

    #[error("Selected crop not found")]
    SelectedCropNotFound,

    #[error("Admin not found")]
    AdminNotFound,

    #[error("User not found.")]
    UserNotFound,

    #[error("User data not found.")]
    NoUsers,

    #[error("Crop not found.")]
    CropNotFound,

    #[error("Crop data not found.")]
    NoCrops,

    #[error("Timeline not found")]
    TimelineNotFound,

    #[error("Admin with this email already exists")]
    AdminAlreadyExists,

    #[error("User already exists.")]
    UserAlreadyExists,

    #[error("Crop already exists.")]
    CropAlreadyExists,

    #[error("Timeline already exists.")]
    TimelineAlreadyExists,

    #[error("Prediction failed: {0}")]
    Recommender(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidId(_)
            | ApiError::UserAlreadyExists
            | ApiError::CropAlreadyExists
            | ApiError::TimelineAlreadyExists => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::PredictionNotFound
            | ApiError::SelectedCropNotFound
            | ApiError::AdminNotFound
            | ApiError::UserNotFound
            | ApiError::NoUsers
            | ApiError::CropNotFound
            | ApiError::NoCrops
            | ApiError::TimelineNotFound => StatusCode::NOT_FOUND,
            ApiError::AdminAlreadyExists => StatusCode::CONFLICT,
            ApiError::Recommender(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<cropadvisor_core::Error> for ApiError {
    fn from(err: cropadvisor_core::Error) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Recommender(details) => {
                tracing::error!("Prediction failed: {}", details);
                json!({ "error": "Prediction failed", "details": details })
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({ "error": "Server error" })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, axum::Json(body)).into_response()
    }
}
