use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use locaspace_booking::{FieldErrors, WizardError};
use locaspace_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    InvalidFields(FieldErrors),
    NotFoundError(String),
    ConflictError(String),
    PaymentError(String),
    BackendError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, fields) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::InvalidFields(errors) => (
                StatusCode::BAD_REQUEST,
                "Some fields are invalid".to_string(),
                Some(errors),
            ),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::PaymentError(msg) => (StatusCode::PAYMENT_REQUIRED, msg, None),
            AppError::BackendError(msg) => {
                tracing::warn!("Backend failure: {}", msg);
                (StatusCode::BAD_GATEWAY, "The backend could not be reached".to_string(), None)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            }
        };

        let body = match fields {
            Some(fields) => Json(json!({ "error": error_message, "fields": fields })),
            None => Json(json!({ "error": error_message })),
        };

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => AppError::ValidationError(msg),
            CoreError::NotFound(what) => AppError::NotFoundError(format!("{} not found", what)),
            CoreError::Unauthorized(msg) => AppError::AuthenticationError(msg),
            CoreError::BackendError { status: Some(401), message } => AppError::AuthenticationError(message),
            CoreError::BackendError { status: Some(403), message } => AppError::AuthorizationError(message),
            CoreError::BackendError { .. } => AppError::BackendError(err.to_string()),
            CoreError::PaymentError(_) => AppError::PaymentError(err.user_message()),
            CoreError::StorageError(msg) | CoreError::InternalError(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Invalid(errors) => AppError::InvalidFields(errors),
            WizardError::Busy | WizardError::Finished | WizardError::NotAtPayment => {
                AppError::ConflictError(err.to_string())
            }
            WizardError::PaymentDeclined => AppError::PaymentError(err.to_string()),
            WizardError::Core(e) => e.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
