use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::store::{conflicting_field, referenced_resource, StoreError};
use crate::utils::response::error as error_response;
use crate::utils::validation::{ValidationErrors, TAKEN};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Storage error")]
    Storage(#[source] StoreError),
}

impl AppError {
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{resource} with id '{id}' was not found"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Storage(_) => "DATABASE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::Validation(errors) => debug!(%errors, "Validation failed"),
            AppError::BadRequest(msg) => debug!(message = %msg, "Bad request body"),
            AppError::Unauthorized(msg) | AppError::NotFound(msg) => {
                warn!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::Storage(e) => error!(error = ?e, "Storage error"),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => {
                let field = conflicting_field(&constraint);
                AppError::Validation(ValidationErrors::single(field, TAKEN))
            }
            StoreError::MissingReference(constraint) => AppError::NotFound(format!(
                "{} was not found",
                referenced_resource(&constraint)
            )),
            other => AppError::Storage(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        let public_message = match self {
            // Field errors go out as the bare map so clients can render them per input.
            AppError::Validation(errors) => return (status, Json(errors)).into_response(),
            AppError::BadRequest(msg) | AppError::Unauthorized(msg) | AppError::NotFound(msg) => {
                msg
            }
            AppError::Storage(_) => "A database error occurred".to_string(),
        };

        error_response(code, public_message, None, status)
    }
}
