use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use waypoint_application::{AuthenticateError, RegisterError};
use waypoint_core::{DisplayNameError, EmailError, PasswordError, UsernameError};

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// API-level error kinds. Every use case or validation failure maps to
/// one of these; raw upstream payloads never reach the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is not confirmed")]
    AccountNotConfirmed,

    #[error("Account created, but the profile is still pending; try logging in later")]
    ProfilePending,

    #[error("Directory is temporarily unavailable")]
    DirectoryUnavailable,

    #[error("An unexpected error occurred")]
    UnexpectedError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::UnexpectedError(detail) = &self {
            tracing::error!(%detail, "request failed");
        }

        let (status_code, error_message) = match self {
            ApiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),

            ApiError::UsernameTaken | ApiError::EmailTaken => {
                (StatusCode::CONFLICT, self.to_string())
            }

            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),

            ApiError::AccountNotConfirmed => (StatusCode::FORBIDDEN, self.to_string()),

            ApiError::DirectoryUnavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),

            ApiError::ProfilePending | ApiError::UnexpectedError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status_code, body).into_response()
    }
}

impl From<EmailError> for ApiError {
    fn from(error: EmailError) -> Self {
        ApiError::InvalidInput(error.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(error: PasswordError) -> Self {
        ApiError::InvalidInput(error.to_string())
    }
}

impl From<UsernameError> for ApiError {
    fn from(error: UsernameError) -> Self {
        ApiError::InvalidInput(error.to_string())
    }
}

impl From<DisplayNameError> for ApiError {
    fn from(error: DisplayNameError) -> Self {
        ApiError::InvalidInput(error.to_string())
    }
}

impl From<RegisterError> for ApiError {
    fn from(error: RegisterError) -> Self {
        match error {
            RegisterError::UsernameTaken => ApiError::UsernameTaken,
            RegisterError::EmailTaken => ApiError::EmailTaken,
            RegisterError::IdentityProvider(e) => ApiError::UnexpectedError(e.to_string()),
            RegisterError::Directory(_) => ApiError::DirectoryUnavailable,
            RegisterError::ProfileWriteFailed { .. } => ApiError::ProfilePending,
        }
    }
}

impl From<AuthenticateError> for ApiError {
    fn from(error: AuthenticateError) -> Self {
        match error {
            AuthenticateError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthenticateError::AccountNotConfirmed => ApiError::AccountNotConfirmed,
            AuthenticateError::IdentityProvider(e) => ApiError::UnexpectedError(e.to_string()),
        }
    }
}
