//! Axum-specific register route.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use waypoint_application::RegisterUseCase;
use waypoint_core::{
    DisplayName, Email, IdentityProvider, Password, ProfileDirectory, UserId, Username,
};

use crate::error::ApiError;

/// Axum register route.
///
/// Parses the request body into domain values - rejecting bad input
/// before any side effect - and drives the register use case.
#[tracing::instrument(name = "Register", skip(identity_provider, directory, request))]
pub async fn register<I, D>(
    State((identity_provider, directory)): State<(I, D)>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    I: IdentityProvider + Clone + 'static,
    D: ProfileDirectory + Clone + 'static,
{
    let email = Email::try_from(request.email)?;
    let password = Password::try_from(request.password)?;
    let username = Username::try_from(request.username)?;
    let display_name = DisplayName::try_from(request.display_name)?;

    let use_case = RegisterUseCase::new(identity_provider, directory);
    let user_id = use_case
        .execute(email, password, username, display_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            message: "Account created".to_string(),
        }),
    ))
}

/// Axum-specific request body for register
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
    pub username: String,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub message: String,
}
