//! Axum-specific login route.

use axum::{Json, extract::State, response::IntoResponse};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use waypoint_application::AuthenticateUseCase;
use waypoint_core::{
    Email, IdentityProvider, ProfileDirectory, TokenSet, UserId, UserProfile,
};

use crate::error::ApiError;

/// Axum login route.
///
/// The password is passed through as an opaque secret: the complexity
/// policy applies to new credentials at registration, not to login
/// attempts.
#[tracing::instrument(name = "Login", skip(identity_provider, directory, request))]
pub async fn login<I, D>(
    State((identity_provider, directory)): State<(I, D)>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    I: IdentityProvider + Clone + 'static,
    D: ProfileDirectory + Clone + 'static,
{
    let email = Email::try_from(request.email)?;
    if request.password.expose_secret().is_empty() {
        return Err(ApiError::InvalidInput("Password is required".to_string()));
    }

    let use_case = AuthenticateUseCase::new(identity_provider, directory);
    let session = use_case.execute(email, request.password).await?;

    Ok(Json(LoginResponse {
        tokens: session.tokens,
        user: session.profile.map(LoginProfile::from),
        message: "Login successful".to_string(),
    }))
}

/// Axum-specific request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub tokens: TokenSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<LoginProfile>,
    pub message: String,
}

/// The profile fields a fresh login needs; the full record stays behind
/// the directory's own read API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginProfile {
    pub user_id: UserId,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub verified: bool,
}

impl From<UserProfile> for LoginProfile {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_id: profile.user_id,
            email: profile.email,
            username: profile.username,
            display_name: profile.display_name,
            verified: profile.verified,
        }
    }
}
