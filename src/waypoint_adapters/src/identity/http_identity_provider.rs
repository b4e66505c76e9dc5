use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use waypoint_core::{
    Email, IdentityProvider, IdentityProviderError, Password, TokenSet, UserId, Username,
};

const PROVIDER_AUTH_HEADER: &str = "X-Provider-Api-Token";

/// Client for the identity provider's admin API.
///
/// The wire contract mirrors the hosted deployment: account management is
/// keyed by provider username, credential checks go through `/sessions`.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    http_client: Client,
    base_url: String,
    api_token: Secret<String>,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String, api_token: Secret<String>, http_client: Client) -> Self {
        Self {
            http_client,
            base_url,
            api_token,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityProviderError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| IdentityProviderError::UnexpectedError(e.to_string()))?;
        base.join(path)
            .map_err(|e| IdentityProviderError::UnexpectedError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[tracing::instrument(name = "Creating provider account", skip_all, fields(username = %username))]
    async fn create_account(
        &self,
        username: &Username,
        email: &Email,
        user_id: &UserId,
    ) -> Result<(), IdentityProviderError> {
        let url = self.endpoint("/accounts")?;

        let request_body = CreateAccountRequest {
            username: username.as_str(),
            email: email.as_ref().expose_secret(),
            user_id: user_id.to_string(),
        };

        let response = self
            .http_client
            .post(url)
            .header(PROVIDER_AUTH_HEADER, self.api_token.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(unexpected)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(IdentityProviderError::AccountAlreadyExists),
            status => Err(status_error(status)),
        }
    }

    #[tracing::instrument(name = "Setting permanent credential", skip_all, fields(username = %username))]
    async fn set_permanent_password(
        &self,
        username: &Username,
        password: &Password,
    ) -> Result<(), IdentityProviderError> {
        let url = self.endpoint(&format!("/accounts/{}/password", username.as_str()))?;

        let request_body = SetPasswordRequest {
            password: password.as_ref().expose_secret(),
            permanent: true,
        };

        let response = self
            .http_client
            .put(url)
            .header(PROVIDER_AUTH_HEADER, self.api_token.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(unexpected)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(IdentityProviderError::AccountNotFound),
            status => Err(status_error(status)),
        }
    }

    #[tracing::instrument(name = "Deleting provider account", skip_all, fields(username = %username))]
    async fn delete_account(&self, username: &Username) -> Result<(), IdentityProviderError> {
        let url = self.endpoint(&format!("/accounts/{}", username.as_str()))?;

        let response = self
            .http_client
            .delete(url)
            .header(PROVIDER_AUTH_HEADER, self.api_token.expose_secret())
            .send()
            .await
            .map_err(unexpected)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(IdentityProviderError::AccountNotFound),
            status => Err(status_error(status)),
        }
    }

    #[tracing::instrument(name = "Verifying credentials", skip_all)]
    async fn verify_credentials(
        &self,
        email: &Email,
        password: &Secret<String>,
    ) -> Result<TokenSet, IdentityProviderError> {
        let url = self.endpoint("/sessions")?;

        let request_body = StartSessionRequest {
            email: email.as_ref().expose_secret(),
            password: password.expose_secret(),
        };

        let response = self
            .http_client
            .post(url)
            .header(PROVIDER_AUTH_HEADER, self.api_token.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(unexpected)?;

        match response.status() {
            status if status.is_success() => {
                let session: SessionResponse = response.json().await.map_err(unexpected)?;
                Ok(TokenSet {
                    access_token: session.access_token,
                    id_token: session.id_token,
                    refresh_token: session.refresh_token,
                })
            }
            StatusCode::UNAUTHORIZED => Err(IdentityProviderError::IncorrectCredentials),
            StatusCode::FORBIDDEN => Err(IdentityProviderError::AccountNotConfirmed),
            StatusCode::NOT_FOUND => Err(IdentityProviderError::AccountNotFound),
            status => Err(status_error(status)),
        }
    }
}

fn unexpected(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::UnexpectedError(error.to_string())
}

fn status_error(status: StatusCode) -> IdentityProviderError {
    IdentityProviderError::UnexpectedError(format!("provider returned {status}"))
}

#[derive(Debug, Serialize)]
struct CreateAccountRequest<'a> {
    username: &'a str,
    email: &'a str,
    user_id: String,
}

#[derive(Debug, Serialize)]
struct SetPasswordRequest<'a> {
    password: &'a str,
    permanent: bool,
}

#[derive(Debug, Serialize)]
struct StartSessionRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: String,
    id_token: String,
    refresh_token: Option<String>,
}
