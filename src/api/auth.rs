use tracing::{info, warn};

use crate::{
    client::HttpClient,
    error::AuthError,
    schema::{LoginSchema, RegisterSchema, TokenResponse},
    session::SessionStore,
};

pub struct AuthApi<'a> {
    client: &'a HttpClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Exchanges credentials for a bearer token. The identifier is sent as the
    /// `username` form field; the server accepts a username or an email there.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<String, AuthError> {
        let form = LoginSchema {
            username: identifier.to_string(),
            password: password.to_string(),
        };
        let response: TokenResponse = self
            .client
            .post_form("/auth/token", &form)
            .await
            .map_err(|err| {
                warn!("Login failed: {err}");
                AuthError::InvalidCredentials(err)
            })?;
        Ok(response.access_token)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), AuthError> {
        let body = RegisterSchema {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.client
            .post_json_unit("/auth/register", &body)
            .await
            .map_err(|err| {
                warn!("Registration failed: {err}");
                AuthError::RegistrationFailed(err)
            })
    }

    /// Logs in and stores the issued token in `session`.
    pub async fn sign_in(
        &self,
        identifier: &str,
        password: &str,
        session: &SessionStore,
    ) -> Result<(), AuthError> {
        let token = self.login(identifier, password).await?;
        session.login(&token).await;
        info!("Signed in");
        Ok(())
    }

    /// Registers, then signs in with the new account's email.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
        session: &SessionStore,
    ) -> Result<(), AuthError> {
        self.register(username, email, password).await?;
        let token = self
            .login(email, password)
            .await
            .map_err(|err| match err {
                AuthError::InvalidCredentials(source) | AuthError::RegistrationFailed(source) => {
                    AuthError::RegistrationFailed(source)
                }
            })?;
        session.login(&token).await;
        info!(username, "Registered and signed in");
        Ok(())
    }
}
