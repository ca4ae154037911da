use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    StatusCode,
};
use tracing::warn;

use crate::{
    client::{ApiRequest, ApiResponse},
    error::ApiError,
    route::{Navigator, Route, LOGIN_PATH},
    session::SessionStore,
};

/// Runs on every request before it is sent. Returning an error aborts the call.
pub trait RequestMiddleware: Send + Sync {
    fn on_request(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiRequest, ApiError>>;
}

/// Runs on every response, before the caller sees the result. Non-2xx
/// responses pass through here too; the client turns them into errors after.
pub trait ResponseMiddleware: Send + Sync {
    fn on_response(&self, response: ApiResponse) -> BoxFuture<'_, Result<ApiResponse, ApiError>>;
}

// Attaches the session's bearer token to outgoing requests
pub struct BearerAuth {
    session: Arc<SessionStore>,
}

impl BearerAuth {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }
}

impl RequestMiddleware for BearerAuth {
    fn on_request(&self, mut request: ApiRequest) -> BoxFuture<'_, Result<ApiRequest, ApiError>> {
        async move {
            let token = match self.session.get_token() {
                Some(token) => token,
                None => return Ok(request),
            };

            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::InvalidToken)?;
            value.set_sensitive(true);
            request.headers.insert(AUTHORIZATION, value);
            Ok(request)
        }
        .boxed()
    }
}

// Tears the session down on 401 and sends the view to the login page
pub struct UnauthorizedRedirect {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl UnauthorizedRedirect {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

impl ResponseMiddleware for UnauthorizedRedirect {
    fn on_response(&self, response: ApiResponse) -> BoxFuture<'_, Result<ApiResponse, ApiError>> {
        async move {
            if response.status != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            warn!(path = %response.path, "Server rejected the session, signing out");
            self.session.logout().await;

            // Already on the login page: redirecting again would loop
            if Route::parse(&self.navigator.current()) != Some(Route::Login) {
                self.navigator.navigate(LOGIN_PATH);
            }
            Ok(response)
        }
        .boxed()
    }
}
