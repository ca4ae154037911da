use std::{sync::Arc, time::Instant};

use bytes::Bytes;
use reqwest::{header::HeaderMap, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use crate::{
    config::Config,
    error::ApiError,
    middleware::{BearerAuth, RequestMiddleware, ResponseMiddleware, UnauthorizedRedirect},
    route::Navigator,
    session::SessionStore,
};

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Sent `application/x-www-form-urlencoded`; holds a flat JSON object.
    Form(Value),
}

// An outgoing call, as seen by request middleware
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body,
        }
    }
}

// A received response, as seen by response middleware
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turns a non-2xx response into an error, preferring the server's `detail`.
    pub fn into_error(self) -> ApiError {
        let message = error_message(self.status, &self.body);
        ApiError::Status {
            method: self.method,
            path: self.path,
            status: self.status,
            message,
        }
    }
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_slice::<Value>(body) {
        match obj.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(detail) => return detail.to_string(),
            None => {}
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        status.canonical_reason().unwrap_or("Request failed").to_string()
    } else {
        text
    }
}

/// The one HTTP client of the process.
///
/// Every call runs through the request middleware, goes out over `reqwest`,
/// then runs through the response middleware before any error reaches the
/// caller. There are no retries and no timeouts.
pub struct HttpClient {
    base_url: Url,
    http: reqwest::Client,
    request_middleware: Vec<Arc<dyn RequestMiddleware>>,
    response_middleware: Vec<Arc<dyn ResponseMiddleware>>,
}

impl HttpClient {
    /// A client with bearer-token injection and 401 handling installed.
    pub fn new(base_url: Url, session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self::bare(base_url)
            .with_request_middleware(BearerAuth::new(Arc::clone(&session)))
            .with_response_middleware(UnauthorizedRedirect::new(session, navigator))
    }

    pub fn from_config(
        config: &Config,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(config.api_url.clone(), session, navigator)
    }

    /// A client with no middleware at all.
    pub fn bare(base_url: Url) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
            request_middleware: Vec::new(),
            response_middleware: Vec::new(),
        }
    }

    pub fn with_request_middleware(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.request_middleware.push(Arc::new(middleware));
        self
    }

    pub fn with_response_middleware(
        mut self,
        middleware: impl ResponseMiddleware + 'static,
    ) -> Self {
        self.response_middleware.push(Arc::new(middleware));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `path` to the base URL, keeping any path prefix the base has.
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}/{}", path.trim_start_matches('/')));
        url
    }

    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        for middleware in &self.request_middleware {
            request = middleware.on_request(request).await?;
        }

        let ApiRequest {
            method,
            path,
            headers,
            body,
        } = request;

        let started = Instant::now();
        let mut builder = self
            .http
            .request(method.clone(), self.endpoint(&path))
            .headers(headers);
        builder = match &body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
        };

        let network = |source: reqwest::Error| {
            warn!(%method, %path, "Request failed before a response arrived: {source}");
            ApiError::Network {
                method: method.clone(),
                path: path.clone(),
                source,
            }
        };
        let response = builder.send().await.map_err(network)?;
        let status = response.status();
        let headers = response.headers().clone();
        // A status line without a readable body still goes through the middleware
        let (body, truncated) = match response.bytes().await {
            Ok(body) => (body, None),
            Err(source) => (Bytes::new(), Some(network(source))),
        };

        info!(
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "API request"
        );

        let mut response = ApiResponse {
            method,
            path,
            status,
            headers,
            body,
        };
        for middleware in &self.response_middleware {
            response = middleware.on_response(response).await?;
        }

        if let Some(err) = truncated {
            return Err(err);
        }
        if !response.status.is_success() {
            return Err(response.into_error());
        }
        Ok(response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::new(Method::GET, path, RequestBody::Empty))
            .await?
            .json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        self.send(ApiRequest::new(Method::POST, path, body))
            .await?
            .json()
    }

    /// POST a JSON body and ignore whatever the server answers with.
    pub async fn post_json_unit<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        self.send(ApiRequest::new(Method::POST, path, body)).await?;
        Ok(())
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        self.send(ApiRequest::new(Method::PUT, path, body))
            .await?
            .json()
    }

    pub async fn post_form<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = RequestBody::Form(serde_json::to_value(body)?);
        self.send(ApiRequest::new(Method::POST, path, body))
            .await?
            .json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::new(Method::DELETE, path, RequestBody::Empty))
            .await?;
        Ok(())
    }
}
