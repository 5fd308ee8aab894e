use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::common::{ApiErrorDetails, ApiErrorResponse, ApiQueryParams};
use super::error::ApiError;
use super::pool::ConnectionPoolConfig;

/// How requests authenticate. Artifactory accepts any one of these.
#[derive(Clone, PartialEq)]
pub enum Credentials {
    /// `Authorization: Bearer <token>`
    AccessToken(String),
    /// `X-JFrog-Art-Api: <key>`
    ApiKey(String),
    Basic { username: String, password: String },
}

impl Credentials {
    /// Picks the strongest credential supplied: access token, then API key,
    /// then username and password.
    pub fn resolve(
        access_token: Option<String>,
        api_key: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        if let Some(token) = non_empty(access_token) {
            return Some(Credentials::AccessToken(token));
        }
        if let Some(key) = non_empty(api_key) {
            return Some(Credentials::ApiKey(key));
        }
        match (non_empty(username), non_empty(password)) {
            (Some(username), Some(password)) => Some(Credentials::Basic { username, password }),
            _ => None,
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::AccessToken(token) => request.bearer_auth(token),
            Credentials::ApiKey(key) => request.header("X-JFrog-Art-Api", key),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::AccessToken(_) => f.write_str("AccessToken(****)"),
            Credentials::ApiKey(_) => f.write_str("ApiKey(****)"),
            Credentials::Basic { username, .. } => write!(f, "Basic({}:****)", username),
        }
    }
}

/// Artifactory API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("credentials", &self.inner.credentials)
            .finish()
    }
}

impl Client {
    /// Create a new API client with default connection settings.
    /// `endpoint` is the Artifactory base URL, e.g. `https://host/artifactory`.
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self, ApiError> {
        Self::with_config(endpoint, credentials, ConnectionPoolConfig::default())
    }

    pub fn with_config(
        endpoint: &str,
        credentials: Credentials,
        pool_config: ConnectionPoolConfig,
    ) -> Result<Self, ApiError> {
        let parsed =
            url::Url::parse(endpoint).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                endpoint
            )));
        }

        let http_client = pool_config.build_client()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: endpoint.trim_end_matches('/').to_string(),
                credentials,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Repository configuration operations
    pub fn repositories(&self) -> crate::api::repositories::RepositoriesApi<'_> {
        crate::api::repositories::RepositoriesApi::new(self)
    }

    /// Users, groups and permission targets
    pub fn security(&self) -> crate::api::security::SecurityApi<'_> {
        crate::api::security::SecurityApi::new(self)
    }

    /// Execute a GET request and decode the JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, None::<&()>).await?;
        let text = response.text().await?;
        tracing::trace!("API response body: {}", text);

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response from {}: {}", path, e);
            ApiError::ParseError(format!("{}: {}", path, e))
        })
    }

    /// Execute a GET request with query parameters
    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<T, ApiError> {
        let full_path = format!("{}{}", path, params.to_query_string());
        self.get(&full_path).await
    }

    /// Execute a PUT request. Artifactory answers writes with plain text,
    /// which is discarded.
    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.execute(Method::PUT, path, Some(body)).await.map(|_| ())
    }

    /// Execute a POST request, discarding the response body
    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.execute(Method::POST, path, Some(body)).await.map(|_| ())
    }

    /// Execute a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, None::<&()>)
            .await
            .map(|_| ())
    }

    /// Sends one request. There are no retries; network failures and error
    /// statuses go straight back to the caller.
    async fn execute<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("{} request to: {}", method, url);

        let mut request = self
            .inner
            .credentials
            .apply(self.inner.http_client.request(method, &url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("{} failed: {}", url, e);
            ApiError::RequestError(e)
        })?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status.is_success() {
            Ok(response)
        } else {
            self.handle_error_response(path, response).await
        }
    }

    async fn handle_error_response<T>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ApiError::AuthError(status.as_u16()));
        }

        let parsed = serde_json::from_str::<ApiErrorResponse>(&text).ok();
        let message = parsed
            .as_ref()
            .and_then(|body| body.message())
            .map(str::to_string)
            .unwrap_or(text);
        tracing::error!("API error response: {}", message);

        Err(ApiError::ApiError {
            status: status.as_u16(),
            message,
            details: parsed
                .filter(|body| !body.errors.is_empty())
                .map(|body| Box::new(ApiErrorDetails { errors: body.errors })),
        })
    }
}
