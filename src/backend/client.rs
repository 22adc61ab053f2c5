//! Backend trait and HTTP client implementation
//!
//! Every operation is a single statement against one named table; the
//! backend's row-level policies are the authorization layer. This service
//! never reasons about record contents beyond required-field checks before
//! submission.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::config::BackendConfig;
use super::error::{BackendError, Result};
use super::types::{AuthMode, AuthUser, Filter};

/// Table-oriented interface the handlers are written against.
///
/// Production code uses [`HttpBackend`]; tests substitute an in-memory
/// double.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Resolve a session token to its user. Fails with
    /// [`BackendError::AuthError`] when the token is missing or rejected.
    async fn authenticate(&self, access_token: &str) -> Result<AuthUser>;

    /// Read rows from `table` matching all `filters`.
    async fn select(&self, table: &str, filters: &[Filter], auth: &AuthMode) -> Result<Vec<Value>>;

    /// Insert one record into `table`, returning the stored row.
    async fn insert(&self, table: &str, record: &Value, auth: &AuthMode) -> Result<Value>;

    /// Update rows in `table` matching all `filters`, returning the first
    /// updated row. Fails with [`BackendError::NotFoundError`] when nothing
    /// matched.
    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: &Value,
        auth: &AuthMode,
    ) -> Result<Value>;
}

/// Client for the backend's REST query interface
pub struct HttpBackend {
    /// HTTP client for making requests
    http_client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Create a new backend client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| {
                BackendError::ConnectionError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Bearer credential for an operation: the session token when present,
    /// otherwise the key matching the requested privilege.
    fn bearer_for<'a>(&'a self, auth: &'a AuthMode) -> &'a str {
        match auth {
            AuthMode::Anon => &self.config.anon_key,
            AuthMode::Session(token) => token,
            AuthMode::Service => &self.config.service_key,
        }
    }

    /// Project key header for an operation. Session calls still present the
    /// anonymous key; only the bearer carries the user identity.
    fn api_key_for(&self, auth: &AuthMode) -> &str {
        match auth {
            AuthMode::Anon | AuthMode::Session(_) => &self.config.anon_key,
            AuthMode::Service => &self.config.service_key,
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: String,
        auth: &AuthMode,
    ) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, url)
            .header("apikey", self.api_key_for(auth))
            .header("Authorization", format!("Bearer {}", self.bearer_for(auth)))
    }

    async fn read_rows(response: reqwest::Response) -> Result<Vec<Value>> {
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| String::new());
        if !status.is_success() {
            return Err(BackendError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let rows = serde_json::from_str::<Value>(&body)?;
        match rows {
            Value::Array(rows) => Ok(rows),
            // Single-object responses are normalized to one row.
            other => Ok(vec![other]),
        }
    }
}

/// Render filters as query-string pairs
pub(crate) fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::to_query_pair).collect()
}

#[async_trait]
impl Backend for HttpBackend {
    async fn authenticate(&self, access_token: &str) -> Result<AuthUser> {
        let response = self
            .http_client
            .get(self.config.auth_user_url())
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(BackendError::AuthError(format!(
                "session rejected (status {}): {}",
                status.as_u16(),
                body
            )));
        }

        let user = response
            .json::<AuthUser>()
            .await
            .map_err(|e| BackendError::AuthError(format!("malformed user payload: {}", e)))?;
        Ok(user)
    }

    async fn select(&self, table: &str, filters: &[Filter], auth: &AuthMode) -> Result<Vec<Value>> {
        let response = self
            .request(reqwest::Method::GET, self.config.table_url(table), auth)
            .query(&filter_pairs(filters))
            .query(&[("select", "*")])
            .send()
            .await?;

        Self::read_rows(response).await
    }

    async fn insert(&self, table: &str, record: &Value, auth: &AuthMode) -> Result<Value> {
        let response = self
            .request(reqwest::Method::POST, self.config.table_url(table), auth)
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;

        let mut rows = Self::read_rows(response).await?;
        if rows.is_empty() {
            return Err(BackendError::SerializationError(
                "insert returned no representation".to_string(),
            ));
        }
        Ok(rows.remove(0))
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: &Value,
        auth: &AuthMode,
    ) -> Result<Value> {
        let response = self
            .request(reqwest::Method::PATCH, self.config.table_url(table), auth)
            .query(&filter_pairs(filters))
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;

        let mut rows = Self::read_rows(response).await?;
        if rows.is_empty() {
            return Err(BackendError::NotFoundError(format!(
                "no rows matched in {}",
                table
            )));
        }
        Ok(rows.remove(0))
    }
}
