//! Connection configuration for the hosted backend

use super::error::{BackendError, Result};

/// Configuration for the backend's REST and auth endpoints
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://abcd.backend-host.example`
    pub base_url: String,

    /// Anonymous key, row-level policies apply
    pub anon_key: String,

    /// Elevated-privilege key, bypasses row-level policies
    pub service_key: String,
}

impl BackendConfig {
    /// Create a configuration, rejecting obviously unusable values
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(BackendError::ValidationError(format!(
                "backend URL must be absolute: {}",
                base_url
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_key: service_key.into(),
        })
    }

    /// REST endpoint for a named table
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Endpoint resolving a session token to its user
    pub fn auth_user_url(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_format() {
        let config =
            BackendConfig::new("https://proj.backend.example", "anon", "service").unwrap();
        assert_eq!(
            config.table_url("service_requests"),
            "https://proj.backend.example/rest/v1/service_requests"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config =
            BackendConfig::new("https://proj.backend.example/", "anon", "service").unwrap();
        assert_eq!(
            config.auth_user_url(),
            "https://proj.backend.example/auth/v1/user"
        );
    }

    #[test]
    fn test_relative_url_is_rejected() {
        assert!(BackendConfig::new("proj.backend.example", "anon", "service").is_err());
    }
}
