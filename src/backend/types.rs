//! Types shared across backend operations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authorization mode for a single backend operation
///
/// The backend enforces row-level policies for anonymous and session
/// calls; the service role bypasses them and is reserved for public
/// intake paths that must write on behalf of unauthenticated visitors.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// Anonymous key, row-level policies apply
    Anon,
    /// Caller's session token, row-level policies apply per user
    Session(String),
    /// Elevated-privilege key, row-level policies bypassed
    Service,
}

/// Comparison operator for a column filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Exact match
    Eq,
    /// Case-insensitive match
    ILike,
}

/// A single column filter on a table operation
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    /// Exact-match filter
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    /// Case-insensitive match filter
    pub fn ilike(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::ILike,
            value: value.into(),
        }
    }

    /// Render as a query-string pair in the backend's `op.value` form
    pub fn to_query_pair(&self) -> (String, String) {
        let op = match self.op {
            FilterOp::Eq => "eq",
            FilterOp::ILike => "ilike",
        };
        (self.column.clone(), format!("{}.{}", op, self.value))
    }
}

/// Authenticated user resolved from a session token
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Operations-dashboard profile row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub branch_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_filter_query_pair() {
        let filter = Filter::eq("status", "pending");
        assert_eq!(
            filter.to_query_pair(),
            ("status".to_string(), "eq.pending".to_string())
        );
    }

    #[test]
    fn test_ilike_filter_query_pair() {
        let filter = Filter::ilike("city", "Austin");
        assert_eq!(
            filter.to_query_pair(),
            ("city".to_string(), "ilike.Austin".to_string())
        );
    }

    #[test]
    fn test_auth_user_deserialization() {
        let user: AuthUser = serde_json::from_str(
            r#"{"id":"7c9e6679-7425-40de-944b-e07fc1f90ae7","email":"ops@example.com"}"#,
        )
        .unwrap();
        assert_eq!(user.email.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_profile_deserialization_without_branch() {
        let profile: Profile = serde_json::from_str(
            r#"{"id":"7c9e6679-7425-40de-944b-e07fc1f90ae7","full_name":"Dana Reyes","role":"manager"}"#,
        )
        .unwrap();
        assert_eq!(profile.full_name, "Dana Reyes");
        assert_eq!(profile.role, "manager");
        assert!(profile.branch_id.is_none());
    }
}
