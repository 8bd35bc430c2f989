//! Wire types shared by the auth endpoints.

use serde::{Deserialize, Serialize};

/// User profile returned from the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Account creation timestamp (ISO 8601), absent on some endpoints
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response from `/auth/login` and `/auth/signup`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Response from `/auth/refresh`.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access_token: String,
}
