//! Types for signing in

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::deserialize_id;

/// Credentials sent to the login endpoint
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// The signed-in account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub role: Option<String>,
}

impl AuthUser {
    /// Whether the account may use the admin dashboard
    pub fn is_admin(&self) -> bool {
        self.role.as_deref().is_some_and(|r| r.eq_ignore_ascii_case("admin"))
    }
}

/// Login response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: Option<String>,

    #[serde(default)]
    pub user: Option<AuthUser>,

    #[serde(default)]
    pub message: Option<String>,
}
