//! Wire types for the sweets REST API.
//!
//! DESIGN
//! ======
//! Field names follow the backend's JSON exactly so request bodies and
//! responses round-trip without adapters. The backend stores ids as opaque
//! strings but fixtures and older deployments emit integers, so ids accept
//! both.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// ERRORS
// =============================================================================

/// Failure talking to the REST collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected schema.
    #[error("response parse failed: {0}")]
    Parse(String),
}

impl ApiError {
    /// Message suitable for a user notice, falling back to `fallback` when the
    /// server gave no usable detail.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_owned(),
        }
    }
}

// =============================================================================
// ROLES
// =============================================================================

/// Account role carried in the token's `role` claim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}' (expected 'user' or 'admin')")),
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// A sweet in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend identifier (opaque string).
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub category: String,
    /// Unit price; never negative.
    pub price: f64,
    /// Units in stock.
    pub quantity: u32,
}

impl Product {
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Body for `POST /sweets/` and `PUT /sweets/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: u32,
}

impl ProductDraft {
    /// Check the draft the way the admin form does before submitting.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when a field is out of range.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_owned());
        }
        if self.category.trim().is_empty() {
            return Err("category is required".to_owned());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("price must be a non-negative number, got {}", self.price));
        }
        Ok(())
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            quantity: product.quantity,
        }
    }
}

/// Body for `PATCH /sweets/{id}/restock`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RestockRequest {
    pub amount: u32,
}

/// Query for `GET /sweets/search`. Absent fields are left off the URL.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl SearchQuery {
    /// Query-string pairs in a stable order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(min) = self.price_min {
            pairs.push(("price_min", min.to_string()));
        }
        if let Some(max) = self.price_max {
            pairs.push(("price_max", max.to_string()));
        }
        pairs
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// Body for `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_secret: Option<String>,
}

/// Response of `POST /auth/login`. Some deployments answer with the OAuth
/// style `access_token` field instead of `token`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Response of `POST /auth/register`. The backend's shape varies between
/// versions, so every field is optional and unknown fields are kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// SERDE HELPERS
// =============================================================================

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        _ => Err(D::Error::custom("expected string or integer id")),
    }
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(id) => Ok(Some(id)),
        serde_json::Value::Number(number) => Ok(Some(number.to_string())),
        _ => Err(D::Error::custom("expected string or integer id")),
    }
}
