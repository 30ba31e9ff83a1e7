//! HTTP collaborator for the sweets REST API.
//!
//! Thin reqwest wrapper. Every request reads the persisted token and attaches
//! it as a bearer credential, so call sites never handle the header. URL
//! building and response parsing are plain functions for testability.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;

use super::types::ApiError;
use crate::config::Timeouts;
use crate::state::storage::{KeyValueStorage, TOKEN_KEY};

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn KeyValueStorage>,
}

impl ApiClient {
    /// Build a client rooted at `base_url` (e.g. `http://127.0.0.1:8000/api`).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(base_url: &str, timeouts: Timeouts, storage: Arc<dyn KeyValueStorage>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), storage })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "token storage unreadable; sending request without credentials");
                None
            }
        }
    }

    /// Send a request and return the raw body of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] when no response arrives and
    /// [`ApiError::Status`] for non-success statuses.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<String, ApiError> {
        let url = join_url(&self.base_url, path);
        tracing::debug!(%method, %url, "api request");

        let mut request = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.bearer() {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(json) = body {
            request = request.json(&json);
        }

        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(%method, %url, status = status.as_u16(), "api request rejected");
            return Err(ApiError::Status { status: status.as_u16(), message: error_message(&text) });
        }
        Ok(text)
    }

    /// Send a request and deserialize the JSON response.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::send`] errors and returns [`ApiError::Parse`]
    /// when the body does not match `T`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let text = self.send(method, path, query, body).await?;
        parse_json(&text)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Percent-encode a single path segment (ids come from the server but are
/// still opaque strings).
pub(crate) fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

pub(crate) fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Extract a human-readable message from an error body.
///
/// Understands `{"detail": "..."}`, validation lists of the shape
/// `{"detail": [{"msg": "..."}]}`, and `{"message": "..."}`. Anything else
/// yields the trimmed raw body.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_owned();
    };
    match value.get("detail") {
        Some(serde_json::Value::String(detail)) => return detail.clone(),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            if !messages.is_empty() {
                return messages.join("; ");
            }
        }
        _ => {}
    }
    if let Some(message) = value.get("message").and_then(serde_json::Value::as_str) {
        return message.to_owned();
    }
    body.trim().to_owned()
}
