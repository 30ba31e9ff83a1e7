//! Session store: the bearer token and the identity decoded from it.
//!
//! DESIGN
//! ======
//! The token and identity live together in one `Session` value, so an
//! identity can never exist without the token it came from. Claims are decoded
//! from the token payload without verifying the signature or expiry; a decode
//! failure is the only invalidity the client can detect. Every successful
//! `login`/`restore` and every `logout` ends by calling the injected
//! [`Navigator`] with the landing screen.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use super::storage::{KeyValueStorage, StorageError, TOKEN_KEY};
use crate::router::{Navigator, Role, Route, landing_for};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Claims decoded from the token payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject (account id).
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Tokens without a `role` claim belong to regular users.
    #[serde(default)]
    pub role: Role,
    /// Expiry as seconds since the epoch. Informational only.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Every other claim, kept verbatim.
    #[serde(flatten)]
    pub claims: serde_json::Map<String, serde_json::Value>,
}

impl Identity {
    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.claims
            .get("username")
            .and_then(serde_json::Value::as_str)
            .or(self.email.as_deref())
            .or(self.sub.as_deref())
            .unwrap_or("User")
    }
}

/// Decode the payload segment of a JWT-shaped token into an [`Identity`].
///
/// # Errors
///
/// Returns [`SessionError::InvalidToken`] when the token is not three
/// dot-separated segments, the payload is not base64url, or the payload is
/// not a JSON object with well-typed claims.
pub fn decode_token(token: &str) -> Result<Identity, SessionError> {
    let token = token.trim();
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(SessionError::InvalidToken(format!("expected 3 segments, found {}", segments.len())));
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| SessionError::InvalidToken(format!("payload is not base64url: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| SessionError::InvalidToken(format!("payload is not valid claims: {e}")))
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    token: String,
    identity: Identity,
}

impl Session {
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Authenticated(Role),
    Unauthenticated,
}

pub struct SessionStore {
    current: Option<Session>,
    storage: Arc<dyn KeyValueStorage>,
    navigator: Arc<dyn Navigator>,
}

impl SessionStore {
    /// Create an empty store. Call [`SessionStore::restore`] to load the
    /// persisted token.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>, navigator: Arc<dyn Navigator>) -> Self {
        Self { current: None, storage, navigator }
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.current.as_ref().map(Session::identity)
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(Session::token)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.identity().map(|identity| identity.role)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.role().map_or(SessionStatus::Unauthenticated, SessionStatus::Authenticated)
    }

    /// Load the persisted token at startup.
    ///
    /// A missing token lands on the login page. A token that fails to decode
    /// clears all session state as if the user had logged out.
    pub fn restore(&mut self) -> SessionStatus {
        let stored = match self.storage.get(TOKEN_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "session storage unreadable; starting signed out");
                None
            }
        };

        let Some(token) = stored else {
            self.current = None;
            self.navigator.navigate(Route::Login);
            return SessionStatus::Unauthenticated;
        };

        match decode_token(&token) {
            Ok(identity) => {
                let role = identity.role;
                self.current = Some(Session { token, identity });
                tracing::info!(%role, "session restored");
                self.navigator.navigate(landing_for(role));
                SessionStatus::Authenticated(role)
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted token rejected");
                self.logout();
                SessionStatus::Unauthenticated
            }
        }
    }

    /// Replace the session with one built from `token`.
    ///
    /// # Errors
    ///
    /// Returns an error without touching the current session when the token
    /// does not decode or cannot be persisted.
    pub fn login(&mut self, token: &str) -> Result<Role, SessionError> {
        let identity = decode_token(token)?;
        let token = token.trim().to_owned();
        self.storage.set(TOKEN_KEY, &token)?;

        let role = identity.role;
        self.current = Some(Session { token, identity });
        tracing::info!(%role, "session authenticated");
        self.navigator.navigate(landing_for(role));
        Ok(role)
    }

    /// Clear the session in memory and in storage. Safe to call repeatedly.
    pub fn logout(&mut self) {
        self.current = None;
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to clear persisted token");
        }
        tracing::info!("session cleared");
        self.navigator.navigate(Route::Login);
    }
}
