//! Screen routing and role-gated access decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected screen is opened through [`guard`], which maps the current
//! identity and the screen's allowed roles to a [`Decision`]. Session changes
//! report where the user should land through the [`Navigator`] hook.
//!
//! Role checks here only decide what the client shows. The token's claims are
//! decoded without signature verification, so the backend must authorize
//! every request on its own.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::fmt;
use std::sync::Mutex;

pub use crate::net::types::Role;
use crate::state::session::Identity;

const SIGNED_IN: &[Role] = &[Role::User, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Screens of the storefront and admin console.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Login,
    Register,
    Dashboard,
    Cart,
    Admin,
    NotFound,
}

impl Route {
    /// Resolve a path. `/` is an alias for the login page; unknown paths map
    /// to `NotFound`.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = trimmed.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(trimmed);
        match normalized {
            "/" | "/login" => Self::Login,
            "/register" => Self::Register,
            "/dashboard" => Self::Dashboard,
            "/cart" => Self::Cart,
            "/admin" => Self::Admin,
            _ => Self::NotFound,
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Cart => "/cart",
            Self::Admin => "/admin",
            Self::NotFound => "/404",
        }
    }

    /// Roles admitted to this screen. Empty means public.
    #[must_use]
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::Login | Self::Register | Self::NotFound => &[],
            Self::Dashboard | Self::Cart => SIGNED_IN,
            Self::Admin => ADMIN_ONLY,
        }
    }

    #[must_use]
    pub fn is_public(self) -> bool {
        self.allowed_roles().is_empty()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where a freshly authenticated user lands.
#[must_use]
pub fn landing_for(role: Role) -> Route {
    match role {
        Role::Admin => Route::Admin,
        Role::User => Route::Dashboard,
    }
}

// =============================================================================
// GUARD
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectLogin,
}

/// Decide whether `identity` may open a screen admitting `allowed`.
///
/// No session always redirects, even for public screens. A signed-in user
/// whose role is not admitted is also sent to the login page rather than a
/// forbidden page.
#[must_use]
pub fn guard(identity: Option<&Identity>, allowed: &[Role]) -> Decision {
    let Some(identity) = identity else {
        return Decision::RedirectLogin;
    };
    if !allowed.is_empty() && !allowed.contains(&identity.role) {
        return Decision::RedirectLogin;
    }
    Decision::Allow
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// Post-mutation hook invoked after session changes and guard redirects.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that records every visited route; the last entry is the
/// current screen.
#[derive(Debug, Default)]
pub struct History {
    visited: Mutex<Vec<Route>>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current screen, or `Login` before any navigation happened.
    #[must_use]
    pub fn current(&self) -> Route {
        self.visited().last().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<Route> {
        self.visited().clone()
    }

    fn visited(&self) -> std::sync::MutexGuard<'_, Vec<Route>> {
        self.visited.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route) {
        tracing::debug!(route = %route, "navigate");
        self.visited().push(route);
    }
}
