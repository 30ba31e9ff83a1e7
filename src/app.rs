//! `Shop`: the single owner of every client-side store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Created once at startup with an API implementation and durable storage,
//! never torn down, and reset only through `sign_out` / cart `clear`. Screens
//! are opened through [`Shop::open`], which applies the route guard to
//! protected screens and loads the catalog for screens that list it.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::net::api::{AuthApi, CatalogApi};
use crate::net::types::{AccountSummary, ApiError, Product, ProductDraft, RegisterRequest, SearchQuery};
use crate::router::{Decision, History, Navigator, Role, Route, guard};
use crate::state::admin::{AdminConsole, AdminError};
use crate::state::cart::Cart;
use crate::state::catalog::{CatalogView, FetchOutcome};
use crate::state::notice::Notifications;
use crate::state::session::{SessionError, SessionStatus, SessionStore};
use crate::state::storage::KeyValueStorage;

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTER_OK: &str = "Registration successful! Please login.";
pub const REGISTER_FAILED: &str = "Registration failed. Try again.";
pub const INVALID_TOKEN: &str = "Invalid token";
pub const SESSION_NOT_SAVED: &str = "Could not save session";

#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Admin(#[from] AdminError),
}

pub struct Shop<A> {
    api: Arc<A>,
    history: Arc<History>,
    session: SessionStore,
    cart: Cart,
    catalog: CatalogView,
    notices: Notifications,
}

impl<A> Shop<A>
where
    A: AuthApi + CatalogApi + 'static,
{
    #[must_use]
    pub fn new(api: Arc<A>, storage: Arc<dyn KeyValueStorage>) -> Self {
        let history = Arc::new(History::new());
        let session = SessionStore::new(storage, history.clone());
        Self { api, history, session, cart: Cart::new(), catalog: CatalogView::new(), notices: Notifications::new() }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogView {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut CatalogView {
        &mut self.catalog
    }

    #[must_use]
    pub fn notices(&self) -> &Notifications {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notifications {
        &mut self.notices
    }

    #[must_use]
    pub fn current_route(&self) -> Route {
        self.history.current()
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Restore the persisted session without loading any screen data.
    pub fn restore_session(&mut self) -> SessionStatus {
        self.session.restore()
    }

    /// Restore the persisted session and load the landing screen.
    pub async fn start(&mut self) -> SessionStatus {
        let status = self.session.restore();
        self.load_current().await;
        status
    }

    /// Sign in and load the landing screen.
    ///
    /// # Errors
    ///
    /// See [`Shop::authenticate`].
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Role, ShopError> {
        let role = self.authenticate(email, password).await?;
        self.catalog.unmount();
        self.load_current().await;
        Ok(role)
    }

    /// Exchange credentials for a token and establish the session, without
    /// loading screen data.
    ///
    /// # Errors
    ///
    /// Returns an error (and posts a notice) when the request fails, the
    /// returned token does not decode, or it cannot be persisted.
    pub async fn authenticate(&mut self, email: &str, password: &str) -> Result<Role, ShopError> {
        let token = match self.api.login(email, password).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "login request failed");
                self.notices.error(e.user_message(LOGIN_FAILED));
                return Err(e.into());
            }
        };
        let role = match self.session.login(&token) {
            Ok(role) => role,
            Err(e) => {
                match &e {
                    SessionError::InvalidToken(_) => self.notices.error(INVALID_TOKEN),
                    SessionError::Storage(storage) => {
                        tracing::warn!(error = %storage, "could not persist session token");
                        self.notices.error(SESSION_NOT_SAVED)
                    }
                };
                return Err(e.into());
            }
        };
        Ok(role)
    }

    /// Create an account, then send the user to the login page.
    ///
    /// # Errors
    ///
    /// Returns the API error after posting a notice.
    pub async fn register(&mut self, request: &RegisterRequest) -> Result<AccountSummary, ShopError> {
        match self.api.register(request).await {
            Ok(summary) => {
                tracing::info!(role = %request.role, "account registered");
                self.notices.success(REGISTER_OK);
                self.history.navigate(Route::Login);
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                self.notices.error(REGISTER_FAILED);
                Err(e.into())
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.catalog.unmount();
        self.session.logout();
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Open a screen. Protected screens go through the route guard; a
    /// redirect lands on the login page.
    pub async fn open(&mut self, route: Route) -> Decision {
        let decision =
            if route.is_public() { Decision::Allow } else { guard(self.session.identity(), route.allowed_roles()) };

        self.catalog.unmount();
        match decision {
            Decision::Allow => self.history.navigate(route),
            Decision::RedirectLogin => {
                tracing::debug!(%route, "guard redirected to login");
                self.history.navigate(Route::Login);
            }
        }
        self.load_current().await;
        decision
    }

    async fn load_current(&mut self) {
        if matches!(self.current_route(), Route::Dashboard | Route::Admin) {
            self.catalog.refresh(self.api.as_ref(), &mut self.notices).await;
        }
    }

    // =========================================================================
    // CATALOG + CART
    // =========================================================================

    pub async fn refresh_catalog(&mut self) -> FetchOutcome {
        self.catalog.refresh(self.api.as_ref(), &mut self.notices).await
    }

    pub async fn search_catalog(&mut self, query: &SearchQuery) -> FetchOutcome {
        self.catalog.search(self.api.as_ref(), query, &mut self.notices).await
    }

    /// Put one unit of a listed product into the cart.
    ///
    /// Returns whether the cart changed.
    pub fn buy(&mut self, id: &str) -> bool {
        let Some(product) = self.catalog.find(id) else {
            self.notices.error(format!("No sweet with id {id}"));
            return false;
        };
        if !product.in_stock() {
            self.notices.error(format!("{} is out of stock", product.name));
            return false;
        }
        let name = product.name.clone();
        let added = self.cart.add(product);
        if added {
            self.notices.success(format!("Added {name} to cart"));
        }
        added
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    fn admin(&mut self) -> Result<AdminConsole<'_>, AdminError> {
        if guard(self.session.identity(), Route::Admin.allowed_roles()) == Decision::RedirectLogin {
            self.notices.error("Admin access required");
            self.catalog.unmount();
            self.history.navigate(Route::Login);
            return Err(AdminError::Forbidden);
        }
        Ok(AdminConsole::new(self.api.as_ref(), &mut self.catalog, &mut self.notices))
    }

    /// # Errors
    ///
    /// See [`AdminConsole::create`]; also [`AdminError::Forbidden`] without an
    /// admin session.
    pub async fn create_sweet(&mut self, draft: &ProductDraft) -> Result<Product, AdminError> {
        self.admin()?.create(draft).await
    }

    /// # Errors
    ///
    /// See [`AdminConsole::update`].
    pub async fn update_sweet(&mut self, id: &str, draft: &ProductDraft) -> Result<Product, AdminError> {
        self.admin()?.update(id, draft).await
    }

    /// # Errors
    ///
    /// See [`AdminConsole::delete`].
    pub async fn delete_sweet(&mut self, id: &str) -> Result<(), AdminError> {
        self.admin()?.delete(id).await
    }

    /// # Errors
    ///
    /// See [`AdminConsole::restock`].
    pub async fn restock_sweet(&mut self, id: &str, amount: i64) -> Result<Product, AdminError> {
        self.admin()?.restock(id, amount).await
    }
}
