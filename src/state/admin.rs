//! Admin console: catalog mutations with validation and notices.
//!
//! Each operation is one request. On success it posts a confirmation and
//! re-fetches the list; on failure it posts an error and leaves the list as
//! it was. Invalid input is rejected before anything is sent.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use super::catalog::CatalogView;
use super::notice::Notifications;
use crate::net::api::CatalogApi;
use crate::net::types::{ApiError, Product, ProductDraft};

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("admin role required")]
    Forbidden,
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct AdminConsole<'a> {
    api: &'a dyn CatalogApi,
    catalog: &'a mut CatalogView,
    notices: &'a mut Notifications,
}

impl<'a> AdminConsole<'a> {
    pub fn new(api: &'a dyn CatalogApi, catalog: &'a mut CatalogView, notices: &'a mut Notifications) -> Self {
        Self { api, catalog, notices }
    }

    /// # Errors
    ///
    /// Returns [`AdminError::InvalidInput`] for a bad draft (nothing sent) or
    /// [`AdminError::Api`] when the request fails.
    pub async fn create(&mut self, draft: &ProductDraft) -> Result<Product, AdminError> {
        self.check_draft(draft)?;
        let result = self.api.create(draft).await;
        let product = self.finish(result, "Sweet added", "Failed to add sweet").await?;
        tracing::info!(id = %product.id, name = %product.name, "sweet created");
        Ok(product)
    }

    /// # Errors
    ///
    /// Same as [`AdminConsole::create`].
    pub async fn update(&mut self, id: &str, draft: &ProductDraft) -> Result<Product, AdminError> {
        self.check_draft(draft)?;
        let result = self.api.update(id, draft).await;
        let product = self.finish(result, "Sweet updated", "Failed to update sweet").await?;
        tracing::info!(%id, "sweet updated");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns [`AdminError::Api`] when the request fails.
    pub async fn delete(&mut self, id: &str) -> Result<(), AdminError> {
        let result = self.api.delete(id).await;
        self.finish(result, "Sweet deleted", "Failed to delete sweet").await?;
        tracing::info!(%id, "sweet deleted");
        Ok(())
    }

    /// Add `amount` units to a product's stock.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidInput`] without sending anything when
    /// `amount` is not positive, or [`AdminError::Api`] when the request fails.
    pub async fn restock(&mut self, id: &str, amount: i64) -> Result<Product, AdminError> {
        let Some(amount) = u32::try_from(amount).ok().filter(|a| *a > 0) else {
            self.notices.error("Invalid quantity");
            return Err(AdminError::InvalidInput(format!("restock amount must be positive, got {amount}")));
        };
        let result = self.api.restock(id, amount).await;
        let product = self.finish(result, "Sweet restocked", "Failed to restock").await?;
        tracing::info!(%id, amount, quantity = product.quantity, "sweet restocked");
        Ok(product)
    }

    fn check_draft(&mut self, draft: &ProductDraft) -> Result<(), AdminError> {
        draft.validate().map_err(|reason| {
            self.notices.error(format!("Invalid sweet: {reason}"));
            AdminError::InvalidInput(reason)
        })
    }

    async fn finish<T>(&mut self, result: Result<T, ApiError>, ok: &str, failed: &str) -> Result<T, AdminError> {
        match result {
            Ok(value) => {
                self.notices.success(ok);
                self.catalog.refresh(self.api, self.notices).await;
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "{failed}");
                self.notices.error(e.user_message(failed));
                Err(e.into())
            }
        }
    }
}
