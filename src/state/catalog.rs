//! Catalog view state: the fetched product list and the local filter.
//!
//! DESIGN
//! ======
//! Fetching is split into `begin_fetch` (issue a ticket) and `apply` (accept
//! the response only if its ticket is still current), so concurrent fetches
//! resolve newest-wins regardless of arrival order. A failed read keeps the
//! previous list on screen and posts an error notice; nothing is retried.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use super::notice::Notifications;
use super::sequence::{RequestSequencer, RequestTicket};
use crate::net::api::CatalogApi;
use crate::net::types::{ApiError, Product, SearchQuery};

pub const FETCH_FAILED: &str = "Failed to fetch sweets";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the list; carries the new length.
    Applied(usize),
    /// The request failed; the previous list is still shown.
    Failed,
    /// A newer request or an unmount superseded this one.
    Stale,
}

#[derive(Clone, Debug, Default)]
pub struct CatalogView {
    products: Vec<Product>,
    filter: String,
    loading: bool,
    sequencer: RequestSequencer,
}

impl CatalogView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Products whose name or category contains the filter, ignoring case.
    #[must_use]
    pub fn visible(&self) -> Vec<&Product> {
        let needle = self.filter.trim().to_lowercase();
        if needle.is_empty() {
            return self.products.iter().collect();
        }
        self.products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle) || p.category.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn begin_fetch(&mut self) -> RequestTicket {
        self.loading = true;
        self.sequencer.issue()
    }

    pub fn apply(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<Product>, ApiError>,
        notices: &mut Notifications,
    ) -> FetchOutcome {
        if !self.sequencer.is_current(ticket) {
            tracing::debug!(ticket = ticket.value(), "discarding stale catalog response");
            return FetchOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(products) => {
                let count = products.len();
                self.products = products;
                FetchOutcome::Applied(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog fetch failed");
                notices.error(e.user_message(FETCH_FAILED));
                FetchOutcome::Failed
            }
        }
    }

    /// Re-fetch the full catalog.
    pub async fn refresh(&mut self, api: &dyn CatalogApi, notices: &mut Notifications) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let result = api.list().await;
        self.apply(ticket, result, notices)
    }

    /// Replace the list with server-side search results.
    pub async fn search(
        &mut self,
        api: &dyn CatalogApi,
        query: &SearchQuery,
        notices: &mut Notifications,
    ) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let result = api.search(query).await;
        self.apply(ticket, result, notices)
    }

    /// The screen showing this list went away; late responses are ignored.
    pub fn unmount(&mut self) {
        self.sequencer.invalidate();
        self.loading = false;
    }
}
