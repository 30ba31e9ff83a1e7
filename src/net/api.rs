//! Auth gateway and catalog operations of the sweets REST API.
//!
//! DESIGN
//! ======
//! Both surfaces are traits so stores and screens can run against in-memory
//! fakes. The `ApiClient` implementations are one request each: no retries
//! and no optimistic updates.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use reqwest::Method;

use super::http::{ApiClient, encode_segment};
use super::types::{
    AccountSummary, ApiError, LoginRequest, Product, ProductDraft, RegisterRequest, RestockRequest, SearchQuery,
    TokenResponse,
};

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError>;

    /// Create an account. Does not sign in.
    async fn register(&self, request: &RegisterRequest) -> Result<AccountSummary, ApiError>;
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, ApiError>;
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>, ApiError>;
    async fn create(&self, draft: &ProductDraft) -> Result<Product, ApiError>;
    async fn update(&self, id: &str, draft: &ProductDraft) -> Result<Product, ApiError>;
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
    async fn restock(&self, id: &str, amount: u32) -> Result<Product, ApiError>;
}

pub(crate) const LOGIN_PATH: &str = "/auth/login";
pub(crate) const REGISTER_PATH: &str = "/auth/register";
pub(crate) const SWEETS_PATH: &str = "/sweets/";
pub(crate) const SEARCH_PATH: &str = "/sweets/search";

pub(crate) fn sweet_path(id: &str) -> String {
    format!("/sweets/{}", encode_segment(id))
}

pub(crate) fn restock_path(id: &str) -> String {
    format!("/sweets/{}/restock", encode_segment(id))
}

fn to_body<T: serde::Serialize>(body: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let body = to_body(&LoginRequest { email: email.to_owned(), password: password.to_owned() })?;
        let resp: TokenResponse = self.send_json(Method::POST, LOGIN_PATH, &[], Some(body)).await?;
        Ok(resp.token)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AccountSummary, ApiError> {
        let body = to_body(request)?;
        let text = self.send(Method::POST, REGISTER_PATH, &[], Some(body)).await?;
        if text.trim().is_empty() {
            return Ok(AccountSummary::default());
        }
        super::http::parse_json(&text)
    }
}

#[async_trait]
impl CatalogApi for ApiClient {
    async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.send_json(Method::GET, SWEETS_PATH, &[], None).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>, ApiError> {
        self.send_json(Method::GET, SEARCH_PATH, &query.pairs(), None).await
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        let body = to_body(draft)?;
        self.send_json(Method::POST, SWEETS_PATH, &[], Some(body)).await
    }

    async fn update(&self, id: &str, draft: &ProductDraft) -> Result<Product, ApiError> {
        let body = to_body(draft)?;
        self.send_json(Method::PUT, &sweet_path(id), &[], Some(body)).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, &sweet_path(id), &[], None).await?;
        Ok(())
    }

    async fn restock(&self, id: &str, amount: u32) -> Result<Product, ApiError> {
        let body = to_body(&RestockRequest { amount })?;
        self.send_json(Method::PATCH, &restock_path(id), &[], Some(body)).await
    }
}
