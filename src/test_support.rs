//! Shared fixtures for unit tests: token minting and an in-memory API fake.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::net::api::{AuthApi, CatalogApi};
use crate::net::types::{AccountSummary, ApiError, Product, ProductDraft, RegisterRequest, SearchQuery};

/// Mint an unsigned JWT-shaped token carrying `claims`.
pub(crate) fn make_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub(crate) fn token_for(role: &str) -> String {
    make_token(&serde_json::json!({ "sub": format!("{role}-1"), "email": format!("{role}@shop.test"), "role": role }))
}

pub(crate) fn product(id: &str, price: f64, quantity: u32) -> Product {
    Product { id: id.to_owned(), name: format!("sweet-{id}"), category: "Indian".to_owned(), price, quantity }
}

fn server_error() -> ApiError {
    ApiError::Status { status: 500, message: String::new() }
}

fn not_found() -> ApiError {
    ApiError::Status { status: 404, message: "Sweet not found".to_owned() }
}

/// In-memory stand-in for the REST backend. Records every call it receives.
#[derive(Default)]
pub(crate) struct FakeApi {
    products: Mutex<Vec<Product>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicU64,
    pub(crate) login_token: Mutex<Option<String>>,
    pub(crate) fail_reads: AtomicBool,
    pub(crate) fail_writes: AtomicBool,
    pub(crate) fail_register: AtomicBool,
}

impl FakeApi {
    pub(crate) fn with_products(products: Vec<Product>) -> Self {
        let api = Self::default();
        *api.products.lock().unwrap() = products;
        api.next_id.store(100, Ordering::SeqCst);
        api
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn products(&self) -> Vec<Product> {
        self.products.lock().unwrap().clone()
    }

    pub(crate) fn set_login_token(&self, token: Option<String>) {
        *self.login_token.lock().unwrap() = token;
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_guard(&self) -> Result<(), ApiError> {
        if self.fail_writes.load(Ordering::SeqCst) { Err(server_error()) } else { Ok(()) }
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, email: &str, _password: &str) -> Result<String, ApiError> {
        self.record(format!("login {email}"));
        self.login_token
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::Status { status: 401, message: "Invalid credentials".to_owned() })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AccountSummary, ApiError> {
        self.record(format!("register {} {}", request.email, request.role));
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 400, message: "Email already registered".to_owned() });
        }
        Ok(AccountSummary { email: Some(request.email.clone()), ..AccountSummary::default() })
    }
}

#[async_trait]
impl CatalogApi for FakeApi {
    async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.record("list".to_owned());
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.products())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>, ApiError> {
        self.record(format!("search {:?}", query.pairs()));
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        let name = query.name.clone().unwrap_or_default().to_lowercase();
        let category = query.category.clone().unwrap_or_default().to_lowercase();
        let min = query.price_min.unwrap_or(0.0);
        let max = query.price_max.unwrap_or(f64::MAX);
        Ok(self
            .products()
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&name) && p.category.to_lowercase().contains(&category))
            .filter(|p| p.price >= min && p.price <= max)
            .collect())
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        self.record(format!("create {}", draft.name));
        self.write_guard()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let product = Product {
            id,
            name: draft.name.clone(),
            category: draft.category.clone(),
            price: draft.price,
            quantity: draft.quantity,
        };
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: &str, draft: &ProductDraft) -> Result<Product, ApiError> {
        self.record(format!("update {id}"));
        self.write_guard()?;
        let mut products = self.products.lock().unwrap();
        let existing = products.iter_mut().find(|p| p.id == id).ok_or_else(not_found)?;
        existing.name.clone_from(&draft.name);
        existing.category.clone_from(&draft.category);
        existing.price = draft.price;
        existing.quantity = draft.quantity;
        Ok(existing.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("delete {id}"));
        self.write_guard()?;
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before { Err(not_found()) } else { Ok(()) }
    }

    async fn restock(&self, id: &str, amount: u32) -> Result<Product, ApiError> {
        self.record(format!("restock {id} {amount}"));
        self.write_guard()?;
        let mut products = self.products.lock().unwrap();
        let existing = products.iter_mut().find(|p| p.id == id).ok_or_else(not_found)?;
        existing.quantity += amount;
        Ok(existing.clone())
    }
}
