use super::*;

// =============================================================
// Product
// =============================================================

#[test]
fn product_accepts_string_id() {
    let json = r#"{"id":"66a1f","name":"Ladoo","category":"Indian","price":12.5,"quantity":4}"#;
    let product: Product = serde_json::from_str(json).unwrap();
    assert_eq!(product.id, "66a1f");
    assert_eq!(product.price, 12.5);
    assert_eq!(product.quantity, 4);
    assert!(product.in_stock());
}

#[test]
fn product_accepts_integer_id() {
    let json = r#"{"id":1,"name":"Barfi","category":"Indian","price":10,"quantity":0}"#;
    let product: Product = serde_json::from_str(json).unwrap();
    assert_eq!(product.id, "1");
    assert!(!product.in_stock());
}

#[test]
fn product_rejects_negative_quantity() {
    let json = r#"{"id":"x","name":"Barfi","category":"Indian","price":10,"quantity":-1}"#;
    assert!(serde_json::from_str::<Product>(json).is_err());
}

#[test]
fn product_rejects_object_id() {
    let json = r#"{"id":{"$oid":"x"},"name":"Barfi","category":"Indian","price":10,"quantity":1}"#;
    assert!(serde_json::from_str::<Product>(json).is_err());
}

// =============================================================
// ProductDraft
// =============================================================

fn draft() -> ProductDraft {
    ProductDraft { name: "Jalebi".to_owned(), category: "Indian".to_owned(), price: 3.0, quantity: 10 }
}

#[test]
fn draft_validates_ok() {
    assert!(draft().validate().is_ok());
}

#[test]
fn draft_rejects_blank_name() {
    let mut d = draft();
    d.name = "   ".to_owned();
    assert!(d.validate().unwrap_err().contains("name"));
}

#[test]
fn draft_rejects_negative_or_nan_price() {
    let mut d = draft();
    d.price = -1.0;
    assert!(d.validate().unwrap_err().contains("price"));
    d.price = f64::NAN;
    assert!(d.validate().is_err());
}

#[test]
fn draft_allows_free_items() {
    let mut d = draft();
    d.price = 0.0;
    assert!(d.validate().is_ok());
}

#[test]
fn draft_from_product_copies_fields() {
    let product = Product {
        id: "9".to_owned(),
        name: "Peda".to_owned(),
        category: "Milk".to_owned(),
        price: 7.0,
        quantity: 2,
    };
    let d = ProductDraft::from(&product);
    assert_eq!(d.name, "Peda");
    assert_eq!(d.quantity, 2);
}

// =============================================================
// SearchQuery
// =============================================================

#[test]
fn search_query_omits_absent_fields() {
    let query = SearchQuery { name: Some("lad".to_owned()), ..SearchQuery::default() };
    assert_eq!(query.pairs(), vec![("name", "lad".to_owned())]);
}

#[test]
fn search_query_orders_all_fields() {
    let query = SearchQuery {
        name: Some("a".to_owned()),
        category: Some("b".to_owned()),
        price_min: Some(1.0),
        price_max: Some(2.5),
    };
    let keys: Vec<_> = query.pairs().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["name", "category", "price_min", "price_max"]);
}

// =============================================================
// Auth wire types
// =============================================================

#[test]
fn token_response_accepts_token_field() {
    let resp: TokenResponse = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
    assert_eq!(resp.token, "abc");
    assert_eq!(resp.token_type, None);
}

#[test]
fn token_response_accepts_access_token_field() {
    let resp: TokenResponse = serde_json::from_str(r#"{"access_token":"abc","token_type":"bearer"}"#).unwrap();
    assert_eq!(resp.token, "abc");
    assert_eq!(resp.token_type.as_deref(), Some("bearer"));
}

#[test]
fn register_request_skips_missing_admin_secret() {
    let req = RegisterRequest {
        email: "a@b.c".to_owned(),
        password: "pw".to_owned(),
        role: Role::User,
        admin_secret: None,
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json, serde_json::json!({"email": "a@b.c", "password": "pw", "role": "user"}));
}

#[test]
fn register_request_includes_admin_secret() {
    let req = RegisterRequest {
        email: "a@b.c".to_owned(),
        password: "pw".to_owned(),
        role: Role::Admin,
        admin_secret: Some("s3cret".to_owned()),
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["role"], "admin");
    assert_eq!(json["admin_secret"], "s3cret");
}

#[test]
fn account_summary_keeps_unknown_fields() {
    let summary: AccountSummary =
        serde_json::from_str(r#"{"id":7,"email":"a@b.c","role":"staff","created":"today"}"#).unwrap();
    assert_eq!(summary.id.as_deref(), Some("7"));
    assert_eq!(summary.role.as_deref(), Some("staff"));
    assert_eq!(summary.extra["created"], "today");
}

#[test]
fn account_summary_accepts_token_only_body() {
    let summary: AccountSummary = serde_json::from_str(r#"{"access_token":"t"}"#).unwrap();
    assert_eq!(summary.id, None);
    assert!(summary.extra.contains_key("access_token"));
}

// =============================================================
// Role
// =============================================================

#[test]
fn role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    assert_eq!(serde_json::from_str::<Role>("\"user\"").unwrap(), Role::User);
}

#[test]
fn role_parses_case_insensitively() {
    assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
    assert!("staff".parse::<Role>().is_err());
}

// =============================================================
// ApiError
// =============================================================

#[test]
fn user_message_prefers_server_detail() {
    let err = ApiError::Status { status: 401, message: "Invalid credentials".to_owned() };
    assert_eq!(err.user_message("Login failed"), "Invalid credentials");
}

#[test]
fn user_message_falls_back() {
    assert_eq!(ApiError::Request("refused".to_owned()).user_message("Login failed"), "Login failed");
    let err = ApiError::Status { status: 500, message: String::new() };
    assert_eq!(err.user_message("Login failed"), "Login failed");
}
