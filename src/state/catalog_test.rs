use std::sync::atomic::Ordering;

use super::*;
use crate::test_support::{FakeApi, product};

fn named(id: &str, name: &str, category: &str) -> Product {
    Product { id: id.to_owned(), name: name.to_owned(), category: category.to_owned(), price: 1.0, quantity: 1 }
}

// =============================================================
// Local filter
// =============================================================

#[test]
fn empty_filter_shows_everything() {
    let mut view = CatalogView::new();
    let mut notices = Notifications::new();
    let ticket = view.begin_fetch();
    view.apply(ticket, Ok(vec![named("1", "Ladoo", "Indian"), named("2", "Brownie", "Western")]), &mut notices);
    view.set_filter("   ");
    assert_eq!(view.visible().len(), 2);
}

#[test]
fn filter_matches_name_or_category_ignoring_case() {
    let mut view = CatalogView::new();
    let mut notices = Notifications::new();
    let ticket = view.begin_fetch();
    view.apply(
        ticket,
        Ok(vec![named("1", "Ladoo", "Indian"), named("2", "Brownie", "Western"), named("3", "Kaju Katli", "indian")]),
        &mut notices,
    );

    view.set_filter("INDIAN");
    let ids: Vec<_> = view.visible().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);

    view.set_filter("brow");
    let ids: Vec<_> = view.visible().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["2"]);
    assert_eq!(view.filter(), "brow");
}

// =============================================================
// Sequencing
// =============================================================

#[test]
fn out_of_order_responses_keep_newest() {
    let mut view = CatalogView::new();
    let mut notices = Notifications::new();
    let slow = view.begin_fetch();
    let fast = view.begin_fetch();

    assert_eq!(view.apply(fast, Ok(vec![product("new", 1.0, 1)]), &mut notices), FetchOutcome::Applied(1));
    assert_eq!(view.apply(slow, Ok(vec![product("old", 1.0, 1)]), &mut notices), FetchOutcome::Stale);
    assert_eq!(view.products()[0].id, "new");
    assert!(!view.is_loading());
}

#[test]
fn unmount_drops_late_responses_silently() {
    let mut view = CatalogView::new();
    let mut notices = Notifications::new();
    let ticket = view.begin_fetch();
    assert!(view.is_loading());
    view.unmount();
    assert!(!view.is_loading());

    let outcome = view.apply(ticket, Err(ApiError::Request("late".to_owned())), &mut notices);
    assert_eq!(outcome, FetchOutcome::Stale);
    assert!(notices.is_empty());
}

#[test]
fn failed_fetch_keeps_previous_list_and_notifies() {
    let mut view = CatalogView::new();
    let mut notices = Notifications::new();
    let first = view.begin_fetch();
    view.apply(first, Ok(vec![product("1", 1.0, 1)]), &mut notices);

    let second = view.begin_fetch();
    let outcome = view.apply(second, Err(ApiError::Request("down".to_owned())), &mut notices);
    assert_eq!(outcome, FetchOutcome::Failed);
    assert_eq!(view.products().len(), 1);
    assert_eq!(notices.last().unwrap().message, FETCH_FAILED);
}

// =============================================================
// Async helpers
// =============================================================

#[tokio::test]
async fn refresh_loads_from_api() {
    let api = FakeApi::with_products(vec![product("1", 10.0, 5), product("2", 2.0, 0)]);
    let mut view = CatalogView::new();
    let mut notices = Notifications::new();
    assert_eq!(view.refresh(&api, &mut notices).await, FetchOutcome::Applied(2));
    assert_eq!(view.find("2").unwrap().quantity, 0);
    assert_eq!(api.calls(), vec!["list"]);
}

#[tokio::test]
async fn refresh_failure_notifies_once() {
    let api = FakeApi::with_products(vec![product("1", 10.0, 5)]);
    api.fail_reads.store(true, Ordering::SeqCst);
    let mut view = CatalogView::new();
    let mut notices = Notifications::new();
    assert_eq!(view.refresh(&api, &mut notices).await, FetchOutcome::Failed);
    assert!(view.products().is_empty());
    assert_eq!(notices.len(), 1);
}

#[tokio::test]
async fn search_replaces_list_with_matches() {
    let api = FakeApi::with_products(vec![named("1", "Ladoo", "Indian"), named("2", "Brownie", "Western")]);
    let mut view = CatalogView::new();
    let mut notices = Notifications::new();
    let query = SearchQuery { category: Some("west".to_owned()), ..SearchQuery::default() };
    assert_eq!(view.search(&api, &query, &mut notices).await, FetchOutcome::Applied(1));
    assert_eq!(view.products()[0].name, "Brownie");
}
