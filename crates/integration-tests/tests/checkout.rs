//! Integration tests for cart checkout against the mock sale endpoint.
//!
//! These tests run the full path: catalog load over HTTP, cart mutations
//! persisted to a file store, and the form-encoded sale submission.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use shoe_pos::api::{ApiError, CatalogQuery};
use shoe_pos::cart::{CART_STORAGE_KEY, Cart, CheckoutError};
use shoe_pos::catalog::fetch_all_pages;
use shoe_pos::store::{FileStore, KeyValueStore};
use shoe_pos_core::{UserId, VariantId};
use shoe_pos_integration_tests::{MockApi, MockData, SaleMode, ScratchDir, product};

const CASHIER: UserId = UserId::new(7);

async fn mock() -> MockApi {
    MockApi::start(MockData::with_products(vec![
        product(1, "Glide", 1, 100, 10, &[(5, 10), (6, 0)]),
        product(2, "Court", 2, 80, 25, &[(7, 3)]),
    ]))
    .await
}

// =============================================================================
// Successful Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_posts_sale_form_and_clears_persisted_cart() {
    let mock = mock().await;
    let client = mock.client();
    let catalog = fetch_all_pages(&client, &CatalogQuery::default()).await.unwrap();
    let dir = ScratchDir::new("success");

    let mut cart = Cart::load(FileStore::open(dir.store_path()).unwrap());
    cart.add(VariantId::new(5), 2, &catalog).unwrap();
    cart.add(VariantId::new(7), 1, &catalog).unwrap();

    let receipt = cart
        .checkout(CASHIER, "Ana Cruz", Decimal::new(400, 0), &catalog, &client)
        .await
        .unwrap();

    // 2 * 110 + 1 * 100
    assert_eq!(receipt.total, Decimal::new(320, 0));
    assert_eq!(receipt.change, Decimal::new(80, 0));
    assert_eq!(receipt.message, "Sale recorded");

    let sales = mock.sales();
    assert_eq!(sales.len(), 1);
    let form = &sales[0];
    assert_eq!(form["user_id"], "7");
    assert_eq!(form["customer_name"], "Ana Cruz");
    assert_eq!(form["total_amount"], "320.00");
    assert_eq!(form["cash_received"], "400.00");
    assert_eq!(form["change_amount"], "80.00");
    assert_eq!(form["items"], "5:2,7:1");

    // The emptied cart survives a restart
    let reopened = FileStore::open(dir.store_path()).unwrap();
    assert_eq!(reopened.get(CART_STORAGE_KEY).unwrap(), None);
    assert!(Cart::load(reopened).is_empty());
}

// =============================================================================
// Failed Checkout
// =============================================================================

#[tokio::test]
async fn test_server_error_keeps_cart_and_store() {
    let mock = mock().await;
    mock.set_sale_mode(SaleMode::ServerError);
    let client = mock.client();
    let catalog = fetch_all_pages(&client, &CatalogQuery::default()).await.unwrap();
    let dir = ScratchDir::new("server-error");

    let mut cart = Cart::load(FileStore::open(dir.store_path()).unwrap());
    cart.add(VariantId::new(5), 2, &catalog).unwrap();
    let before = cart.store().get(CART_STORAGE_KEY).unwrap();

    let err = cart
        .checkout(CASHIER, "Ana", Decimal::new(300, 0), &catalog, &client)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Api(ApiError::Api { status: 500, ref message }) if message == "Database error"
    ));
    assert_eq!(cart.len(), 1);
    let reopened = FileStore::open(dir.store_path()).unwrap();
    assert_eq!(reopened.get(CART_STORAGE_KEY).unwrap(), before);
}

#[tokio::test]
async fn test_rejected_sale_keeps_cart() {
    let mock = mock().await;
    mock.set_sale_mode(SaleMode::Reject("Stock changed".to_string()));
    let client = mock.client();
    let catalog = fetch_all_pages(&client, &CatalogQuery::default()).await.unwrap();
    let dir = ScratchDir::new("rejected");

    let mut cart = Cart::load(FileStore::open(dir.store_path()).unwrap());
    cart.add(VariantId::new(7), 1, &catalog).unwrap();

    let err = cart
        .checkout(CASHIER, "Ana", Decimal::new(100, 0), &catalog, &client)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Api(ApiError::Rejected(ref m)) if m == "Stock changed"));
    assert_eq!(cart.len(), 1);
    assert_eq!(mock.sales().len(), 1);
}

#[tokio::test]
async fn test_insufficient_cash_never_reaches_server() {
    let mock = mock().await;
    let client = mock.client();
    let catalog = fetch_all_pages(&client, &CatalogQuery::default()).await.unwrap();
    let dir = ScratchDir::new("short-cash");

    let mut cart = Cart::load(FileStore::open(dir.store_path()).unwrap());
    cart.add(VariantId::new(5), 2, &catalog).unwrap();

    let err = cart
        .checkout(CASHIER, "Ana", Decimal::new(100, 0), &catalog, &client)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(mock.sales().is_empty());
    assert_eq!(cart.len(), 1);
}

#[tokio::test]
async fn test_variant_removed_from_catalog_blocks_checkout_until_purged() {
    let mock = mock().await;
    let client = mock.client();
    let catalog = fetch_all_pages(&client, &CatalogQuery::default()).await.unwrap();
    let dir = ScratchDir::new("orphan");

    let mut cart = Cart::load(FileStore::open(dir.store_path()).unwrap());
    cart.add(VariantId::new(5), 1, &catalog).unwrap();
    cart.add(VariantId::new(7), 1, &catalog).unwrap();

    // Court is discontinued between loads
    mock.set_products(vec![product(1, "Glide", 1, 100, 10, &[(5, 10)])]);
    let catalog = fetch_all_pages(&client, &CatalogQuery::default()).await.unwrap();

    let summary = cart.compute_total(&catalog);
    assert_eq!(summary.orphan_ids(), vec![VariantId::new(7)]);
    assert_eq!(summary.total, Decimal::new(110, 0));

    let err = cart
        .checkout(CASHIER, "Ana", Decimal::new(500, 0), &catalog, &client)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::OrphanedLines(_)));
    assert!(mock.sales().is_empty());

    cart.purge_orphans(&catalog).unwrap();
    let receipt = cart
        .checkout(CASHIER, "Ana", Decimal::new(500, 0), &catalog, &client)
        .await
        .unwrap();
    assert_eq!(receipt.items.to_string(), "5:1");
}
