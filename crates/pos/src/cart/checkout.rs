//! Checkout: validate the cart, record the sale, clear the cart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shoe_pos_core::{SaleItems, UserId, round_currency};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{Cart, CheckoutError, PricedLine};
use crate::api::{SaleRecorder, SaleSubmission};
use crate::catalog::Catalog;
use crate::store::KeyValueStore;

/// Record of a completed sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Local id for correlating logs with this checkout.
    pub checkout_id: Uuid,
    pub customer_name: String,
    pub lines: Vec<PricedLine>,
    /// Order total, rounded to currency precision.
    pub total: Decimal,
    pub cash_received: Decimal,
    pub change: Decimal,
    pub items: SaleItems,
    /// Confirmation message from the server.
    pub message: String,
    pub completed_at: DateTime<Utc>,
}

impl<S: KeyValueStore> Cart<S> {
    /// Sell the cart.
    ///
    /// Validation runs first and makes no network call:
    /// the customer name must be non-blank, the cart non-empty, every line
    /// present in `catalog`, and `cash_received` at least the rounded total.
    ///
    /// On success the cart is emptied and persisted. If recording fails the
    /// cart is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - `MissingCustomerName`, `EmptyCart`, `OrphanedLines`, `InsufficientCash` on validation failure
    /// - `Api` if the sale could not be recorded
    /// - `NotCleared` if the sale was recorded but the empty cart could not be persisted
    #[instrument(skip(self, customer_name, catalog, recorder), fields(lines = self.len(), checkout_id = tracing::field::Empty))]
    pub async fn checkout<R: SaleRecorder + Sync>(
        &mut self,
        cashier: UserId,
        customer_name: &str,
        cash_received: Decimal,
        catalog: &Catalog,
        recorder: &R,
    ) -> Result<Receipt, CheckoutError> {
        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(CheckoutError::MissingCustomerName);
        }
        if self.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let summary = self.compute_total(catalog);
        if summary.has_orphans() {
            warn!(orphans = summary.orphans.len(), "Checkout blocked by orphaned lines");
            return Err(CheckoutError::OrphanedLines(summary.orphan_ids()));
        }

        let total = round_currency(summary.total);
        if cash_received < total {
            return Err(CheckoutError::InsufficientCash {
                total,
                received: cash_received,
            });
        }
        let change = cash_received - total;

        let checkout_id = Uuid::new_v4();
        tracing::Span::current().record("checkout_id", tracing::field::display(checkout_id));

        let items: SaleItems = self.lines().iter().collect();
        let submission = SaleSubmission {
            user_id: cashier,
            customer_name: customer_name.to_string(),
            total_amount: total,
            cash_received,
            change_amount: change,
            items: items.clone(),
        };

        let message = recorder.record_sale(&submission).await.inspect_err(|e| {
            error!(error = %e, "Sale submission failed, cart kept");
        })?;

        let receipt = Receipt {
            checkout_id,
            customer_name: submission.customer_name,
            lines: summary.lines,
            total,
            cash_received,
            change,
            items,
            message,
            completed_at: Utc::now(),
        };

        if let Err(e) = self.clear() {
            error!(error = %e, "Sale recorded but cart could not be cleared");
            return Err(CheckoutError::NotCleared(e));
        }

        info!(total = %receipt.total, change = %receipt.change, "Checkout complete");
        Ok(receipt)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use shoe_pos_core::{CartLine, VariantId};

    use super::*;
    use crate::api::ApiError;
    use crate::cart::CART_STORAGE_KEY;
    use crate::catalog::fixtures::{product, variant};
    use crate::store::MemoryStore;

    /// Records submissions; fails when `fail` is set.
    #[derive(Default)]
    struct FakeRecorder {
        fail: bool,
        calls: Mutex<Vec<SaleSubmission>>,
    }

    impl FakeRecorder {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl SaleRecorder for FakeRecorder {
        async fn record_sale(&self, sale: &SaleSubmission) -> Result<String, ApiError> {
            self.calls.lock().unwrap().push(sale.clone());
            if self.fail {
                return Err(ApiError::Rejected("Database error".to_string()));
            }
            Ok("Sale recorded".to_string())
        }
    }

    const CASHIER: UserId = UserId::new(3);

    fn catalog() -> Catalog {
        Catalog::new(vec![product(1, "Glide", 100, 10, vec![variant(5, 10)])])
    }

    fn cart_with_two() -> Cart<MemoryStore> {
        let mut cart = Cart::new(MemoryStore::new());
        cart.add(VariantId::new(5), 2, &catalog()).unwrap();
        cart
    }

    fn money(units: i64) -> Decimal {
        Decimal::new(units, 0)
    }

    #[tokio::test]
    async fn test_checkout_records_sale_and_clears_cart() {
        let mut cart = cart_with_two();
        let recorder = FakeRecorder::default();

        let receipt = cart
            .checkout(CASHIER, "  Ana  ", money(300), &catalog(), &recorder)
            .await
            .unwrap();

        assert_eq!(receipt.total, money(220));
        assert_eq!(receipt.change, money(80));
        assert_eq!(receipt.customer_name, "Ana");
        assert_eq!(receipt.items.to_string(), "5:2");
        assert_eq!(receipt.message, "Sale recorded");

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].user_id, CASHIER);
        assert_eq!(calls[0].change_amount, money(80));

        assert!(cart.is_empty());
        assert_eq!(cart.store().get(CART_STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_checkout_redraws_cleared_cart() {
        let drawn = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&drawn);
        let mut cart = cart_with_two().with_render_hook(Box::new(move |lines| {
            sink.lock().unwrap().push(lines.len());
        }));

        cart.checkout(CASHIER, "Ana", money(300), &catalog(), &FakeRecorder::default())
            .await
            .unwrap();

        assert_eq!(*drawn.lock().unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn test_insufficient_cash_makes_no_call() {
        let mut cart = cart_with_two();
        let recorder = FakeRecorder::default();

        let err = cart
            .checkout(CASHIER, "Ana", money(100), &catalog(), &recorder)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::InsufficientCash { total, received }
                if total == money(220) && received == money(100)
        ));
        assert_eq!(recorder.call_count(), 0);
        assert_eq!(cart.lines(), &[CartLine::new(VariantId::new(5), 2)]);
    }

    #[tokio::test]
    async fn test_exact_cash_gives_zero_change() {
        let mut cart = cart_with_two();
        let receipt = cart
            .checkout(CASHIER, "Ana", money(220), &catalog(), &FakeRecorder::default())
            .await
            .unwrap();
        assert_eq!(receipt.change, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_empty_cart_and_blank_name_make_no_call() {
        let recorder = FakeRecorder::default();

        let mut empty = Cart::new(MemoryStore::new());
        assert!(matches!(
            empty.checkout(CASHIER, "Ana", money(300), &catalog(), &recorder).await,
            Err(CheckoutError::EmptyCart)
        ));

        let mut cart = cart_with_two();
        assert!(matches!(
            cart.checkout(CASHIER, "   ", money(300), &catalog(), &recorder).await,
            Err(CheckoutError::MissingCustomerName)
        ));

        assert_eq!(recorder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_orphaned_lines_block_checkout() {
        let mut store = MemoryStore::new();
        store
            .set(
                CART_STORAGE_KEY,
                r#"[{"variant_id":"5","quantity":1},{"variant_id":"42","quantity":1}]"#,
            )
            .unwrap();
        let mut cart = Cart::load(store);
        let recorder = FakeRecorder::default();

        let err = cart
            .checkout(CASHIER, "Ana", money(1000), &catalog(), &recorder)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::OrphanedLines(ids) if ids == vec![VariantId::new(42)]));
        assert_eq!(recorder.call_count(), 0);
        assert_eq!(cart.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_cart() {
        let mut cart = cart_with_two();
        let before = cart.store().get(CART_STORAGE_KEY).unwrap();
        let recorder = FakeRecorder::failing();

        let err = cart
            .checkout(CASHIER, "Ana", money(300), &catalog(), &recorder)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Api(ApiError::Rejected(_))));
        assert!(!err.is_validation());
        assert_eq!(recorder.call_count(), 1);
        assert_eq!(cart.lines(), &[CartLine::new(VariantId::new(5), 2)]);
        assert_eq!(cart.store().get(CART_STORAGE_KEY).unwrap(), before);
    }

    #[tokio::test]
    async fn test_unclearable_cart_reports_not_cleared() {
        let cart = cart_with_two();
        let mut store = cart.store().clone();
        store.set_read_only(true);
        let mut cart = Cart::load(store);

        let err = cart
            .checkout(CASHIER, "Ana", money(300), &catalog(), &FakeRecorder::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::NotCleared(_)));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_total_rounded_before_cash_comparison() {
        // 33.335 * 1 rounds to 33.34
        let catalog = Catalog::new(vec![{
            let mut p = product(1, "Odd", 0, 0, vec![variant(5, 10)]);
            p.shoe_price = Decimal::new(33_335, 3);
            p
        }]);
        let mut cart = Cart::new(MemoryStore::new());
        cart.add(VariantId::new(5), 1, &catalog).unwrap();

        let err = cart
            .checkout(CASHIER, "Ana", Decimal::new(3_334, 2) - Decimal::new(1, 2), &catalog, &FakeRecorder::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InsufficientCash { total, .. } if total == Decimal::new(3_334, 2)));

        let receipt = cart
            .checkout(CASHIER, "Ana", Decimal::new(3_334, 2), &catalog, &FakeRecorder::default())
            .await
            .unwrap();
        assert_eq!(receipt.change, Decimal::ZERO);
    }
}
