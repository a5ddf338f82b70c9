//! Checkout command.

use std::io::{self, Write};
use std::sync::Arc;

use rust_decimal::Decimal;
use shoe_pos::PosError;
use shoe_pos::cart::CheckoutError;
use shoe_pos::error::add_breadcrumb;
use shoe_pos::render::ReceiptView;

use super::Session;

/// Sell the cart to `customer` for `cash` and print the receipt.
pub async fn run(session: &Session, customer: &str, cash: Decimal) -> Result<(), PosError> {
    if cash.is_sign_negative() {
        return Err(PosError::Input("cash received cannot be negative".to_string()));
    }
    add_breadcrumb("checkout", "Checkout started", None);

    let catalog = session.load_catalog().await?;
    let mut cart = session.open_rendered_cart(Arc::clone(&catalog))?;

    let receipt = cart
        .checkout(session.config.cashier_id, customer, cash, &catalog, &session.client)
        .await
        .inspect_err(|e| {
            if matches!(e, CheckoutError::Api(_)) {
                tracing::warn!("Cart kept; run checkout again to retry");
            }
        })?;

    let mut out = io::stdout().lock();
    write!(out, "{}", ReceiptView::new(&receipt, session.config.currency))?;
    Ok(())
}
