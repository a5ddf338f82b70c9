//! Cart and checkout error types.

use rust_decimal::Decimal;
use shoe_pos_core::VariantId;
use thiserror::Error;

use crate::api::ApiError;
use crate::store::StoreError;

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No line at the given position.
    #[error("no cart line at position {index} (cart has {len} lines)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The requested quantity exceeds available stock.
    #[error("only {available} of variant {variant_id} in stock ({requested} requested)")]
    InsufficientStock {
        variant_id: VariantId,
        requested: u64,
        available: u32,
    },

    /// The variant is not in the loaded catalog.
    #[error("variant {0} is not in the catalog")]
    UnknownVariant(VariantId),

    /// Quantity was zero or too large to represent.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// The cart could not be persisted; the in-memory cart was rolled back.
    #[error("failed to persist cart: {0}")]
    Storage(#[from] StoreError),
}

/// Errors from checkout.
///
/// Every variant except `Api` and `NotCleared` is a validation failure raised
/// before any network call, with the cart left untouched.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to sell.
    #[error("cart is empty")]
    EmptyCart,

    /// No customer name was given.
    #[error("customer name is required")]
    MissingCustomerName,

    /// Some lines reference variants missing from the catalog.
    #[error("cart has lines for variants missing from the catalog: {}", format_ids(.0))]
    OrphanedLines(Vec<VariantId>),

    /// Cash tendered does not cover the total.
    #[error("insufficient cash: total is {total}, received {received}")]
    InsufficientCash { total: Decimal, received: Decimal },

    /// The sale endpoint failed; the cart is unchanged.
    #[error("sale was not recorded: {0}")]
    Api(#[from] ApiError),

    /// The sale was recorded but the emptied cart could not be persisted.
    #[error("sale recorded but the cart could not be cleared: {0}")]
    NotCleared(#[source] StoreError),
}

impl CheckoutError {
    /// Whether this is a validation failure (no network call was made).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyCart
                | Self::MissingCustomerName
                | Self::OrphanedLines(_)
                | Self::InsufficientCash { .. }
        )
    }
}

fn format_ids(ids: &[VariantId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::InsufficientStock {
            variant_id: VariantId::new(5),
            requested: 4,
            available: 3,
        };
        assert_eq!(err.to_string(), "only 3 of variant 5 in stock (4 requested)");

        let err = CartError::IndexOutOfRange { index: 2, len: 1 };
        assert_eq!(err.to_string(), "no cart line at position 2 (cart has 1 lines)");
    }

    #[test]
    fn test_checkout_error_classification() {
        assert!(CheckoutError::EmptyCart.is_validation());
        assert!(
            CheckoutError::InsufficientCash {
                total: Decimal::new(220, 0),
                received: Decimal::new(100, 0),
            }
            .is_validation()
        );
        assert!(!CheckoutError::Api(ApiError::Rejected("no".to_string())).is_validation());
    }

    #[test]
    fn test_orphaned_lines_display() {
        let err = CheckoutError::OrphanedLines(vec![VariantId::new(3), VariantId::new(9)]);
        assert_eq!(
            err.to_string(),
            "cart has lines for variants missing from the catalog: 3, 9"
        );
    }
}
