//! Top-level error type and Sentry helpers.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::{CartError, CheckoutError};
use crate::config::ConfigError;
use crate::store::StoreError;

/// Any failure a POS front end can surface to the operator.
#[derive(Debug, Error)]
pub enum PosError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Checkout failed: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Bad operator input.
    #[error("Invalid input: {0}")]
    Input(String),
}

impl PosError {
    /// Whether the operator can fix this by changing their input.
    ///
    /// Such errors are not reported to Sentry.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        match self {
            Self::Input(_) => true,
            Self::Checkout(e) => e.is_validation(),
            Self::Cart(e) => !matches!(e, CartError::Storage(_)),
            Self::Config(_) | Self::Api(_) | Self::Store(_) | Self::Output(_) => false,
        }
    }

    /// Log the error, capturing it in Sentry unless it is a user error.
    pub fn report(&self) {
        if self.is_user_error() {
            tracing::warn!(error = %self, "Operation rejected");
            return;
        }

        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Operation failed"
        );
    }
}

/// Tag Sentry events with the cashier operating the terminal.
pub fn set_sentry_cashier(cashier_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(cashier_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for an operator action.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", "5"), ("quantity", "2")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shoe_pos_core::VariantId;

    use super::*;

    #[test]
    fn test_pos_error_display() {
        let err = PosError::Input("quantity must be a number".to_string());
        assert_eq!(err.to_string(), "Invalid input: quantity must be a number");

        let err = PosError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout failed: cart is empty");
    }

    #[test]
    fn test_user_errors() {
        assert!(PosError::from(CartError::UnknownVariant(VariantId::new(1))).is_user_error());
        assert!(
            PosError::from(CheckoutError::InsufficientCash {
                total: Decimal::ONE,
                received: Decimal::ZERO,
            })
            .is_user_error()
        );
        assert!(!PosError::from(CartError::Storage(StoreError::ReadOnly)).is_user_error());
        assert!(!PosError::from(ApiError::RateLimited(5)).is_user_error());
    }
}
