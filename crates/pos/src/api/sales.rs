//! Sale recording endpoint.

use std::future::Future;

use rust_decimal::Decimal;
use shoe_pos_core::{SaleItems, UserId, round_currency};
use tracing::{info, instrument};

use super::{ApiError, PosApiClient};

const ADD_SALE_PATH: &str = "api/sales/add";

/// A completed sale as submitted to `/api/sales/add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleSubmission {
    /// Cashier recording the sale.
    pub user_id: UserId,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub cash_received: Decimal,
    pub change_amount: Decimal,
    pub items: SaleItems,
}

impl SaleSubmission {
    /// Form fields in wire order. Amounts are rounded to currency precision.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("user_id", self.user_id.to_string()),
            ("customer_name", self.customer_name.clone()),
            ("total_amount", format_amount(self.total_amount)),
            ("cash_received", format_amount(self.cash_received)),
            ("change_amount", format_amount(self.change_amount)),
            ("items", self.items.to_string()),
        ]
    }
}

fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_currency(amount))
}

/// Something that can record a completed sale.
///
/// Implemented by [`PosApiClient`]; tests substitute recorders that count
/// calls or fail on demand.
pub trait SaleRecorder {
    /// Record the sale, returning the server's confirmation message.
    fn record_sale(
        &self,
        sale: &SaleSubmission,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;
}

impl SaleRecorder for PosApiClient {
    #[instrument(skip(self, sale), fields(items = sale.items.len(), total = %sale.total_amount))]
    async fn record_sale(&self, sale: &SaleSubmission) -> Result<String, ApiError> {
        let url = self.endpoint(ADD_SALE_PATH)?;
        let message = self.post_form(url, &sale.form_fields()).await?;
        info!(message = %message, "Sale recorded");
        Ok(message)
    }
}
