//! Wire encoding of sale line items.
//!
//! The sale endpoint takes its items as a single form field holding a
//! comma-separated list of `variant_id:quantity` pairs, e.g. `5:2,7:1`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::cart::CartLine;
use super::id::VariantId;

/// Errors from parsing an `items` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleItemsError {
    /// The field held no items.
    #[error("sale has no items")]
    Empty,

    /// An entry was not of the form `variant_id:quantity`.
    #[error("malformed sale item: {0:?}")]
    Malformed(String),
}

/// One sold variant and its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleItem {
    pub variant_id: VariantId,
    pub quantity: u32,
}

impl From<&CartLine> for SaleItem {
    fn from(line: &CartLine) -> Self {
        Self {
            variant_id: line.variant_id,
            quantity: line.quantity,
        }
    }
}

impl fmt::Display for SaleItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.variant_id, self.quantity)
    }
}

impl FromStr for SaleItem {
    type Err = SaleItemsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SaleItemsError::Malformed(s.to_string());

        let (variant, quantity) = s.trim().split_once(':').ok_or_else(malformed)?;
        let variant_id = variant.parse::<VariantId>().map_err(|_| malformed())?;
        let quantity = quantity.trim().parse::<u32>().map_err(|_| malformed())?;
        if quantity == 0 {
            return Err(malformed());
        }

        Ok(Self {
            variant_id,
            quantity,
        })
    }
}

/// The full `items` field of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaleItems(pub Vec<SaleItem>);

impl SaleItems {
    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total units across all items.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.0.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

impl<'a> FromIterator<&'a CartLine> for SaleItems {
    fn from_iter<I: IntoIterator<Item = &'a CartLine>>(iter: I) -> Self {
        Self(iter.into_iter().map(SaleItem::from).collect())
    }
}

impl fmt::Display for SaleItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&encoded)
    }
}

impl FromStr for SaleItems {
    type Err = SaleItemsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(SaleItemsError::Empty);
        }
        s.split(',')
            .map(str::parse::<SaleItem>)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_from_cart_lines() {
        let lines = [
            CartLine::new(VariantId::new(5), 2),
            CartLine::new(VariantId::new(7), 1),
        ];
        let items: SaleItems = lines.iter().collect();
        assert_eq!(items.to_string(), "5:2,7:1");
        assert_eq!(items.total_quantity(), 3);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let items: SaleItems = " 5:2 , 7: 1".parse().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items.0[1].variant_id, VariantId::new(7));
        assert_eq!(items.0[1].quantity, 1);
    }

    #[test]
    fn test_parse_rejects_empty_and_malformed() {
        assert_eq!("".parse::<SaleItems>(), Err(SaleItemsError::Empty));
        assert!(matches!(
            "5-2".parse::<SaleItems>(),
            Err(SaleItemsError::Malformed(_))
        ));
        assert!(matches!(
            "5:0".parse::<SaleItems>(),
            Err(SaleItemsError::Malformed(_))
        ));
    }
}
