//! Per-size pricing for products.
//!
//! A product carries one `SizePrice` per size it is sold in. Stock is tracked
//! on the product as a whole, not per size.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`SizePrice`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The size label is blank.
    #[error("size cannot be empty")]
    EmptySize,
    /// A price is below zero.
    #[error("prices cannot be negative")]
    Negative,
    /// The selling price is above the list price.
    #[error("sell price {sell_price} exceeds mrp {mrp}")]
    AboveMrp {
        /// Selling price offered.
        sell_price: Decimal,
        /// Maximum retail price.
        mrp: Decimal,
    },
}

/// The price of a product in one size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizePrice {
    /// Size label (e.g. "M", "42", "500g").
    pub size: String,
    /// Price the shopper pays.
    pub sell_price: Decimal,
    /// Maximum retail price, shown struck through.
    pub mrp: Decimal,
}

impl SizePrice {
    /// Create a validated size price.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is blank, a price is negative, or the
    /// selling price exceeds the MRP.
    pub fn new(size: impl Into<String>, sell_price: Decimal, mrp: Decimal) -> Result<Self, PriceError> {
        let price = Self {
            size: size.into(),
            sell_price,
            mrp,
        };
        price.validate()?;
        Ok(price)
    }

    /// Check the invariants of an already-constructed price.
    ///
    /// # Errors
    ///
    /// See [`SizePrice::new`].
    pub fn validate(&self) -> Result<(), PriceError> {
        if self.size.trim().is_empty() {
            return Err(PriceError::EmptySize);
        }
        if self.sell_price.is_sign_negative() || self.mrp.is_sign_negative() {
            return Err(PriceError::Negative);
        }
        if self.sell_price > self.mrp {
            return Err(PriceError::AboveMrp {
                sell_price: self.sell_price,
                mrp: self.mrp,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_size_price_valid() {
        let price = SizePrice::new("M", dec("499.00"), dec("799.00")).unwrap();
        assert_eq!(price.sell_price, dec("499.00"));
        assert!(SizePrice::new("M", dec("799.00"), dec("799.00")).is_ok());
    }

    #[test]
    fn test_size_price_rejects_blank_size() {
        assert_eq!(
            SizePrice::new("  ", dec("1"), dec("2")),
            Err(PriceError::EmptySize)
        );
    }

    #[test]
    fn test_size_price_rejects_sell_above_mrp() {
        assert!(matches!(
            SizePrice::new("L", dec("900"), dec("800")),
            Err(PriceError::AboveMrp { .. })
        ));
    }

    #[test]
    fn test_size_price_rejects_negative() {
        assert_eq!(
            SizePrice::new("L", dec("-1"), dec("800")),
            Err(PriceError::Negative)
        );
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let price = SizePrice {
            size: "M".to_string(),
            sell_price: dec("10.50"),
            mrp: dec("12.00"),
        };
        let json = serde_json::to_value(&price).unwrap();
        assert_eq!(json["sellPrice"], "10.50");
        assert_eq!(json["mrp"], "12.00");
    }
}
