//! Cart domain types.
//!
//! A cart holds at most one entry per product. Colour and size are attributes
//! of the entry, not part of its identity: toggling a product that is already
//! in the cart removes it, whatever variant was requested.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercato_core::ProductId;

use super::product::ProductSummary;
use super::{ValidationError, require};

/// One product selection awaiting checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    /// Product selected. This is the entry's identity.
    pub item: ProductId,
    pub color: String,
    pub size: String,
    /// Unit price shown to the shopper when the item was added.
    pub sell_price: Decimal,
    pub quantity: i32,
}

/// Outcome of [`Cart::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CartToggle {
    Added,
    Removed,
}

impl CartToggle {
    /// Human-readable message for the response envelope.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Added => "Item added to cart",
            Self::Removed => "Item removed from cart",
        }
    }
}

/// A shopper's cart, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    #[must_use]
    pub const fn new(entries: Vec<CartEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add the entry, or remove the existing entry for the same product.
    ///
    /// Only `item` is compared; a second variant of a product already in the
    /// cart removes the first instead of being added beside it.
    pub fn toggle(&mut self, entry: CartEntry) -> CartToggle {
        if let Some(index) = self.entries.iter().position(|e| e.item == entry.item) {
            self.entries.remove(index);
            CartToggle::Removed
        } else {
            self.entries.push(entry);
            CartToggle::Added
        }
    }

    /// Shallow-merge a patch onto the entry for `item`.
    ///
    /// Returns the updated entry, or `None` if the product is not in the cart.
    pub fn update(&mut self, item: ProductId, patch: &CartEntryPatch) -> Option<&CartEntry> {
        let entry = self.entries.iter_mut().find(|e| e.item == item)?;
        patch.apply(entry);
        Some(entry)
    }
}

/// Request body for toggling a cart item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleCartRequest {
    pub item: Option<ProductId>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub sell_price: Option<Decimal>,
    pub quantity: Option<i32>,
}

impl ToggleCartRequest {
    /// Validate the request into a cart entry.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if the product, price, or quantity is absent and
    /// `InvalidField` if the price is negative or the quantity is not positive.
    pub fn validate(self) -> Result<CartEntry, ValidationError> {
        let item = require(self.item, "item")?;
        let sell_price = require(self.sell_price, "sellPrice")?;
        let quantity = require(self.quantity, "quantity")?;

        if sell_price.is_sign_negative() {
            return Err(ValidationError::invalid("sellPrice", "must not be negative"));
        }
        if quantity < 1 {
            return Err(ValidationError::invalid("quantity", "must be at least 1"));
        }

        Ok(CartEntry {
            item,
            color: self.color.unwrap_or_default(),
            size: self.size.unwrap_or_default(),
            sell_price,
            quantity,
        })
    }
}

/// Fields to overwrite on an existing cart entry. Absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntryPatch {
    pub color: Option<String>,
    pub size: Option<String>,
    pub sell_price: Option<Decimal>,
    pub quantity: Option<i32>,
}

impl CartEntryPatch {
    /// Reject values that could never be stored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` for a negative price or a non-positive quantity.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sell_price.is_some_and(|p| p.is_sign_negative()) {
            return Err(ValidationError::invalid("sellPrice", "must not be negative"));
        }
        if self.quantity.is_some_and(|q| q < 1) {
            return Err(ValidationError::invalid("quantity", "must be at least 1"));
        }
        Ok(())
    }

    fn apply(&self, entry: &mut CartEntry) {
        if let Some(color) = &self.color {
            entry.color.clone_from(color);
        }
        if let Some(size) = &self.size {
            entry.size.clone_from(size);
        }
        if let Some(sell_price) = self.sell_price {
            entry.sell_price = sell_price;
        }
        if let Some(quantity) = self.quantity {
            entry.quantity = quantity;
        }
    }
}

/// A cart entry joined with its product details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(flatten)]
    pub entry: CartEntry,
    pub product: ProductSummary,
}
