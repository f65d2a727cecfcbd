//! Product domain types and the admin update rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercato_core::{OrderId, OrderStatus, ProductId, ProductStatus, SizePrice, StoreId};

use super::{ValidationError, require, require_text};

/// A catalog product with its inventory counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    /// Store selling the product.
    pub store_id: StoreId,
    pub name: String,
    pub description: String,
    pub status: ProductStatus,
    /// One entry per size.
    pub price: Vec<SizePrice>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub gws: String,
    /// Hosted image URLs.
    pub images: Vec<String>,
    /// Units available, shared by all sizes.
    pub stock: i32,
    /// Units ordered so far.
    pub sold: i32,
    /// Mean review rating, 0 when the product has no reviews.
    pub avg_rating: Decimal,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product details joined into carts, wishlists and order lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    pub status: ProductStatus,
    pub price: Vec<SizePrice>,
    /// First hosted image, if any.
    pub image: Option<String>,
    pub stock: i32,
}

/// One entry of a product's order ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOrderRef {
    pub order: OrderId,
    pub quantity: i32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Vec<SizePrice>>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub size: Vec<String>,
    #[serde(default, alias = "GWS")]
    pub gws: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock: Option<i32>,
}

/// A validated product ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Vec<SizePrice>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub gws: String,
    pub images: Vec<String>,
    pub stock: i32,
}

impl CreateProductRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if the name, price table, or stock is absent and
    /// `InvalidField` for a malformed price entry or negative stock.
    pub fn validate(self) -> Result<NewProduct, ValidationError> {
        let name = require_text(self.name, "name")?;
        let price = require(self.price, "price")?;
        if price.is_empty() {
            return Err(ValidationError::MissingField("price"));
        }
        validate_prices(&price)?;

        let stock = require(self.stock, "stock")?;
        if stock < 0 {
            return Err(ValidationError::invalid("stock", "must not be negative"));
        }

        Ok(NewProduct {
            name,
            description: self.description.unwrap_or_default(),
            price,
            colors: self.colors,
            sizes: self.size,
            gws: self.gws,
            images: self.images,
            stock,
        })
    }
}

fn validate_prices(prices: &[SizePrice]) -> Result<(), ValidationError> {
    prices
        .iter()
        .try_for_each(SizePrice::validate)
        .map_err(|e| ValidationError::invalid("price", e.to_string()))
}

/// Request body for the admin product update.
///
/// Every field is optional; see [`UpdateProductRequest::validate`] for which
/// values count as "no change".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub price: Option<Vec<SizePrice>>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub colors: Option<Vec<String>>,
    pub size: Option<Vec<String>>,
    #[serde(alias = "GWS")]
    pub gws: Option<String>,
    pub stock: Option<i32>,
}

/// The fields an admin update will overwrite. `None` means unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub price: Option<Vec<SizePrice>>,
    pub status: Option<ProductStatus>,
    pub description: Option<String>,
    pub colors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub gws: Option<String>,
    pub stock: Option<i32>,
}

impl UpdateProductRequest {
    /// Reduce the request to the fields that will change.
    ///
    /// Empty strings and empty lists leave the stored value untouched. Stock is
    /// the exception: any value other than exactly `0` is applied, so stock
    /// cannot be set to zero through this operation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` for an unknown status, a malformed price entry or
    /// negative stock.
    pub fn validate(self) -> Result<ProductPatch, ValidationError> {
        let price = self.price.filter(|p| !p.is_empty());
        if let Some(prices) = &price {
            validate_prices(prices)?;
        }

        let status = self
            .status
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<ProductStatus>())
            .transpose()
            .map_err(|e| ValidationError::invalid("status", e))?;

        let stock = self.stock.filter(|&s| s != 0);
        if stock.is_some_and(|s| s < 0) {
            return Err(ValidationError::invalid("stock", "must not be negative"));
        }

        Ok(ProductPatch {
            price,
            status,
            description: self.description.filter(|d| !d.is_empty()),
            colors: self.colors.filter(|c| !c.is_empty()),
            sizes: self.size.filter(|s| !s.is_empty()),
            gws: self.gws.filter(|g| !g.is_empty()),
            stock,
        })
    }
}

impl ProductPatch {
    /// Whether applying the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.price.is_none()
            && self.status.is_none()
            && self.description.is_none()
            && self.colors.is_none()
            && self.sizes.is_none()
            && self.gws.is_none()
            && self.stock.is_none()
    }

    /// Overwrite the patched fields of `product`.
    pub fn apply(self, product: &mut Product) {
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(colors) = self.colors {
            product.colors = colors;
        }
        if let Some(sizes) = self.sizes {
            product.sizes = sizes;
        }
        if let Some(gws) = self.gws {
            product.gws = gws;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_product(id: i32, store: i32) -> Product {
        Product {
            id: ProductId::new(id),
            store_id: StoreId::new(store),
            name: format!("Product {id}"),
            description: "Cotton tee".to_string(),
            status: ProductStatus::Active,
            price: vec![SizePrice::new("M", Decimal::new(499, 0), Decimal::new(799, 0)).unwrap()],
            colors: vec!["red".to_string()],
            sizes: vec!["M".to_string()],
            gws: "gift wrap".to_string(),
            images: Vec::new(),
            stock: 5,
            sold: 0,
            avg_rating: Decimal::ZERO,
            review_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_fields_mean_no_change() {
        let request = UpdateProductRequest {
            price: Some(Vec::new()),
            status: Some(String::new()),
            description: Some(String::new()),
            colors: Some(Vec::new()),
            size: Some(Vec::new()),
            gws: Some(String::new()),
            stock: None,
        };
        let patch = request.validate().unwrap();
        assert!(patch.is_empty());

        let mut product = sample_product(1, 1);
        let before = product.clone();
        patch.apply(&mut product);
        assert_eq!(product, before);
    }

    #[test]
    fn test_stock_cannot_be_set_to_zero() {
        let patch = UpdateProductRequest {
            stock: Some(0),
            ..UpdateProductRequest::default()
        }
        .validate()
        .unwrap();

        let mut product = sample_product(1, 1);
        patch.apply(&mut product);
        assert_eq!(product.stock, 5);
    }

    #[test]
    fn test_non_zero_stock_is_applied() {
        let patch = UpdateProductRequest {
            stock: Some(12),
            ..UpdateProductRequest::default()
        }
        .validate()
        .unwrap();

        let mut product = sample_product(1, 1);
        patch.apply(&mut product);
        assert_eq!(product.stock, 12);
    }

    #[test]
    fn test_negative_stock_is_rejected() {
        let result = UpdateProductRequest {
            stock: Some(-1),
            ..UpdateProductRequest::default()
        }
        .validate();
        assert!(matches!(
            result,
            Err(ValidationError::InvalidField { field: "stock", .. })
        ));
    }

    #[test]
    fn test_non_empty_fields_replace_stored_values() {
        let patch = UpdateProductRequest {
            description: Some("Linen shirt".to_string()),
            colors: Some(vec!["white".to_string(), "navy".to_string()]),
            status: Some("inactive".to_string()),
            ..UpdateProductRequest::default()
        }
        .validate()
        .unwrap();

        let mut product = sample_product(1, 1);
        patch.apply(&mut product);
        assert_eq!(product.description, "Linen shirt");
        assert_eq!(product.colors, vec!["white", "navy"]);
        assert_eq!(product.status, ProductStatus::Inactive);
        assert_eq!(product.sizes, vec!["M"]);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = UpdateProductRequest {
            status: Some("archived".to_string()),
            ..UpdateProductRequest::default()
        }
        .validate();
        assert!(matches!(
            result,
            Err(ValidationError::InvalidField { field: "status", .. })
        ));
    }

    #[test]
    fn test_create_requires_price_table() {
        let request = CreateProductRequest {
            name: Some("Tee".to_string()),
            price: Some(Vec::new()),
            stock: Some(3),
            ..CreateProductRequest::default()
        };
        assert_eq!(
            request.validate(),
            Err(ValidationError::MissingField("price"))
        );
    }

    #[test]
    fn test_create_accepts_legacy_field_names() {
        let request: CreateProductRequest = serde_json::from_str(
            r#"{
                "name": "Tee",
                "price": [{"size": "M", "sellPrice": "10", "mrp": "12"}],
                "size": ["M"],
                "GWS": "wrap",
                "stock": 4
            }"#,
        )
        .unwrap();
        let product = request.validate().unwrap();
        assert_eq!(product.sizes, vec!["M"]);
        assert_eq!(product.gws, "wrap");
        assert_eq!(product.stock, 4);
    }
}
