//! Order domain types.
//!
//! An order is a single record whose line items may belong to different
//! stores. Nothing is stored per store: each store admin's view is rebuilt on
//! read by keeping only the lines whose product belongs to that store
//! (see [`OrderDetail::for_store`]).

use std::collections::BTreeMap;

use chrono::{DateTime, Days, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercato_core::{OrderId, OrderStatus, ProductId, StoreId, UserId};

use super::user::UserSummary;
use super::{ValidationError, require, require_text};

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("shippingAddress.fullName", &self.full_name),
            ("shippingAddress.phone", &self.phone),
            ("shippingAddress.line1", &self.line1),
            ("shippingAddress.city", &self.city),
            ("shippingAddress.postalCode", &self.postal_code),
            ("shippingAddress.country", &self.country),
        ];
        match required.into_iter().find(|(_, v)| v.trim().is_empty()) {
            Some((field, _)) => Err(ValidationError::MissingField(field)),
            None => Ok(()),
        }
    }
}

/// Confirmation returned by the payment gateway for a prepaid order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub provider: String,
    pub reference: String,
}

/// One product and quantity within an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item: ProductId,
    pub quantity: i32,
}

/// A line item as submitted at checkout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutLineRequest {
    pub item: Option<ProductId>,
    pub quantity: Option<i32>,
}

/// Request body for checkout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub products: Option<Vec<CheckoutLineRequest>>,
    pub shipping_address: Option<ShippingAddress>,
    #[serde(alias = "COD")]
    pub cod: Option<bool>,
    pub amount: Option<Decimal>,
    #[serde(alias = "delivaryCharge")]
    pub delivery_charge: Option<Decimal>,
    pub payment: Option<PaymentConfirmation>,
}

/// A validated checkout, ready to be placed for a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub lines: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub cod: bool,
    pub amount: Decimal,
    pub delivery_charge: Decimal,
    pub payment: Option<PaymentConfirmation>,
}

impl CheckoutRequest {
    /// Validate the checkout payload.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for any absent required field (including a
    /// payment confirmation on prepaid orders) and `InvalidField` for empty
    /// line lists, non-positive quantities or negative amounts.
    pub fn validate(self) -> Result<NewOrder, ValidationError> {
        let raw_lines = require(self.products, "products")?;
        let shipping_address = require(self.shipping_address, "shippingAddress")?;
        let cod = require(self.cod, "cod")?;
        let amount = require(self.amount, "amount")?;
        let delivery_charge = require(self.delivery_charge, "deliveryCharge")?;

        if raw_lines.is_empty() {
            return Err(ValidationError::invalid("products", "must contain at least one item"));
        }
        let lines = raw_lines
            .into_iter()
            .map(|line| {
                let item = require(line.item, "products.item")?;
                let quantity = require(line.quantity, "products.quantity")?;
                if quantity < 1 {
                    return Err(ValidationError::invalid("products.quantity", "must be at least 1"));
                }
                Ok(OrderLine { item, quantity })
            })
            .collect::<Result<Vec<_>, _>>()?;

        shipping_address.validate()?;

        if amount.is_sign_negative() {
            return Err(ValidationError::invalid("amount", "must not be negative"));
        }
        if delivery_charge.is_sign_negative() {
            return Err(ValidationError::invalid("deliveryCharge", "must not be negative"));
        }

        let payment = if cod {
            None
        } else {
            let payment = require(self.payment, "payment")?;
            Some(PaymentConfirmation {
                provider: require_text(Some(payment.provider), "payment.provider")?,
                reference: require_text(Some(payment.reference), "payment.reference")?,
            })
        };

        Ok(NewOrder {
            lines,
            shipping_address,
            cod,
            amount,
            delivery_charge,
            payment,
        })
    }
}

/// Format the promised delivery date: `days` after `placed_on`, as `D/M/YYYY`
/// without zero padding.
#[must_use]
pub fn delivery_date(placed_on: NaiveDate, days: u32) -> String {
    let date = placed_on
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(placed_on);
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Stock state of a product locked for order placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    pub id: ProductId,
    pub stock: i32,
}

/// Why an order could not be reserved against inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationError {
    /// Fewer products resolved than lines were requested.
    ProductNotFound,
    /// The summed quantity for a product exceeds its stock.
    OutOfStock(ProductId),
}

/// Check the requested lines against the resolved products.
///
/// The existence check is all-or-nothing: the number of distinct resolved
/// products must equal the number of requested lines, so a checkout naming
/// the same product twice is rejected as well. Returns the quantity to take
/// from each product, in ascending product id order.
///
/// # Errors
///
/// See [`ReservationError`].
pub fn reserve_stock(
    lines: &[OrderLine],
    resolved: &[StockLevel],
) -> Result<Vec<(ProductId, i32)>, ReservationError> {
    if resolved.len() != lines.len() {
        return Err(ReservationError::ProductNotFound);
    }

    let mut wanted: BTreeMap<ProductId, i32> = BTreeMap::new();
    for line in lines {
        *wanted.entry(line.item).or_insert(0) += line.quantity;
    }

    wanted
        .into_iter()
        .map(|(id, quantity)| {
            let level = resolved
                .iter()
                .find(|p| p.id == id)
                .ok_or(ReservationError::ProductNotFound)?;
            if quantity > level.stock {
                return Err(ReservationError::OutOfStock(id));
            }
            Ok((id, quantity))
        })
        .collect()
}

/// Order header fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: UserId,
    pub status: OrderStatus,
    pub amount: Decimal,
    pub delivery_charge: Decimal,
    pub cod: bool,
    pub delivery_date: String,
    pub shipping_address: ShippingAddress,
    pub payment: Option<PaymentConfirmation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item with the product details needed for display and store splits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineDetail {
    pub item: ProductId,
    /// Store owning the product, through which the line's store is derived.
    pub store_id: StoreId,
    pub name: String,
    pub image: Option<String>,
    pub quantity: i32,
}

/// An order with its customer and line items loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub customer: UserSummary,
    pub products: Vec<OrderLineDetail>,
}

impl OrderDetail {
    /// The view of this order seen by one store: only that store's lines.
    ///
    /// The same order viewed by two stores yields two different `products`
    /// lists; the header (amount, status, customer) is shared.
    #[must_use]
    pub fn for_store(mut self, store_id: StoreId) -> Self {
        self.products.retain(|line| line.store_id == store_id);
        self
    }

    /// Stores with at least one line in this order.
    #[must_use]
    pub fn stores(&self) -> Vec<StoreId> {
        let mut stores: Vec<StoreId> = self.products.iter().map(|l| l.store_id).collect();
        stores.sort_unstable();
        stores.dedup();
        stores
    }
}

/// Request body for a status transition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Asha Rao".to_string(),
            phone: "5550100".to_string(),
            line1: "12 Market Road".to_string(),
            line2: None,
            city: "Pune".to_string(),
            region: "MH".to_string(),
            postal_code: "411001".to_string(),
            country: "IN".to_string(),
        }
    }

    fn checkout(lines: Vec<(i32, i32)>) -> CheckoutRequest {
        CheckoutRequest {
            products: Some(
                lines
                    .into_iter()
                    .map(|(item, quantity)| CheckoutLineRequest {
                        item: Some(ProductId::new(item)),
                        quantity: Some(quantity),
                    })
                    .collect(),
            ),
            shipping_address: Some(address()),
            cod: Some(true),
            amount: Some(Decimal::new(1040, 0)),
            delivery_charge: Some(Decimal::new(40, 0)),
            payment: None,
        }
    }

    fn line_detail(item: i32, store: i32) -> OrderLineDetail {
        OrderLineDetail {
            item: ProductId::new(item),
            store_id: StoreId::new(store),
            name: format!("Product {item}"),
            image: None,
            quantity: 1,
        }
    }

    fn order_detail(lines: Vec<OrderLineDetail>) -> OrderDetail {
        OrderDetail {
            order: Order {
                id: OrderId::new(1),
                customer_id: UserId::new(10),
                status: OrderStatus::Pending,
                amount: Decimal::new(1040, 0),
                delivery_charge: Decimal::new(40, 0),
                cod: true,
                delivery_date: "4/3/2026".to_string(),
                shipping_address: address(),
                payment: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            customer: UserSummary {
                id: UserId::new(10),
                name: "Asha Rao".to_string(),
                email: "asha@mercato.test".to_string(),
            },
            products: lines,
        }
    }

    #[test]
    fn test_delivery_date_is_unpadded() {
        let placed = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(delivery_date(placed, 3), "4/3/2026");
    }

    #[test]
    fn test_delivery_date_rolls_over_month_and_year() {
        let placed = NaiveDate::from_ymd_opt(2026, 1, 30).unwrap();
        assert_eq!(delivery_date(placed, 3), "2/2/2026");

        let placed = NaiveDate::from_ymd_opt(2026, 12, 30).unwrap();
        assert_eq!(delivery_date(placed, 3), "2/1/2027");
    }

    #[test]
    fn test_checkout_requires_every_field() {
        let mut request = checkout(vec![(1, 1)]);
        request.shipping_address = None;
        assert_eq!(
            request.validate(),
            Err(ValidationError::MissingField("shippingAddress"))
        );

        let mut request = checkout(vec![(1, 1)]);
        request.delivery_charge = None;
        assert_eq!(
            request.validate(),
            Err(ValidationError::MissingField("deliveryCharge"))
        );
    }

    #[test]
    fn test_prepaid_checkout_requires_payment_confirmation() {
        let mut request = checkout(vec![(1, 1)]);
        request.cod = Some(false);
        assert_eq!(
            request.validate(),
            Err(ValidationError::MissingField("payment"))
        );

        let mut request = checkout(vec![(1, 1)]);
        request.cod = Some(false);
        request.payment = Some(PaymentConfirmation {
            provider: "card".to_string(),
            reference: "pay_81f2".to_string(),
        });
        assert!(request.validate().unwrap().payment.is_some());
    }

    #[test]
    fn test_checkout_accepts_legacy_field_names() {
        let request: CheckoutRequest = serde_json::from_value(serde_json::json!({
            "products": [{"item": 3, "quantity": 2}],
            "shippingAddress": address(),
            "COD": true,
            "amount": "540",
            "delivaryCharge": "40"
        }))
        .unwrap();
        let order = request.validate().unwrap();
        assert_eq!(order.lines, vec![OrderLine { item: ProductId::new(3), quantity: 2 }]);
        assert_eq!(order.delivery_charge, Decimal::new(40, 0));
    }

    #[test]
    fn test_reserve_keeps_line_count_when_all_resolve() {
        let lines = checkout(vec![(1, 2), (2, 1)]).validate().unwrap().lines;
        let resolved = [
            StockLevel { id: ProductId::new(2), stock: 1 },
            StockLevel { id: ProductId::new(1), stock: 5 },
        ];
        let reserved = reserve_stock(&lines, &resolved).unwrap();
        assert_eq!(reserved.len(), lines.len());
        assert_eq!(reserved, vec![(ProductId::new(1), 2), (ProductId::new(2), 1)]);
    }

    #[test]
    fn test_reserve_fails_when_any_product_is_missing() {
        let lines = checkout(vec![(1, 1), (99, 1)]).validate().unwrap().lines;
        let resolved = [StockLevel { id: ProductId::new(1), stock: 5 }];
        assert_eq!(
            reserve_stock(&lines, &resolved),
            Err(ReservationError::ProductNotFound)
        );
    }

    #[test]
    fn test_reserve_rejects_duplicate_lines() {
        let lines = checkout(vec![(1, 1), (1, 1)]).validate().unwrap().lines;
        let resolved = [StockLevel { id: ProductId::new(1), stock: 5 }];
        assert_eq!(
            reserve_stock(&lines, &resolved),
            Err(ReservationError::ProductNotFound)
        );
    }

    #[test]
    fn test_reserve_allows_taking_all_stock_then_rejects() {
        let lines = [OrderLine { item: ProductId::new(1), quantity: 5 }];
        let resolved = [StockLevel { id: ProductId::new(1), stock: 5 }];
        assert_eq!(
            reserve_stock(&lines, &resolved),
            Ok(vec![(ProductId::new(1), 5)])
        );

        let lines = [OrderLine { item: ProductId::new(1), quantity: 1 }];
        let resolved = [StockLevel { id: ProductId::new(1), stock: 0 }];
        assert_eq!(
            reserve_stock(&lines, &resolved),
            Err(ReservationError::OutOfStock(ProductId::new(1)))
        );
    }

    #[test]
    fn test_store_view_keeps_only_that_stores_lines() {
        let detail = order_detail(vec![line_detail(1, 100), line_detail(2, 200)]);

        let view_a = detail.clone().for_store(StoreId::new(100));
        let view_b = detail.clone().for_store(StoreId::new(200));

        assert_eq!(view_a.order.id, view_b.order.id);
        assert_eq!(view_a.products.len(), 1);
        assert_eq!(view_a.products[0].item, ProductId::new(1));
        assert_eq!(view_b.products.len(), 1);
        assert_eq!(view_b.products[0].item, ProductId::new(2));
    }

    #[test]
    fn test_stores_lists_each_participant_once() {
        let detail = order_detail(vec![
            line_detail(1, 200),
            line_detail(2, 100),
            line_detail(3, 200),
        ]);
        assert_eq!(detail.stores(), vec![StoreId::new(100), StoreId::new(200)]);
    }

    #[test]
    fn test_status_request_parses_wire_strings() {
        let request: UpdateStatusRequest =
            serde_json::from_str(r#"{"status": "dispatched"}"#).unwrap();
        assert_eq!(request.status, Some(OrderStatus::Dispatched));

        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{"status": "lost"}"#).is_err());
    }
}
