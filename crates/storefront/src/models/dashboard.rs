//! Store dashboard metrics.
//!
//! Metrics are recomputed from live order and product state on every request;
//! nothing here is cached or incrementally maintained.

use rust_decimal::Decimal;
use serde::Serialize;

use mercato_core::OrderStatus;

/// Product counters feeding the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductTally {
    pub sold: i32,
    pub review_count: i64,
}

/// Order fields feeding the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTally {
    pub status: OrderStatus,
    pub amount: Decimal,
    pub delivery_charge: Decimal,
}

/// Store-level reporting aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardMetrics {
    #[serde(rename = "PRODUCTS")]
    pub products: usize,
    #[serde(rename = "TOTAL_SOLD")]
    pub total_sold: i64,
    #[serde(rename = "TOTAL_ORDERS")]
    pub total_orders: usize,
    #[serde(rename = "TOTAL_REVIEWS")]
    pub total_reviews: i64,
    #[serde(rename = "TOTAL_COMPLETEDORDERS")]
    pub total_completed_orders: usize,
    /// Delivered revenue net of delivery charges.
    #[serde(rename = "TOTAL_SELL")]
    pub total_sell: Decimal,
    #[serde(rename = "TOTAL_CANCELLEDORDERS")]
    pub total_cancelled_orders: usize,
    /// Pending, dispatched and shipped orders together.
    #[serde(rename = "TOTAL_PENDINGORDERS")]
    pub total_pending_orders: usize,
}

impl DashboardMetrics {
    /// Compute the metrics for a store from its products and orders.
    ///
    /// `orders` are the store's orders, each counted once, with the whole
    /// order's amount: an order shared with another store contributes its full
    /// `amount - delivery_charge` to both.
    #[must_use]
    pub fn compute(products: &[ProductTally], orders: &[OrderTally]) -> Self {
        let delivered = || orders.iter().filter(|o| o.status == OrderStatus::Delivered);

        Self {
            products: products.len(),
            total_sold: products.iter().map(|p| i64::from(p.sold)).sum(),
            total_orders: orders.len(),
            total_reviews: products.iter().map(|p| p.review_count).sum(),
            total_completed_orders: delivered().count(),
            total_sell: delivered().map(|o| o.amount - o.delivery_charge).sum(),
            total_cancelled_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Cancelled)
                .count(),
            total_pending_orders: orders.iter().filter(|o| o.status.is_open()).count(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(status: OrderStatus, amount: i64, charge: i64) -> OrderTally {
        OrderTally {
            status,
            amount: Decimal::new(amount, 0),
            delivery_charge: Decimal::new(charge, 0),
        }
    }

    #[test]
    fn test_empty_store_is_all_zero() {
        assert_eq!(DashboardMetrics::compute(&[], &[]), DashboardMetrics::default());
    }

    #[test]
    fn test_no_delivered_orders_means_no_sales() {
        let orders = [
            order(OrderStatus::Pending, 500, 40),
            order(OrderStatus::Shipped, 300, 0),
            order(OrderStatus::Cancelled, 200, 20),
        ];
        let metrics = DashboardMetrics::compute(&[], &orders);
        assert_eq!(metrics.total_sell, Decimal::ZERO);
        assert_eq!(metrics.total_completed_orders, 0);
        assert_eq!(metrics.total_orders, 3);
    }

    #[test]
    fn test_buckets_match_reporting_rules() {
        let products = [
            ProductTally { sold: 4, review_count: 2 },
            ProductTally { sold: 6, review_count: 1 },
        ];
        let orders = [
            order(OrderStatus::Pending, 100, 10),
            order(OrderStatus::Dispatched, 100, 10),
            order(OrderStatus::Shipped, 100, 10),
            order(OrderStatus::Delivered, 540, 40),
            order(OrderStatus::Delivered, 260, 10),
            order(OrderStatus::Cancelled, 100, 10),
        ];

        let metrics = DashboardMetrics::compute(&products, &orders);
        assert_eq!(metrics.products, 2);
        assert_eq!(metrics.total_sold, 10);
        assert_eq!(metrics.total_reviews, 3);
        assert_eq!(metrics.total_orders, 6);
        assert_eq!(metrics.total_completed_orders, 2);
        assert_eq!(metrics.total_sell, Decimal::new(750, 0));
        assert_eq!(metrics.total_cancelled_orders, 1);
        assert_eq!(metrics.total_pending_orders, 3);
    }

    #[test]
    fn test_serializes_with_report_keys() {
        let json = serde_json::to_value(DashboardMetrics::default()).unwrap();
        for key in [
            "PRODUCTS",
            "TOTAL_SOLD",
            "TOTAL_ORDERS",
            "TOTAL_REVIEWS",
            "TOTAL_COMPLETEDORDERS",
            "TOTAL_SELL",
            "TOTAL_CANCELLEDORDERS",
            "TOTAL_PENDINGORDERS",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
