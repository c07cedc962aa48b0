use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{Order, OrderLine},
    pricing,
};

/// The in-progress order with its priced lines.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummary {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    #[schema(value_type = String)]
    pub total: Decimal,
    #[schema(value_type = String)]
    pub total_saved: Decimal,
}

impl OrderSummary {
    pub fn new(order: Order, lines: Vec<OrderLine>) -> Self {
        let total = pricing::order_total(lines.iter().map(|line| line.line_total));
        let total_saved = pricing::order_total(lines.iter().map(|line| line.amount_saved));
        Self {
            order,
            lines,
            total,
            total_saved,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::Item;

    fn item(price_cents: i64, discount_cents: Option<i64>) -> Item {
        let price = Decimal::new(price_cents, 2);
        let discount_price = discount_cents.map(|cents| Decimal::new(cents, 2));
        Item {
            id: Uuid::new_v4(),
            title: "Blue Shirt".into(),
            brand: None,
            description: "Cotton".into(),
            label: None,
            image: None,
            slug: "blue-shirt".into(),
            category_id: None,
            price,
            discount_price,
            effective_price: pricing::effective_price(price, discount_price),
            date_added: Utc::now(),
            date_modified: Utc::now(),
        }
    }

    fn open_order() -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date_started: Utc::now(),
            date_ordered: None,
            ordered: false,
            shipping_address_id: None,
            billing_address_id: None,
            being_delivered: false,
            received: false,
            refund_requested: false,
            refund_granted: false,
        }
    }

    #[test]
    fn summary_totals_lines_and_savings() {
        let lines = vec![
            OrderLine::new(Uuid::new_v4(), item(2000, None), 2, false),
            OrderLine::new(Uuid::new_v4(), item(3500, Some(500)), 1, false),
        ];
        let summary = OrderSummary::new(open_order(), lines);

        assert_eq!(summary.total, Decimal::new(7000, 2));
        assert_eq!(summary.total_saved, Decimal::new(500, 2));
        assert!(!summary.is_empty());
    }

    #[test]
    fn empty_summary_totals_zero() {
        let summary = OrderSummary::new(open_order(), Vec::new());
        assert!(summary.is_empty());
        assert_eq!(summary.total, Decimal::ZERO);
    }
}
