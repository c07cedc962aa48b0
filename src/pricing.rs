//! Money arithmetic for catalog items and cart lines.
//!
//! A discount is an amount taken off the listed price, not a replacement
//! price. Every figure keeps two decimal places.

use rust_decimal::Decimal;

/// Price a customer pays for one unit.
///
/// Missing, zero or negative discounts leave the listed price untouched and
/// the result never drops below zero.
pub fn effective_price(price: Decimal, discount_price: Option<Decimal>) -> Decimal {
    match discount_price {
        Some(discount) if discount > Decimal::ZERO => (price - discount).max(Decimal::ZERO),
        _ => price,
    }
}

pub fn line_total(price: Decimal, discount_price: Option<Decimal>, quantity: i32) -> Decimal {
    effective_price(price, discount_price) * Decimal::from(quantity)
}

/// Amount saved on a line thanks to the discount.
pub fn line_savings(price: Decimal, discount_price: Option<Decimal>, quantity: i32) -> Decimal {
    (price - effective_price(price, discount_price)) * Decimal::from(quantity)
}

pub fn order_total<I>(line_totals: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    line_totals.into_iter().sum()
}
