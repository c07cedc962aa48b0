use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::ItemLabel;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 30))]
    pub name: String,
    #[validate(length(max = 50))]
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(max = 20))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub description: String,
    pub label: Option<ItemLabel>,
    pub image: Option<String>,
    pub category_id: Option<Uuid>,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = Option<String>)]
    pub discount_price: Option<Decimal>,
    #[validate(length(max = 70))]
    pub slug: Option<String>,
}

/// Partial update; `category_id: null` keeps the current category.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 20))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub description: Option<String>,
    pub label: Option<ItemLabel>,
    pub image: Option<String>,
    pub category_id: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    /// Absent keeps the discount, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, nullable)]
    pub discount_price: Option<Option<Decimal>>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderFlagsRequest {
    pub being_delivered: Option<bool>,
    pub received: Option<bool>,
    pub refund_granted: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> UpdateItemRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn missing_discount_keeps_current_one() {
        assert_eq!(parse("{}").discount_price, None);
    }

    #[test]
    fn null_discount_clears_it() {
        assert_eq!(parse(r#"{"discount_price": null}"#).discount_price, Some(None));
    }

    #[test]
    fn explicit_discount_replaces_it() {
        assert_eq!(
            parse(r#"{"discount_price": "2.50"}"#).discount_price,
            Some(Some(Decimal::new(250, 2)))
        );
    }
}
