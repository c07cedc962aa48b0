use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{addresses, categories, items, orders, profiles, users},
    error::AppError,
    pricing,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub role: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            created_at: model.created_at.with_timezone(&Utc),
            role: model.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<profiles::Model> for Profile {
    fn from(model: profiles::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ItemLabel {
    #[serde(rename = "N")]
    New,
    #[serde(rename = "T")]
    Top,
}

impl ItemLabel {
    pub fn code(self) -> &'static str {
        match self {
            ItemLabel::New => "N",
            ItemLabel::Top => "T",
        }
    }
}

impl TryFrom<&str> for ItemLabel {
    type Error = AppError;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        match code {
            "N" => Ok(ItemLabel::New),
            "T" => Ok(ItemLabel::Top),
            other => Err(AppError::BadRequest(format!("unknown item label {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub brand: Option<String>,
    pub description: String,
    pub label: Option<ItemLabel>,
    pub image: Option<String>,
    pub slug: String,
    pub category_id: Option<Uuid>,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = Option<String>)]
    pub discount_price: Option<Decimal>,
    #[schema(value_type = String)]
    pub effective_price: Decimal,
    pub date_added: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl From<items::Model> for Item {
    fn from(model: items::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            brand: model.brand,
            description: model.description,
            // The column carries a CHECK constraint, anything else is ignored.
            label: model
                .label
                .as_deref()
                .and_then(|code| ItemLabel::try_from(code).ok()),
            image: model.image,
            slug: model.slug,
            category_id: model.category_id,
            price: model.price,
            discount_price: model.discount_price,
            effective_price: pricing::effective_price(model.price, model.discount_price),
            date_added: model.date_added.with_timezone(&Utc),
            date_modified: model.date_modified.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AddressType {
    #[serde(rename = "S")]
    Shipping,
    #[serde(rename = "B")]
    Billing,
}

impl AddressType {
    pub fn code(self) -> &'static str {
        match self {
            AddressType::Shipping => "S",
            AddressType::Billing => "B",
        }
    }
}

impl TryFrom<&str> for AddressType {
    type Error = AppError;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        match code {
            "S" => Ok(AddressType::Shipping),
            "B" => Ok(AddressType::Billing),
            other => Err(AppError::BadRequest(format!("unknown address type {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub street_address: String,
    pub apartment_address: String,
    pub country: String,
    pub zip_code: String,
    pub address_type: AddressType,
    pub default: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<addresses::Model> for Address {
    type Error = AppError;

    fn try_from(model: addresses::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            street_address: model.street_address,
            apartment_address: model.apartment_address,
            country: model.country,
            zip_code: model.zip_code,
            address_type: AddressType::try_from(model.address_type.as_str())?,
            default: model.is_default,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date_started: DateTime<Utc>,
    pub date_ordered: Option<DateTime<Utc>>,
    pub ordered: bool,
    pub shipping_address_id: Option<Uuid>,
    pub billing_address_id: Option<Uuid>,
    pub being_delivered: bool,
    pub received: bool,
    pub refund_requested: bool,
    pub refund_granted: bool,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            date_started: model.date_started.with_timezone(&Utc),
            date_ordered: model.date_ordered.map(|dt| dt.with_timezone(&Utc)),
            ordered: model.ordered,
            shipping_address_id: model.shipping_address_id,
            billing_address_id: model.billing_address_id,
            being_delivered: model.being_delivered,
            received: model.received,
            refund_requested: model.refund_requested,
            refund_granted: model.refund_granted,
        }
    }
}

/// One cart or order line, priced at read time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub id: Uuid,
    pub item: Item,
    pub quantity: i32,
    pub ordered: bool,
    #[schema(value_type = String)]
    pub line_total: Decimal,
    #[schema(value_type = String)]
    pub amount_saved: Decimal,
}

impl OrderLine {
    pub fn new(id: Uuid, item: Item, quantity: i32, ordered: bool) -> Self {
        let line_total = pricing::line_total(item.price, item.discount_price, quantity);
        let amount_saved = pricing::line_savings(item.price, item.discount_price, quantity);
        Self {
            id,
            item,
            quantity,
            ordered,
            line_total,
            amount_saved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_codes() {
        for label in [ItemLabel::New, ItemLabel::Top] {
            assert_eq!(ItemLabel::try_from(label.code()).unwrap(), label);
        }
        assert!(ItemLabel::try_from("X").is_err());
    }

    #[test]
    fn address_type_rejects_unknown_codes() {
        assert_eq!(AddressType::try_from("S").unwrap(), AddressType::Shipping);
        assert_eq!(AddressType::try_from("B").unwrap(), AddressType::Billing);
        assert!(AddressType::try_from("shipping").is_err());
    }

    #[test]
    fn user_never_serializes_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@example.com".into(),
            password_hash: "secret".into(),
            created_at: Utc::now(),
            role: "user".into(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
    }
}
