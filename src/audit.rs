//! Append-only trail of customer and admin actions in `audit_logs`.

use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UserRegister,
    UserLogin,
    CartAdd,
    CartRemove,
    CartDecrement,
    Checkout,
    RefundRequest,
    AddressCreate,
    CategoryCreate,
    ItemCreate,
    ItemUpdate,
    ItemDelete,
    OrderUpdate,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::UserRegister => "user_register",
            AuditAction::UserLogin => "user_login",
            AuditAction::CartAdd => "cart_add",
            AuditAction::CartRemove => "cart_remove",
            AuditAction::CartDecrement => "cart_decrement",
            AuditAction::Checkout => "checkout",
            AuditAction::RefundRequest => "refund_request",
            AuditAction::AddressCreate => "address_create",
            AuditAction::CategoryCreate => "category_create",
            AuditAction::ItemCreate => "item_create",
            AuditAction::ItemUpdate => "item_update",
            AuditAction::ItemDelete => "item_delete",
            AuditAction::OrderUpdate => "order_update",
        }
    }

    /// Table the action touches.
    pub fn resource(self) -> &'static str {
        match self {
            AuditAction::UserRegister | AuditAction::UserLogin => "users",
            AuditAction::CartAdd | AuditAction::CartRemove | AuditAction::CartDecrement => {
                "order_items"
            }
            AuditAction::Checkout | AuditAction::RefundRequest | AuditAction::OrderUpdate => {
                "orders"
            }
            AuditAction::AddressCreate => "addresses",
            AuditAction::CategoryCreate => "categories",
            AuditAction::ItemCreate | AuditAction::ItemUpdate | AuditAction::ItemDelete => "items",
        }
    }
}

pub async fn insert_entry(
    pool: &DbPool,
    user_id: Uuid,
    action: AuditAction,
    metadata: &Value,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(action.as_str())
    .bind(action.resource())
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Best-effort audit entry: a failed insert is logged and never fails the request.
pub async fn record(pool: &DbPool, user_id: Uuid, action: AuditAction, metadata: Value) {
    if let Err(err) = insert_entry(pool, user_id, action, &metadata).await {
        tracing::warn!(error = %err, action = action.as_str(), "audit log failed");
    }
}
