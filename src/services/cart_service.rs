//! Cart mutations over the user's single in-progress order.
//!
//! Every read-modify-write sequence runs in one transaction that starts by
//! locking the owner's user row, so two requests of the same user never
//! interleave between "look up" and "write".

use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::cart::OrderSummary,
    entity::{
        items::Entity as Items,
        order_items::{self, ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{self, ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Item, OrderLine},
    response::{ApiResponse, Flash, Meta},
    services::catalog_service::find_item_by_slug,
    state::AppState,
};

pub const NOT_IN_CART: &str = "This item is not in your cart";
pub const NO_ACTIVE_ORDER: &str = "You don't have an active order";
pub const ADDED_TO_CART: &str = "This item was added to the cart";
pub const ADDED_TO_NEW_CART: &str = "This item was added to the new cart";
pub const QUANTITY_UPDATED: &str = "This item quantity was updated";
pub const REMOVED_FROM_CART: &str = "Item was removed from your cart";

/// What removing one unit does to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    Delete,
    SetQuantity(i32),
}

impl Decrement {
    pub fn for_quantity(quantity: i32) -> Self {
        if quantity <= 1 {
            Decrement::Delete
        } else {
            Decrement::SetQuantity(quantity - 1)
        }
    }
}

/// Where a user's in-progress line for an item stands.
enum LineState {
    Missing,
    /// The line exists but the user has no in-progress order.
    Orphan(order_items::Model),
    Active(order_items::Model),
}

pub async fn add_to_cart(state: &AppState, user: &AuthUser, slug: &str) -> AppResult<Flash> {
    let item = find_item_by_slug(&state.orm, slug).await?;

    let txn = state.orm.begin().await?;
    lock_owner(&txn, user.user_id).await?;

    let line = match find_open_line(&txn, user.user_id, item.id).await? {
        Some(line) => line,
        None => {
            OrderItemActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                item_id: Set(item.id),
                order_id: Set(None),
                quantity: Set(1),
                ordered: Set(false),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    let flash = match find_open_order(&txn, user.user_id).await? {
        Some(order) if line.order_id == Some(order.id) => {
            let quantity = line.quantity + 1;
            let mut active: OrderItemActive = line.into();
            active.quantity = Set(quantity);
            active.update(&txn).await?;
            Flash::info(QUANTITY_UPDATED)
        }
        Some(order) => {
            attach(&txn, line, order.id).await?;
            Flash::success(ADDED_TO_CART)
        }
        None => {
            let order = create_open_order(&txn, user.user_id).await?;
            attach(&txn, line, order.id).await?;
            Flash::success(ADDED_TO_NEW_CART)
        }
    };

    txn.commit().await?;
    tracing::debug!(user_id = %user.user_id, item_id = %item.id, "cart add");

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::CartAdd,
        serde_json::json!({ "item_id": item.id }),
    )
    .await;

    Ok(flash)
}

pub async fn remove_from_cart(state: &AppState, user: &AuthUser, slug: &str) -> AppResult<Flash> {
    let item = find_item_by_slug(&state.orm, slug).await?;

    let txn = state.orm.begin().await?;
    lock_owner(&txn, user.user_id).await?;

    let line = match locate_line(&txn, user.user_id, item.id).await? {
        LineState::Missing => return Ok(not_in_cart(user, item.id)),
        LineState::Orphan(line) => return drop_orphan(txn, user, line).await,
        LineState::Active(line) => line,
    };

    // Deleting the row also detaches it from the order.
    OrderItems::delete_by_id(line.id).exec(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::CartRemove,
        serde_json::json!({ "item_id": item.id }),
    )
    .await;

    Ok(Flash::success(REMOVED_FROM_CART))
}

pub async fn remove_single_item(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
) -> AppResult<Flash> {
    let item = find_item_by_slug(&state.orm, slug).await?;

    let txn = state.orm.begin().await?;
    lock_owner(&txn, user.user_id).await?;

    let line = match locate_line(&txn, user.user_id, item.id).await? {
        LineState::Missing => return Ok(not_in_cart(user, item.id)),
        LineState::Orphan(line) => return drop_orphan(txn, user, line).await,
        LineState::Active(line) => line,
    };

    let flash = match Decrement::for_quantity(line.quantity) {
        Decrement::Delete => {
            OrderItems::delete_by_id(line.id).exec(&txn).await?;
            Flash::success(REMOVED_FROM_CART)
        }
        Decrement::SetQuantity(quantity) => {
            let mut active: OrderItemActive = line.into();
            active.quantity = Set(quantity);
            active.update(&txn).await?;
            Flash::info(QUANTITY_UPDATED)
        }
    };
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::CartDecrement,
        serde_json::json!({ "item_id": item.id }),
    )
    .await;

    Ok(flash)
}

/// The in-progress order, created on first sight, with its priced lines.
pub async fn order_summary(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderSummary>> {
    let txn = state.orm.begin().await?;
    let summary = load_summary(&txn, user.user_id).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Order summary",
        summary,
        Some(Meta::empty()),
    ))
}

pub(crate) async fn load_summary(
    txn: &DatabaseTransaction,
    user_id: Uuid,
) -> AppResult<OrderSummary> {
    lock_owner(txn, user_id).await?;
    let order = match find_open_order(txn, user_id).await? {
        Some(order) => order,
        None => create_open_order(txn, user_id).await?,
    };
    let lines = order_lines(txn, order.id).await?;
    Ok(OrderSummary::new(order.into(), lines))
}

/// Whether the user's in-progress order already holds a line for `item_id`.
pub async fn cart_contains<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    item_id: Uuid,
) -> AppResult<bool> {
    let Some(order) = find_open_order(conn, user_id).await? else {
        return Ok(false);
    };
    let count = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .filter(OrderItemCol::UserId.eq(user_id))
        .filter(OrderItemCol::ItemId.eq(item_id))
        .filter(OrderItemCol::Ordered.eq(false))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// Serializes cart work of one user for the rest of the transaction.
pub(crate) async fn lock_owner(txn: &DatabaseTransaction, user_id: Uuid) -> AppResult<()> {
    let owner = Users::find_by_id(user_id)
        .lock(LockType::Update)
        .one(txn)
        .await?;
    if owner.is_none() {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

pub(crate) async fn find_open_order<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Option<orders::Model>> {
    let order = Orders::find()
        .filter(OrderCol::UserId.eq(user_id))
        .filter(OrderCol::Ordered.eq(false))
        .one(conn)
        .await?;
    Ok(order)
}

pub(crate) async fn order_lines<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<Vec<OrderLine>> {
    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .find_also_related(Items)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(line, item)| {
            item.map(|item| OrderLine::new(line.id, Item::from(item), line.quantity, line.ordered))
        })
        .collect())
}

async fn create_open_order(txn: &DatabaseTransaction, user_id: Uuid) -> AppResult<orders::Model> {
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        ordered: Set(false),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    tracing::debug!(user_id = %user_id, order_id = %order.id, "opened cart order");
    Ok(order)
}

async fn find_open_line(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    item_id: Uuid,
) -> AppResult<Option<order_items::Model>> {
    let line = OrderItems::find()
        .filter(OrderItemCol::UserId.eq(user_id))
        .filter(OrderItemCol::ItemId.eq(item_id))
        .filter(OrderItemCol::Ordered.eq(false))
        .one(txn)
        .await?;
    Ok(line)
}

async fn locate_line(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    item_id: Uuid,
) -> AppResult<LineState> {
    let Some(line) = find_open_line(txn, user_id, item_id).await? else {
        return Ok(LineState::Missing);
    };
    match find_open_order(txn, user_id).await? {
        Some(_) => Ok(LineState::Active(line)),
        None => Ok(LineState::Orphan(line)),
    }
}

async fn attach(
    txn: &DatabaseTransaction,
    line: order_items::Model,
    order_id: Uuid,
) -> AppResult<()> {
    let mut active: OrderItemActive = line.into();
    active.order_id = Set(Some(order_id));
    active.update(txn).await?;
    Ok(())
}

fn not_in_cart(user: &AuthUser, item_id: Uuid) -> Flash {
    tracing::warn!(user_id = %user.user_id, item_id = %item_id, "item not in cart");
    Flash::warning(NOT_IN_CART)
}

async fn drop_orphan(
    txn: DatabaseTransaction,
    user: &AuthUser,
    line: order_items::Model,
) -> AppResult<Flash> {
    OrderItems::delete_by_id(line.id).exec(&txn).await?;
    txn.commit().await?;
    tracing::warn!(user_id = %user.user_id, line_id = %line.id, "dropped line without active order");
    Ok(Flash::warning(NO_ACTIVE_ORDER))
}
