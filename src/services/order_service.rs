use chrono::Utc;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::{
        cart::OrderSummary,
        orders::{CheckoutPage, CheckoutRequest, OrderList},
    },
    entity::{
        addresses::{Column as AddressCol, Entity as Addresses},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Address, AddressType, Order},
    response::{ApiResponse, Flash, Meta},
    routes::params::Pagination,
    services::{address_service, cart_service},
    state::AppState,
};

pub const EMPTY_CART: &str = "Your cart is empty";
pub const ORDER_PLACED: &str = "Your order was placed";

#[derive(Debug)]
pub enum CheckoutOutcome {
    EmptyCart,
    Placed(Order),
}

impl CheckoutOutcome {
    pub fn flash(&self) -> Flash {
        match self {
            CheckoutOutcome::EmptyCart => Flash::warning(EMPTY_CART),
            CheckoutOutcome::Placed(_) => Flash::success(ORDER_PLACED),
        }
    }
}

pub async fn checkout_page(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CheckoutPage>> {
    let txn = state.orm.begin().await?;
    let summary = cart_service::load_summary(&txn, user.user_id).await?;
    txn.commit().await?;

    let addresses = address_service::addresses_of(&state.orm, user.user_id, None).await?;

    Ok(ApiResponse::success(
        "Checkout",
        CheckoutPage { summary, addresses },
        Some(Meta::empty()),
    ))
}

/// Turns the in-progress order into a placed order.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<CheckoutOutcome> {
    let txn = state.orm.begin().await?;
    cart_service::lock_owner(&txn, user.user_id).await?;

    let Some(order) = cart_service::find_open_order(&txn, user.user_id).await? else {
        return Ok(CheckoutOutcome::EmptyCart);
    };

    let line_count = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .count(&txn)
        .await?;
    if line_count == 0 {
        return Ok(CheckoutOutcome::EmptyCart);
    }

    let shipping = match payload.shipping_address_id {
        Some(id) => Some(owned_address(&txn, user.user_id, id, AddressType::Shipping).await?),
        None => None,
    };
    let billing = match payload.billing_address_id {
        Some(id) => Some(owned_address(&txn, user.user_id, id, AddressType::Billing).await?),
        None => None,
    };

    let mut active: OrderActive = order.into();
    active.ordered = Set(true);
    active.date_ordered = Set(Some(Utc::now().into()));
    active.shipping_address_id = Set(shipping.map(|a| a.id));
    active.billing_address_id = Set(billing.map(|a| a.id));
    let order = active.update(&txn).await?;

    OrderItems::update_many()
        .col_expr(OrderItemCol::Ordered, Expr::value(true))
        .filter(OrderItemCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    tracing::info!(user_id = %user.user_id, order_id = %order.id, lines = line_count, "order placed");

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::Checkout,
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(CheckoutOutcome::Placed(order.into()))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Ordered.eq(true)),
        )
        .order_by_desc(OrderCol::DateOrdered);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderSummary>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let lines = cart_service::order_lines(&state.orm, order.id).await?;

    Ok(ApiResponse::success(
        "OK",
        OrderSummary::new(order.into(), lines),
        Some(Meta::empty()),
    ))
}

pub async fn request_refund(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if !order.ordered {
        return Err(AppError::BadRequest("Order has not been placed".into()));
    }
    if order.refund_requested {
        return Err(AppError::BadRequest("Refund already requested".into()));
    }

    let mut active: OrderActive = order.into();
    active.refund_requested = Set(true);
    let order = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::RefundRequest,
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Refund requested",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

async fn owned_address(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    id: Uuid,
    expected: AddressType,
) -> AppResult<Address> {
    let address = Addresses::find()
        .filter(AddressCol::Id.eq(id))
        .filter(AddressCol::UserId.eq(user_id))
        .one(txn)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("unknown address {id}")))?;

    let address = Address::try_from(address)?;
    if address.address_type != expected {
        return Err(AppError::BadRequest(format!(
            "address {id} must have type {}",
            expected.code()
        )));
    }
    Ok(address)
}
