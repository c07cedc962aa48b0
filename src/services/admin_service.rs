use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::{self, AuditAction},
    dto::{
        admin::{CreateCategoryRequest, CreateItemRequest, UpdateItemRequest, UpdateOrderFlagsRequest},
        orders::OrderList,
    },
    entity::{
        categories::{ActiveModel as CategoryActive, Entity as Categories},
        items::{ActiveModel as ItemActive, Entity as Items},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Item, Order},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    slugs,
    state::AppState,
};

/// Upper bounds of the NUMERIC(6,2) price and NUMERIC(5,2) discount columns.
const MAX_PRICE: Decimal = Decimal::from_parts(999_999, 0, 0, false, 2);
const MAX_DISCOUNT: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    payload.validate()?;

    let slug = slugs::explicit_or(payload.slug, || slugs::category_slug(&payload.name));
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        slug: Set(slug),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::CategoryCreate,
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    ensure_admin(user)?;
    payload.validate()?;
    validate_pricing(payload.price, payload.discount_price)?;
    if let Some(category_id) = payload.category_id {
        ensure_category(state, category_id).await?;
    }

    let now = Utc::now();
    let slug = slugs::explicit_or(payload.slug, || slugs::item_slug(&payload.title, now));
    let item = ItemActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title),
        brand: Set(payload.brand),
        description: Set(payload.description),
        label: Set(payload.label.map(|label| label.code().to_string())),
        image: Set(payload.image),
        slug: Set(slug),
        category_id: Set(payload.category_id),
        price: Set(payload.price),
        discount_price: Set(payload.discount_price),
        date_added: Set(now.into()),
        date_modified: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::ItemCreate,
        serde_json::json!({ "item_id": item.id, "slug": item.slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Item created",
        Item::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Items::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let price = payload.price.unwrap_or(existing.price);
    let discount_price = payload.discount_price.unwrap_or(existing.discount_price);
    validate_pricing(price, discount_price)?;
    if let Some(category_id) = payload.category_id {
        ensure_category(state, category_id).await?;
    }

    let mut active: ItemActive = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(brand) = payload.brand {
        active.brand = Set(Some(brand));
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(label) = payload.label {
        active.label = Set(Some(label.code().to_string()));
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    active.price = Set(price);
    active.discount_price = Set(discount_price);
    active.date_modified = Set(Utc::now().into());

    let item = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::ItemUpdate,
        serde_json::json!({ "item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Item::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Items::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::ItemDelete,
        serde_json::json!({ "item_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_placed_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Orders::find()
        .filter(OrderCol::Ordered.eq(true))
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
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn update_order_flags(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderFlagsRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if !existing.ordered {
        return Err(AppError::BadRequest("Order has not been placed".into()));
    }
    if payload.refund_granted == Some(true) && !existing.refund_requested {
        return Err(AppError::BadRequest("No refund was requested".into()));
    }

    let mut active: OrderActive = existing.into();
    if let Some(being_delivered) = payload.being_delivered {
        active.being_delivered = Set(being_delivered);
    }
    if let Some(received) = payload.received {
        active.received = Set(received);
    }
    if let Some(refund_granted) = payload.refund_granted {
        active.refund_granted = Set(refund_granted);
    }
    let order = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::OrderUpdate,
        serde_json::json!({
            "order_id": order.id,
            "being_delivered": order.being_delivered,
            "received": order.received,
            "refund_granted": order.refund_granted,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

/// Prices keep two decimals, fit their columns, and a discount never exceeds the price.
pub fn validate_pricing(price: Decimal, discount_price: Option<Decimal>) -> AppResult<()> {
    if price.is_sign_negative() || price > MAX_PRICE || price.round_dp(2) != price {
        return Err(AppError::BadRequest(format!(
            "price must be between 0 and {MAX_PRICE} with at most two decimals"
        )));
    }
    if let Some(discount) = discount_price {
        if discount.is_sign_negative() || discount > MAX_DISCOUNT || discount.round_dp(2) != discount
        {
            return Err(AppError::BadRequest(format!(
                "discount_price must be between 0 and {MAX_DISCOUNT} with at most two decimals"
            )));
        }
        if discount > price {
            return Err(AppError::BadRequest(
                "discount_price cannot exceed price".into(),
            ));
        }
    }
    Ok(())
}

async fn ensure_category(state: &AppState, category_id: Uuid) -> AppResult<()> {
    let exists = Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .is_some();
    if !exists {
        return Err(AppError::BadRequest(format!(
            "category {category_id} does not exist"
        )));
    }
    Ok(())
}
