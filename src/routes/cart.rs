use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::cart::OrderSummary,
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, FlashRedirect, RedirectData},
    routes::ORDER_SUMMARY_PATH,
    services::cart_service,
    state::AppState,
};

// Cart links are plain navigations, so every mutation answers GET as well as POST.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add-to-cart/{slug}", get(add_to_cart).post(add_to_cart))
        .route(
            "/remove-from-cart/{slug}",
            get(remove_from_cart).post(remove_from_cart),
        )
        .route(
            "/remove-single-item-from-cart/{slug}",
            get(remove_single_item).post(remove_single_item),
        )
        .route("/order-summary", get(order_summary))
}

#[utoipa::path(
    get,
    path = "/api/add-to-cart/{slug}",
    params(
        ("slug" = String, Path, description = "Item slug")
    ),
    responses(
        (status = 303, description = "Item added, redirect to the order summary", body = ApiResponse<RedirectData>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<FlashRedirect> {
    let flash = cart_service::add_to_cart(&state, &user, &slug).await?;
    Ok(FlashRedirect::new(ORDER_SUMMARY_PATH, flash))
}

#[utoipa::path(
    get,
    path = "/api/remove-from-cart/{slug}",
    params(
        ("slug" = String, Path, description = "Item slug")
    ),
    responses(
        (status = 303, description = "Line removed, or a warning when it was not in the cart", body = ApiResponse<RedirectData>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<FlashRedirect> {
    let flash = cart_service::remove_from_cart(&state, &user, &slug).await?;
    Ok(FlashRedirect::new(ORDER_SUMMARY_PATH, flash))
}

#[utoipa::path(
    get,
    path = "/api/remove-single-item-from-cart/{slug}",
    params(
        ("slug" = String, Path, description = "Item slug")
    ),
    responses(
        (status = 303, description = "One unit removed", body = ApiResponse<RedirectData>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_single_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<FlashRedirect> {
    let flash = cart_service::remove_single_item(&state, &user, &slug).await?;
    Ok(FlashRedirect::new(ORDER_SUMMARY_PATH, flash))
}

#[utoipa::path(
    get,
    path = "/api/order-summary",
    responses(
        (status = 200, description = "In-progress order with priced lines", body = ApiResponse<OrderSummary>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn order_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderSummary>>> {
    let resp = cart_service::order_summary(&state, &user).await?;
    Ok(Json(resp))
}
