use axum::Router;

use crate::state::AppState;

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;

pub const ORDER_SUMMARY_PATH: &str = "/api/order-summary";

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .merge(cart::router())
        .merge(orders::checkout_router())
        .nest("/auth", auth::router())
        .nest("/orders", orders::router())
        .nest("/addresses", addresses::router())
        .nest("/admin", admin::router())
}
