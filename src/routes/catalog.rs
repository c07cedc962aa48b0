use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::catalog::{CatalogPage, CategoryList, ProductDetail, SearchResults},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{Pagination, SearchQuery},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", get(home))
        .route("/categories", get(list_categories))
        .route("/categories/{slug}", get(by_category))
        .route("/products/{slug}", get(product_detail))
        .route("/search", get(search))
}

#[utoipa::path(
    get,
    path = "/api/items",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 8")
    ),
    responses(
        (status = 200, description = "Newest items first with category navigation", body = ApiResponse<CatalogPage>)
    ),
    tag = "Catalog"
)]
pub async fn home(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CatalogPage>>> {
    let resp = catalog_service::list_items(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = catalog_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 8")
    ),
    responses(
        (status = 200, description = "Items of one category", body = ApiResponse<CatalogPage>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Catalog"
)]
pub async fn by_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CatalogPage>>> {
    let resp = catalog_service::list_by_category(&state, &slug, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    params(
        ("slug" = String, Path, description = "Item slug")
    ),
    responses(
        (status = 200, description = "Item with related items", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Item not found"),
    ),
    security((), ("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn product_detail(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = catalog_service::product_detail(&state, user.as_ref(), &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(
        ("q" = Option<String>, Query, description = "Matched against title and description, case-insensitive"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 8")
    ),
    responses(
        (status = 200, description = "Matching items", body = ApiResponse<SearchResults>)
    ),
    tag = "Catalog"
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<SearchResults>>> {
    let resp = catalog_service::search(&state, query).await?;
    Ok(Json(resp))
}
