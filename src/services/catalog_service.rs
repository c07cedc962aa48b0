use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};

use crate::{
    dto::catalog::{CatalogPage, CategoryList, ProductDetail, SearchResults},
    entity::{
        categories::{self, Column as CategoryCol, Entity as Categories},
        items::{self, Column as ItemCol, Entity as Items},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Category, Item},
    response::{ApiResponse, Meta},
    routes::params::{CATALOG_PER_PAGE, Pagination, SearchQuery},
    services::cart_service,
    state::AppState,
};

const NAV_CATEGORIES: u64 = 6;
const RELATED_ITEMS: u64 = 3;

pub async fn list_items(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<CatalogPage>> {
    let (items, meta) = paginate(state, newest_first(Items::find()), &pagination).await?;
    let categories = nav_categories(state).await?;

    let data = CatalogPage {
        items,
        categories,
        active_category: None,
    };
    Ok(ApiResponse::success("Items", data, Some(meta)))
}

pub async fn list_by_category(
    state: &AppState,
    slug: &str,
    pagination: Pagination,
) -> AppResult<ApiResponse<CatalogPage>> {
    let category = Categories::find()
        .filter(CategoryCol::Slug.eq(slug))
        .one(&state.orm)
        .await?;
    let category = match category {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let finder = newest_first(Items::find().filter(ItemCol::CategoryId.eq(category.id)));
    let (items, meta) = paginate(state, finder, &pagination).await?;
    let categories = nav_categories(state).await?;

    let data = CatalogPage {
        items,
        categories,
        active_category: Some(category.id),
    };
    Ok(ApiResponse::success(category.name, data, Some(meta)))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

/// Case-insensitive substring search over title and description.
///
/// A missing or blank `q` becomes the empty pattern, which matches every item.
pub async fn search(
    state: &AppState,
    query: SearchQuery,
) -> AppResult<ApiResponse<SearchResults>> {
    let pattern = search_pattern(query.q.as_deref());
    let condition = Condition::any()
        .add(Expr::col((items::Entity, ItemCol::Title)).ilike(pattern.clone()))
        .add(Expr::col((items::Entity, ItemCol::Description)).ilike(pattern));

    let finder = newest_first(Items::find().filter(condition));
    let (items, meta) = paginate(state, finder, &query.pagination()).await?;

    tracing::debug!(q = ?query.q, hits = items.len(), "catalog search");

    let data = SearchResults { q: query.q, items };
    Ok(ApiResponse::success("Search results", data, Some(meta)))
}

pub async fn product_detail(
    state: &AppState,
    viewer: Option<&AuthUser>,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let item = find_item_by_slug(&state.orm, slug).await?;

    let related_items = match item.category_id {
        Some(category_id) => newest_first(
            Items::find()
                .filter(ItemCol::CategoryId.eq(category_id))
                .filter(ItemCol::Id.ne(item.id)),
        )
        .limit(RELATED_ITEMS)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Item::from)
        .collect(),
        None => Vec::new(),
    };

    let already_added = match viewer {
        Some(user) => cart_service::cart_contains(&state.orm, user.user_id, item.id).await?,
        None => false,
    };

    let data = ProductDetail {
        item: Item::from(item),
        related_items,
        already_added,
    };
    Ok(ApiResponse::success("Product", data, None))
}

pub async fn find_item_by_slug<C: ConnectionTrait>(conn: &C, slug: &str) -> AppResult<items::Model> {
    let item = Items::find()
        .filter(ItemCol::Slug.eq(slug))
        .one(conn)
        .await?;
    match item {
        Some(item) => Ok(item),
        None => Err(AppError::NotFound),
    }
}

/// `%q%` with LIKE wildcards in `q` escaped so they match literally.
pub fn search_pattern(q: Option<&str>) -> String {
    let needle = q.unwrap_or_default().trim();
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn newest_first(finder: Select<Items>) -> Select<Items> {
    finder
        .order_by_desc(ItemCol::DateAdded)
        .order_by_asc(ItemCol::Id)
}

async fn paginate(
    state: &AppState,
    finder: Select<Items>,
    pagination: &Pagination,
) -> AppResult<(Vec<Item>, Meta)> {
    let (page, limit, offset) = pagination.normalize_with(CATALOG_PER_PAGE);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Item::from)
        .collect();

    Ok((items, Meta::new(page, limit, total)))
}

async fn nav_categories(state: &AppState) -> AppResult<Vec<Category>> {
    let categories: Vec<categories::Model> = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .limit(NAV_CATEGORIES)
        .all(&state.orm)
        .await?;
    Ok(categories.into_iter().map(Category::from).collect())
}

#[cfg(test)]
mod tests {
    use super::search_pattern;

    #[test]
    fn blank_query_matches_everything() {
        assert_eq!(search_pattern(None), "%%");
        assert_eq!(search_pattern(Some("   ")), "%%");
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(search_pattern(Some("shirt")), "%shirt%");
        assert_eq!(search_pattern(Some("50%_off")), "%50\\%\\_off%");
    }
}
