use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Item};

/// A page of items plus the category navigation shown next to it.
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogPage {
    pub items: Vec<Item>,
    pub categories: Vec<Category>,
    pub active_category: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub item: Item,
    pub related_items: Vec<Item>,
    pub already_added: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResults {
    pub q: Option<String>,
    pub items: Vec<Item>,
}
