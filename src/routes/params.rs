use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::AddressType;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const CATALOG_PER_PAGE: i64 = 8;
const MAX_PER_PAGE: i64 = 100;
/// Highest page whose offset still fits in an `i64`.
const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn normalize(&self) -> (i64, i64, i64) {
        self.normalize_with(DEFAULT_PER_PAGE)
    }

    /// Returns `(page, per_page, offset)` with `page` in `1..=MAX_PAGE` and `per_page` in `1..=100`.
    pub fn normalize_with(&self, default_per_page: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self
            .per_page
            .unwrap_or(default_per_page)
            .clamp(1, MAX_PER_PAGE);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

/// Query string of the search page. Pagination fields are spelled out
/// because flattened structs lose number parsing in query strings.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl SearchQuery {
    pub fn new(q: Option<&str>) -> Self {
        Self {
            q: q.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddressQuery {
    pub address_type: Option<AddressType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
        assert_eq!(
            Pagination::default().normalize_with(CATALOG_PER_PAGE),
            (1, 8, 0)
        );
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Pagination::new(0, 0).normalize(), (1, 1, 0));
        assert_eq!(Pagination::new(3, 500).normalize(), (3, 100, 200));
        assert_eq!(Pagination::new(-2, 8).normalize(), (1, 8, 0));
    }

    #[test]
    fn huge_page_keeps_offset_in_range() {
        let (page, per_page, offset) = Pagination::new(i64::MAX, 8).normalize_with(CATALOG_PER_PAGE);
        assert_eq!(page, MAX_PAGE);
        assert_eq!(per_page, 8);
        assert_eq!(offset, (MAX_PAGE - 1) * 8);
        assert!(offset > 0);

        let (_, _, offset) = Pagination::new(i64::MAX, 100).normalize();
        assert!(offset > 0);
    }
}
