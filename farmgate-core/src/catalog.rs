//! Product categories and listing queries

use crate::config::CatalogConfig;
use crate::error::FarmgateResult;
use crate::validation_error;
use serde::{Deserialize, Serialize};

/// Product categories, stored by numeric id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Vegetables,
    Fruits,
    Seeds,
}

impl ProductCategory {
    pub fn id(&self) -> i64 {
        match self {
            ProductCategory::Vegetables => 1,
            ProductCategory::Fruits => 2,
            ProductCategory::Seeds => 3,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(ProductCategory::Vegetables),
            2 => Some(ProductCategory::Fruits),
            3 => Some(ProductCategory::Seeds),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "vegetables" => Some(ProductCategory::Vegetables),
            "fruits" => Some(ProductCategory::Fruits),
            "seeds" => Some(ProductCategory::Seeds),
            _ => None,
        }
    }
}

/// Ordering of a product listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    DateAsc,
    #[default]
    DateDesc,
}

impl ProductSort {
    /// Unknown or empty values fall back to newest first
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("price_asc") => ProductSort::PriceAsc,
            Some("price_desc") => ProductSort::PriceDesc,
            Some("date_asc") => ProductSort::DateAsc,
            _ => ProductSort::DateDesc,
        }
    }

    /// SQL `ORDER BY` body; `id` breaks ties so paging is stable
    pub fn order_by(&self) -> &'static str {
        match self {
            ProductSort::PriceAsc => "price ASC, id ASC",
            ProductSort::PriceDesc => "price DESC, id DESC",
            ProductSort::DateAsc => "created_at ASC, id ASC",
            ProductSort::DateDesc => "created_at DESC, id DESC",
        }
    }
}

/// Category part of a listing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No filter, also used for `all`
    Any,
    Only(ProductCategory),
    /// A name that is not a category; matches nothing
    Unknown,
}

/// Normalised listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: CategoryFilter,
    /// Search term with ASCII letters lowercased, `None` when blank
    ///
    /// Only ASCII is folded so the term compares the same way as SQLite's
    /// `LOWER` does on the stored names.
    pub search: Option<String>,
    pub sort: ProductSort,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl CatalogQuery {
    pub fn new(
        category: Option<&str>,
        search: Option<&str>,
        sort: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
        settings: &CatalogConfig,
    ) -> Self {
        let category = match category.map(str::trim) {
            None | Some("") => CategoryFilter::Any,
            Some(name) if name.eq_ignore_ascii_case("all") => CategoryFilter::Any,
            Some(name) => ProductCategory::from_name(name)
                .map(CategoryFilter::Only)
                .unwrap_or(CategoryFilter::Unknown),
        };

        let search = search
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty());

        let limit = limit
            .unwrap_or(settings.default_page_size)
            .clamp(1, settings.max_page_size);

        Self {
            category,
            search,
            sort: ProductSort::from_param(sort),
            page: page.unwrap_or(1).max(1),
            limit,
        }
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Field checks applied to a product before it is written
pub fn validate_product_fields(
    name: &str,
    category_id: i64,
    price: f64,
    quantity: i64,
) -> FarmgateResult<()> {
    if name.trim().is_empty() {
        return Err(validation_error!("name is required", "name", "product"));
    }
    if ProductCategory::from_id(category_id).is_none() {
        return Err(validation_error!(
            format!("unknown category id {}", category_id),
            "category_id",
            "product"
        ));
    }
    if !price.is_finite() || price <= 0.0 {
        return Err(validation_error!(
            "price must be greater than 0",
            "price",
            "product"
        ));
    }
    if quantity < 0 {
        return Err(validation_error!(
            "quantity cannot be negative",
            "quantity",
            "product"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(category: Option<&str>, page: Option<u32>, limit: Option<u32>) -> CatalogQuery {
        CatalogQuery::new(category, None, None, page, limit, &CatalogConfig::default())
    }

    #[test]
    fn test_category_names_map_to_ids() {
        assert_eq!(ProductCategory::from_name("Vegetables").map(|c| c.id()), Some(1));
        assert_eq!(ProductCategory::from_name("fruits").map(|c| c.id()), Some(2));
        assert_eq!(ProductCategory::from_name("seeds").map(|c| c.id()), Some(3));
        assert_eq!(ProductCategory::from_name("meat"), None);
    }

    #[test]
    fn test_category_filter() {
        assert_eq!(query(None, None, None).category, CategoryFilter::Any);
        assert_eq!(query(Some("all"), None, None).category, CategoryFilter::Any);
        assert_eq!(query(Some(""), None, None).category, CategoryFilter::Any);
        assert_eq!(
            query(Some("seeds"), None, None).category,
            CategoryFilter::Only(ProductCategory::Seeds)
        );
        assert_eq!(query(Some("tools"), None, None).category, CategoryFilter::Unknown);
    }

    #[test]
    fn test_paging_is_clamped() {
        let q = query(None, Some(0), Some(0));
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 1);
        assert_eq!(q.offset(), 0);

        let q = query(None, Some(3), Some(10_000));
        assert_eq!(q.limit, 100);
        assert_eq!(q.offset(), 200);

        assert_eq!(query(None, None, None).limit, 12);
    }

    #[test]
    fn test_sort_and_search_normalisation() {
        let q = CatalogQuery::new(
            None,
            Some("  Tomato "),
            Some("price_desc"),
            None,
            None,
            &CatalogConfig::default(),
        );
        assert_eq!(q.search.as_deref(), Some("tomato"));
        let q = CatalogQuery::new(None, Some("ÉPI 50%"), None, None, None, &CatalogConfig::default());
        assert_eq!(q.search.as_deref(), Some("Épi 50%"));
        assert_eq!(q.sort, ProductSort::PriceDesc);
        assert_eq!(ProductSort::from_param(Some("bogus")), ProductSort::DateDesc);
        assert_eq!(ProductSort::from_param(None).order_by(), "created_at DESC, id DESC");
    }

    #[test]
    fn test_product_field_validation() {
        assert!(validate_product_fields("Kale", 1, 2.5, 0).is_ok());
        assert_eq!(
            validate_product_fields(" ", 1, 2.5, 1).unwrap_err().field(),
            Some("name")
        );
        assert_eq!(
            validate_product_fields("Kale", 0, 2.5, 1).unwrap_err().field(),
            Some("category_id")
        );
        assert_eq!(
            validate_product_fields("Kale", 1, 0.0, 1).unwrap_err().field(),
            Some("price")
        );
        assert_eq!(
            validate_product_fields("Kale", 1, 1.0, -1).unwrap_err().field(),
            Some("quantity")
        );
    }
}
