use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::repositories::paged_list::{Page, PagedList};
use crate::utils::errors::AppError;

/// Common pagination parameters for list endpoints
#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
pub struct PaginationOptions {
    /// Page number (starts at 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl PaginationOptions {
    /// Pagination is a caller contract: both values are 1-based and positive.
    pub fn validate(&self) -> Result<Page, AppError> {
        if self.page == 0 || self.limit == 0 {
            return Err(AppError::BadRequest(
                "page and limit must be positive".to_string(),
            ));
        }
        Ok(Page {
            number: self.page,
            size: self.limit,
        })
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    /// List of items for the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total_items: i64,
    /// Current page number
    pub current_page: u32,
    /// Items per page
    pub items_per_page: u32,
    /// Total number of pages
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    /// Wrap already-projected items with the metadata of the list they came
    /// from.
    pub fn with_meta<S>(items: Vec<T>, source: &PagedList<S>) -> Self {
        PaginatedResponse {
            items,
            total_items: source.total_count,
            current_page: source.page,
            items_per_page: source.page_size,
            total_pages: source.total_pages(),
        }
    }
}

impl<T> From<PagedList<T>> for PaginatedResponse<T> {
    fn from(list: PagedList<T>) -> Self {
        let total_pages = list.total_pages();
        PaginatedResponse {
            total_items: list.total_count,
            current_page: list.page,
            items_per_page: list.page_size,
            total_pages,
            items: list.items,
        }
    }
}

pub(crate) fn default_page() -> u32 {
    1
}

pub(crate) fn default_limit() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_apply_when_absent() {
        let options: PaginationOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.page, 1);
        assert_eq!(options.limit, 10);
    }

    #[test]
    fn zero_page_or_limit_is_rejected() {
        let options = PaginationOptions { page: 0, limit: 10 };
        assert!(matches!(
            options.validate(),
            Err(AppError::BadRequest(_))
        ));

        let options = PaginationOptions { page: 1, limit: 0 };
        assert!(matches!(
            options.validate(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn valid_options_become_a_page() {
        let options = PaginationOptions { page: 2, limit: 25 };
        assert_eq!(options.validate().unwrap(), Page { number: 2, size: 25 });
    }

    #[test]
    fn response_inherits_list_metadata() {
        let page = Page { number: 2, size: 10 };
        let list = PagedList::new(vec![1, 2, 3], 25, &page);
        let response: PaginatedResponse<i32> = list.into();

        assert_eq!(response.items, vec![1, 2, 3]);
        assert_eq!(response.total_items, 25);
        assert_eq!(response.current_page, 2);
        assert_eq!(response.items_per_page, 10);
        assert_eq!(response.total_pages, 3);
    }
}
