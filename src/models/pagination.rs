//! Pagination, search and ordering parameters shared by the list endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-insensitive substring matched against the endpoint's search fields
    pub search: Option<String>,
    /// Comma separated field names, `-` prefix for descending, e.g. `-created_at,id`
    pub ordering: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// One `ordering` term after parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub field: String,
    pub descending: bool,
}

impl ListQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Saturates instead of overflowing for absurd page numbers
    pub fn get_offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.page_size())
    }

    pub fn get_limit(&self) -> i64 {
        self.page_size()
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn order_terms(&self) -> Vec<OrderTerm> {
        self.ordering
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "-")
            .map(|s| match s.strip_prefix('-') {
                Some(field) => OrderTerm {
                    field: field.to_string(),
                    descending: true,
                },
                None => OrderTerm {
                    field: s.to_string(),
                    descending: false,
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, page_size: i64, total: i64) -> Self {
        let total_pages = if total == 0 {
            1
        } else {
            (total + page_size - 1) / page_size
        };
        Self {
            data,
            page,
            page_size,
            total,
            total_pages,
        }
    }

    pub fn from_query(data: Vec<T>, query: &ListQuery, total: i64) -> Self {
        Self::new(data, query.page(), query.page_size(), total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let q = ListQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 20);
        assert_eq!(q.get_offset(), 0);
        assert_eq!(q.get_limit(), 20);
    }

    #[test]
    fn test_pagination_clamps() {
        let q = ListQuery {
            page: Some(0),
            page_size: Some(1000),
            ..Default::default()
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 100);

        let q = ListQuery {
            page: Some(3),
            page_size: Some(10),
            ..Default::default()
        };
        assert_eq!(q.get_offset(), 20);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let q = ListQuery {
            page: Some(i64::MAX),
            page_size: Some(100),
            ..Default::default()
        };
        assert_eq!(q.get_offset(), i64::MAX);
        assert!(q.get_offset() >= 0);
    }

    #[test]
    fn test_order_terms() {
        let q = ListQuery {
            ordering: Some("-created_at, first_name,,-".into()),
            ..Default::default()
        };
        assert_eq!(
            q.order_terms(),
            vec![
                OrderTerm {
                    field: "created_at".into(),
                    descending: true
                },
                OrderTerm {
                    field: "first_name".into(),
                    descending: false
                },
            ]
        );
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let q = ListQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(q.search_term(), None);
    }

    #[test]
    fn test_total_pages() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 1, 10, 25);
        assert_eq!(page.total_pages, 3);
        let empty: PaginatedResponse<i32> = PaginatedResponse::new(vec![], 1, 10, 0);
        assert_eq!(empty.total_pages, 1);
    }
}
