use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Keeps `offset()` far from i64 overflow for any page size
pub const MAX_PAGE: i64 = 1_000_000;

/// Resolved page window for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Clamp raw query values: page within 1..=MAX_PAGE, page size capped at 100
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            per_page: per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            total,
            page: self.page,
            per_page: self.per_page,
            total_pages: (total + self.per_page - 1) / self.per_page,
        }
    }
}

/// Pagination block attached to list responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offsets() {
        let pagination = Pagination::new(Some(3), Some(20));
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.limit(), 20);

        let large = Pagination::new(Some(1), Some(500));
        assert_eq!(large.limit(), 100);

        let negative = Pagination::new(Some(-4), Some(0));
        assert_eq!(negative.page, 1);
        assert_eq!(negative.per_page, 1);
    }

    #[test]
    fn test_huge_page_is_clamped() {
        let pagination = Pagination::new(Some(i64::MAX), Some(i64::MAX));
        assert_eq!(pagination.page, MAX_PAGE);
        assert_eq!(pagination.offset(), (MAX_PAGE - 1) * MAX_PAGE_SIZE);
        assert_eq!(pagination.meta(3).page, MAX_PAGE);
    }

    #[test]
    fn test_page_meta() {
        let meta = Pagination::new(None, Some(10)).meta(25);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(Pagination::default().meta(0).total_pages, 0);
    }
}
