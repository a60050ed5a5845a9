//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Maximum page size.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
}

impl PageRequest {
    /// Create a page request, rejecting out-of-range values.
    pub fn new(page: u64, page_size: u64) -> Result<Self, AppError> {
        if page < 1 {
            return Err(AppError::validation("page must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        let offset_fits = (page - 1)
            .checked_mul(page_size)
            .is_some_and(|offset| offset <= i64::MAX as u64);
        if !offset_fits {
            return Err(AppError::validation("page is out of range"));
        }
        Ok(Self { page, page_size })
    }

    /// Calculate the SQL `OFFSET` value, capped at `i64::MAX`.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(i64::MAX as u64)
    }

    /// Return the SQL `LIMIT` value.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages; zero when there are no items.
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total,
            total_pages: total.div_ceil(request.page_size),
        }
    }

    /// Map the items while keeping the totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let req = PageRequest::new(3, 20).unwrap();
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, 101).is_err());
        assert!(PageRequest::new(1, 100).is_ok());
    }

    #[test]
    fn test_rejects_page_past_addressable_offset() {
        let err = PageRequest::new(u64::MAX / 50, 100).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Validation);
        assert!(PageRequest::new(u64::MAX, 1).is_err());

        let last = i64::MAX as u64 / 100 + 1;
        assert_eq!(PageRequest::new(last, 100).unwrap().offset(), (last - 1) * 100);
    }

    #[test]
    fn test_offset_saturates_for_hand_built_requests() {
        let req = PageRequest {
            page: u64::MAX,
            page_size: MAX_PAGE_SIZE,
        };
        assert_eq!(req.offset(), i64::MAX as u64);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let req = PageRequest::new(1, 10).unwrap();
        let page = PageResponse::new(vec![1, 2, 3], req, 21);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_total_pages_zero_when_empty() {
        let page: PageResponse<u8> = PageResponse::new(Vec::new(), PageRequest::default(), 0);
        assert_eq!(page.total_pages, 0);
    }
}
