//! Pagination query parameter extractor.

use serde::Deserialize;

use murmur_core::error::AppError;
use murmur_core::types::pagination::{DEFAULT_PAGE_SIZE, PageRequest};

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-based, default: 1).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (default: 10, max: 100).
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    /// Converts to a `PageRequest`, rejecting out-of-range values.
    pub fn into_page_request(self) -> Result<PageRequest, AppError> {
        PageRequest::new(self.page, self.page_size)
    }
}
