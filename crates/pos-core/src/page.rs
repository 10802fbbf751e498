//! # Pagination
//!
//! `PageRequest` is what a client asks for (`?page=0&size=20`),
//! `Page<T>` is the envelope every paginated endpoint answers with.
//!
//! ```text
//! { "content": [...], "page": 0, "size": 20, "totalElements": 42, "totalPages": 3 }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// Page Request
// =============================================================================

/// Zero-based page number and page size, as received from the query string.
///
/// Out-of-range sizes are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        PageRequest { page, size }
    }

    /// Size clamped to `1..=MAX_PAGE_SIZE`.
    #[inline]
    pub fn limit(&self) -> u32 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Rows to skip for this page.
    #[inline]
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.limit())
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let size = request.limit();
        let total_pages = if total_elements <= 0 {
            0
        } else {
            (total_elements + i64::from(size) - 1) / i64::from(size)
        };

        Page {
            content,
            page: request.page,
            size,
            total_elements,
            total_pages,
        }
    }

    /// Converts the content, keeping the paging numbers.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }

    /// Empty pages are answered with `204 No Content`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
