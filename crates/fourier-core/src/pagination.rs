//! Pagination types for list operations.

use serde::{Deserialize, Serialize};

/// A 1-indexed page of a listing. Page 0 is read as page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 10;
    pub const MAX_SIZE: u32 = 100;

    /// Creates a new page request, clamping the page to at least 1 and the
    /// size to `1..=MAX_SIZE`.
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    #[must_use]
    pub fn first() -> Self {
        Self::new(1, Self::DEFAULT_SIZE)
    }

    /// Rows to skip: `(page - 1) * size`.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.size as i64
    }

    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Totals that accompany a page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PageInfo {
    pub page: u32,
    pub size: u32,
    /// Matching rows across all pages.
    pub total_elements: u64,
    pub total_pages: u64,
}

impl PageInfo {
    #[must_use]
    pub fn new(request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size);
        let total_pages = if size > 0 {
            total_elements.div_ceil(size)
        } else {
            0
        };

        Self {
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }

    /// Returns true if a page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages
    }
}

/// One page of a listing. Serializes as `content` next to the
/// [`PageInfo`] fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(flatten)]
    pub info: PageInfo,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            info: PageInfo::new(request, total_elements),
        }
    }

    /// Maps the page content to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            info: self.info,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
