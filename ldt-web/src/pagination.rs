//! Pagination utilities

use serde::Serialize;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
    pub page_size: i64,
}

/// Calculate pagination metadata from total results and requested page
///
/// The page is clamped to `[1, total_pages]`; an empty result set still has
/// page 1. A non-positive page size is treated as 1.
///
/// # Examples
/// ```
/// use ldt_web::pagination::calculate_pagination;
///
/// // 60 results at 25 per page = 3 pages (25 + 25 + 10)
/// let p = calculate_pagination(60, 2, 25);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 25);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(60, 99, 25);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 50);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64, page_size: i64) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = if total_results > 0 {
        (total_results - 1) / page_size + 1
    } else {
        0
    };
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        total_pages,
        offset,
        page_size,
    }
}

/// One page of a listing as returned by the API
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_rows: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total_rows: i64) -> Self {
        Self {
            items,
            page: pagination.page,
            page_size: pagination.page_size,
            total_rows,
            total_pages: pagination.total_pages,
        }
    }
}
