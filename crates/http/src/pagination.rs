//! Page-number pagination for list endpoints.

use innkeep_kernel::settings::PaginationSettings;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Raw `?page=&page_size=` query parameters.
///
/// Kept as strings so a malformed value is answered like an out-of-range
/// page instead of a query-string rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Resolve query parameters against the configured limits.
    ///
    /// A missing page means the first one; a page that is not a positive
    /// integer is not found. A missing or unusable page size falls back to
    /// the default and is capped at the maximum.
    pub fn resolve(params: &PageParams, settings: &PaginationSettings) -> Result<Self, AppError> {
        let page = match params.page.as_deref() {
            None => 1,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(page) if page >= 1 => page,
                _ => return Err(AppError::not_found("Invalid page.")),
            },
        };

        let max_page_size = settings.max_page_size.max(1);
        let page_size = params
            .page_size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|&size| size >= 1)
            .unwrap_or(settings.page_size)
            .clamp(1, max_page_size);

        Ok(Self { page, page_size })
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// Reject pages past the end of a collection of `count` items. The first
    /// page always exists, even when empty.
    pub fn check_bounds(&self, count: u64) -> Result<(), AppError> {
        if self.page > 1 && self.offset() >= count {
            return Err(AppError::not_found("Invalid page."));
        }
        Ok(())
    }
}

/// Paginated collection envelope.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap one page of `results`; `path` is the request path used to build
    /// the `next`/`previous` links.
    pub fn new(path: &str, request: PageRequest, count: u64, results: Vec<T>) -> Self {
        let link = |page: u64| format!("{}?page={}&page_size={}", path, page, request.page_size);

        let next = (request.offset() + request.page_size < count).then(|| link(request.page + 1));
        let previous = (request.page > 1).then(|| link(request.page - 1));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, page_size: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(str::to_string),
            page_size: page_size.map(str::to_string),
        }
    }

    fn settings() -> PaginationSettings {
        PaginationSettings {
            page_size: 20,
            max_page_size: 50,
        }
    }

    #[test]
    fn defaults_to_first_page() {
        let request = PageRequest::resolve(&params(None, None), &settings()).unwrap();
        assert_eq!(request, PageRequest { page: 1, page_size: 20 });
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn page_size_is_clamped_and_defaulted() {
        let big = PageRequest::resolve(&params(None, Some("500")), &settings()).unwrap();
        assert_eq!(big.page_size, 50);

        let junk = PageRequest::resolve(&params(None, Some("lots")), &settings()).unwrap();
        assert_eq!(junk.page_size, 20);

        let zero = PageRequest::resolve(&params(None, Some("0")), &settings()).unwrap();
        assert_eq!(zero.page_size, 20);
    }

    #[test]
    fn bad_page_numbers_are_not_found() {
        for raw in ["0", "-1", "two"] {
            let err = PageRequest::resolve(&params(Some(raw), None), &settings()).unwrap_err();
            assert!(matches!(err, AppError::NotFound { .. }), "page={raw}");
        }
    }

    #[test]
    fn bounds_allow_empty_first_page_only() {
        let first = PageRequest { page: 1, page_size: 10 };
        assert!(first.check_bounds(0).is_ok());

        let third = PageRequest { page: 3, page_size: 10 };
        assert!(third.check_bounds(21).is_ok());
        assert!(third.check_bounds(20).is_err());
    }

    #[test]
    fn links_point_at_neighbouring_pages() {
        let middle = Page::new("/api/rooms", PageRequest { page: 2, page_size: 2 }, 5, vec![3, 4]);
        assert_eq!(middle.next.as_deref(), Some("/api/rooms?page=3&page_size=2"));
        assert_eq!(middle.previous.as_deref(), Some("/api/rooms?page=1&page_size=2"));

        let last = Page::new("/api/rooms", PageRequest { page: 3, page_size: 2 }, 5, vec![5]);
        assert_eq!(last.next, None);

        let only = Page::new("/api/rooms", PageRequest { page: 1, page_size: 20 }, 1, vec![1]);
        assert_eq!(only.next, None);
        assert_eq!(only.previous, None);
    }
}
