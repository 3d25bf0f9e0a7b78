//! Page math for paginated listings.
//!
//! Pages are 1-based. `start_index` and `end_index` are the 1-based inclusive
//! positions of the returned slice within the whole result set, both `0` when
//! the set is empty.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Page size used when the caller gives none.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound for any requested page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Defaults and bounds applied to a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Requested page. Either field may be omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    /// Resolve against `total` matching rows.
    ///
    /// Missing page means the first page, missing size means the default.
    /// Size is clamped to `1..=max_page_size`, and a page past the end lands
    /// on the last page.
    #[must_use]
    pub fn resolve(&self, limits: PageLimits, total: u64) -> PaginationInfo {
        let page_size = self
            .page_size
            .unwrap_or(limits.default_page_size)
            .clamp(1, limits.max_page_size.max(1));
        let size = u64::from(page_size);
        let num_pages = total.div_ceil(size);

        let requested = u64::from(self.page.unwrap_or(1).max(1));
        let page = requested.min(num_pages.max(1));

        let (start_index, end_index) = if total == 0 {
            (0, 0)
        } else {
            ((page - 1) * size + 1, (page * size).min(total))
        };

        PaginationInfo {
            page,
            page_size: size,
            num_pages,
            has_next: page < num_pages,
            has_prev: page > 1,
            start_index,
            end_index,
            total_results: total,
        }
    }
}

/// Position of a page within its result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page: u64,
    pub page_size: u64,
    pub num_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub start_index: u64,
    pub end_index: u64,
    pub total_results: u64,
}

impl PaginationInfo {
    /// Rows to skip before this page (SQL `OFFSET`).
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }
}

/// One page of entities plus its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub entities: Vec<T>,
    pub page_info: PaginationInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_of_two_pages() {
        let info = PageRequest::new(1, 2).resolve(PageLimits::default(), 3);
        assert_eq!(
            info,
            PaginationInfo {
                page: 1,
                page_size: 2,
                num_pages: 2,
                has_next: true,
                has_prev: false,
                start_index: 1,
                end_index: 2,
                total_results: 3,
            }
        );
        assert_eq!(info.offset(), 0);
    }

    #[test]
    fn last_page_is_partial() {
        let info = PageRequest::new(2, 2).resolve(PageLimits::default(), 3);
        assert_eq!(info.start_index, 3);
        assert_eq!(info.end_index, 3);
        assert!(!info.has_next);
        assert!(info.has_prev);
        assert_eq!(info.offset(), 2);
    }

    #[test]
    fn only_page_size_defaults_to_first_page() {
        let req = PageRequest {
            page: None,
            page_size: Some(2),
        };
        let info = req.resolve(PageLimits::default(), 3);
        assert_eq!(info.page, 1);
        assert_eq!(info.page_size, 2);
        assert_eq!(info.num_pages, 2);
    }

    #[test]
    fn only_page_uses_default_size() {
        let req = PageRequest {
            page: Some(1),
            page_size: None,
        };
        let info = req.resolve(PageLimits::default(), 3);
        assert_eq!(info.page_size, u64::from(DEFAULT_PAGE_SIZE));
        assert_eq!(info.num_pages, 1);
        assert_eq!(info.end_index, 3);
        assert!(!info.has_next);
    }

    #[test]
    fn page_past_end_lands_on_last_page() {
        let info = PageRequest::new(9, 2).resolve(PageLimits::default(), 5);
        assert_eq!(info.page, 3);
        assert_eq!(info.start_index, 5);
        assert_eq!(info.end_index, 5);
    }

    #[test]
    fn page_zero_is_first_page() {
        let info = PageRequest::new(0, 2).resolve(PageLimits::default(), 5);
        assert_eq!(info.page, 1);
        assert!(!info.has_prev);
    }

    #[test]
    fn page_size_is_clamped() {
        let limits = PageLimits {
            default_page_size: 10,
            max_page_size: 25,
        };
        assert_eq!(PageRequest::new(1, 500).resolve(limits, 100).page_size, 25);
        assert_eq!(PageRequest::new(1, 0).resolve(limits, 100).page_size, 1);
    }

    #[test]
    fn empty_result_set() {
        let info = PageRequest::default().resolve(PageLimits::default(), 0);
        assert_eq!(info.page, 1);
        assert_eq!(info.num_pages, 0);
        assert_eq!(info.start_index, 0);
        assert_eq!(info.end_index, 0);
        assert!(!info.has_next);
        assert!(!info.has_prev);
        assert_eq!(info.offset(), 0);
    }

    #[test]
    fn page_info_uses_camel_case_keys() {
        let info = PageRequest::new(1, 2).resolve(PageLimits::default(), 3);
        let json = serde_json::to_value(info).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 8);
        for key in [
            "page",
            "pageSize",
            "numPages",
            "hasNext",
            "hasPrev",
            "startIndex",
            "endIndex",
            "totalResults",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
    }
}
