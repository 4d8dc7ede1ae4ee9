//! # Pagination Block
//!
//! Shared query-side paging contract: page numbers start at 1, page
//! size is bounded 1–100. `total`/`totalPages` are producer-supplied on
//! responses, never computed here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::normalize::Normalize;
use crate::validate::{field_path, Validate, Violations};

/// Lowest valid page number.
pub const MIN_PAGE: u32 = 1;
/// Lowest valid page size.
pub const MIN_LIMIT: u32 = 1;
/// Highest valid page size.
pub const MAX_LIMIT: u32 = 100;
/// Default page number.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size for entity listings.
pub const DEFAULT_LIMIT: u32 = 10;
/// Default page size for administrative and audit review listings.
pub const DEFAULT_REVIEW_LIMIT: u32 = 50;

/// Serde default for `page`.
pub fn default_page() -> u32 {
    DEFAULT_PAGE
}

/// Serde default for `limit`.
pub fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Serde default for review-surface `limit`.
pub fn default_review_limit() -> u32 {
    DEFAULT_REVIEW_LIMIT
}

/// Check page/limit bounds, recording violations under `prefix`.
pub fn check_bounds(out: &mut Violations, prefix: &str, page: u32, limit: u32) {
    if page < MIN_PAGE {
        out.push(
            field_path(prefix, "page"),
            format!("must be at least {MIN_PAGE}"),
        );
    }
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        out.push(
            field_path(prefix, "limit"),
            format!("must be between {MIN_LIMIT} and {MAX_LIMIT}"),
        );
    }
}

/// The pagination block itself, exposed as a standalone primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size, bounded 1–100.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Total matching records, producer-supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Total pages, producer-supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            total: None,
            total_pages: None,
        }
    }
}

impl Normalize for Pagination {
    fn normalize(&mut self) {}
}

impl Validate for Pagination {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_bounds(out, path, self.page, self.limit);
    }
}

/// Sort direction for review listings. Newest-first is the default on
/// the surfaces that use it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortOrder {
    /// All orders.
    pub const ALL: [SortOrder; 2] = [SortOrder::Asc, SortOrder::Desc];

    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_empty_object() {
        let p: Pagination = serde_json::from_value(json!({})).unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 10);
        assert!(p.total.is_none());
        assert_eq!(p, Pagination::default());
    }

    #[test]
    fn test_bounds_violations() {
        let p: Pagination = serde_json::from_value(json!({ "page": 0, "limit": 101 })).unwrap();
        let violations = p.validate().unwrap_err();
        assert!(violations.contains_path("page"));
        assert!(violations.contains_path("limit"));
    }

    #[test]
    fn test_limit_bounds_are_inclusive() {
        for limit in [1, 100] {
            let p: Pagination = serde_json::from_value(json!({ "limit": limit })).unwrap();
            assert!(p.validate().is_ok(), "limit {limit} should be valid");
        }
    }

    #[test]
    fn test_sort_order_wire_spellings() {
        for order in SortOrder::ALL {
            let json = serde_json::to_string(&order).unwrap();
            assert_eq!(json, format!("\"{}\"", order.as_str()));
            let back: SortOrder = serde_json::from_str(&json).unwrap();
            assert_eq!(back, order);
            assert_eq!(order.as_str().parse::<SortOrder>().unwrap(), order);
        }
        assert!("descending".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_order_default_is_desc() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }

    proptest! {
        #[test]
        fn prop_bounds_match_constants(page in 0u32..10_000, limit in 0u32..10_000) {
            let p = Pagination { page, limit, total: None, total_pages: None };
            let ok = p.validate().is_ok();
            prop_assert_eq!(ok, page >= MIN_PAGE && (MIN_LIMIT..=MAX_LIMIT).contains(&limit));
        }
    }
}
