//! Page requests and page metadata.
//!
//! The arithmetic here is pure: given a normalised page, a normalised limit
//! and the total number of matching records it produces the metadata block
//! returned with every list response.

use serde::{Deserialize, Serialize};

use crate::filter::RecordFilter;

/// Page size used when the caller supplies `limit <= 0`.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// A caller's list query, exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Collection being listed.
    pub model: String,
    /// 1-based page number; values `<= 0` mean page 1.
    pub page: i64,
    /// Page size; values `<= 0` mean [`DEFAULT_PAGE_LIMIT`].
    pub limit: i64,
    #[serde(default)]
    pub filter: RecordFilter,
}

impl PageRequest {
    pub fn new(model: impl Into<String>, page: i64, limit: i64) -> Self {
        Self {
            model: model.into(),
            page,
            limit,
            filter: RecordFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Normalised `(page, limit)` pair.
    pub fn normalized(&self) -> (i64, i64) {
        normalize(self.page, self.limit)
    }

    /// Number of matching records to skip before this page starts.
    pub fn offset(&self) -> i64 {
        let (page, limit) = self.normalized();
        (page - 1).saturating_mul(limit)
    }
}

/// Apply the page/limit defaults.
pub fn normalize(page: i64, limit: i64) -> (i64, i64) {
    let page = if page <= 0 { 1 } else { page };
    let limit = if limit <= 0 { DEFAULT_PAGE_LIMIT } else { limit };
    (page, limit)
}

/// Summary of where a page sits within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Records in the current page.
    pub record: i64,
    pub page: i64,
    /// Prior page number, 0 if none.
    pub previous: i64,
    /// Following page number, 0 if none.
    pub next: i64,
    pub limit: i64,
    /// Matching records across all pages.
    pub total: i64,
}

impl PageMetadata {
    /// Compute metadata for a raw (not yet normalised) page/limit.
    pub fn compute(page: i64, limit: i64, total: i64) -> Self {
        let (page, limit) = normalize(page, limit);
        let total = total.max(0);

        let offset = (page - 1).saturating_mul(limit);
        let record = total.saturating_sub(offset).clamp(0, limit);

        let last_page = total / limit + i64::from(total % limit != 0);
        let previous = if page > 1 { (page - 1).min(last_page) } else { 0 };
        let next = if page.saturating_mul(limit) < total {
            page + 1
        } else {
            0
        };

        Self {
            record,
            page,
            previous,
            next,
            limit,
            total,
        }
    }

    /// Last page that holds at least one record, 0 for an empty set.
    pub fn last_page(&self) -> i64 {
        self.total / self.limit + i64::from(self.total % self.limit != 0)
    }
}

/// One page of records plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub metadata: PageMetadata,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            records: self.records.into_iter().map(f).collect(),
            metadata: self.metadata,
        }
    }
}
