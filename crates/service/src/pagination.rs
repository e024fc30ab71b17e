//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and the `Page` envelope returned by
//! paginated listings.

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub limit: u32,
}

impl Pagination {
    pub const MAX_LIMIT: u32 = 100;

    /// Clamp to sane bounds; returns `(page, limit)` with page >= 1.
    pub fn normalize(self) -> (u32, u32) {
        let page = if self.page == 0 { 1 } else { self.page };
        let limit = self.limit.clamp(1, Self::MAX_LIMIT);
        (page, limit)
    }

    /// Slice one page out of an ordered collection.
    pub fn apply<T>(self, records: Vec<T>) -> Page<T> {
        let (page, limit) = self.normalize();
        let total = records.len();
        let total_pages = total.div_ceil(limit as usize);
        let skip = (page as usize - 1).saturating_mul(limit as usize);
        let data = records.into_iter().skip(skip).take(limit as usize).collect();
        Page {
            data,
            pagination: PageInfo { total, page, limit, total_pages },
        }
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, limit: 20 } }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub total_pages: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}
