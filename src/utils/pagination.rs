//! Pagination math shared by the trending and storage-listing endpoints
//!
//! Pages are 1-based. Ordering is imposed by the caller (listings are sorted
//! by name before slicing); this module only computes the slice bounds and
//! page metadata.

/// A resolved page window over a collection of `total` items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    /// Start index into the sorted collection (inclusive)
    pub start: usize,
    /// End index (exclusive), clamped to `total`
    pub end: usize,
    pub total: usize,
    pub total_pages: u32,
    pub has_next_page: bool,
}

impl PageSlice {
    /// True when the requested page lies past the available pages
    pub fn out_of_range(&self) -> bool {
        self.total > 0 && self.start >= self.total
    }
}

/// Compute the window for `page` (1-based) with `limit` items per page.
pub fn paginate(total: usize, page: u32, limit: u32) -> PageSlice {
    let page = page.max(1) as usize;
    let limit = limit.max(1) as usize;
    let total_pages = total.div_ceil(limit) as u32;
    let start = (page - 1) * limit;
    let end = (start + limit).min(total);
    PageSlice {
        start,
        end: end.max(start.min(total)),
        total,
        total_pages,
        has_next_page: (page as u32) < total_pages,
    }
}
