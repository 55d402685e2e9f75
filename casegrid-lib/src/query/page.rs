//! Page results and pagination math.

use crate::model::Row;

use super::QuerySpec;

/// Number of pages needed for `total` rows at `size` rows per page.
///
/// Zero rows means zero pages.
pub fn page_count(total: u64, size: u32) -> u32 {
    let size = u64::from(size.max(1));
    u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX)
}

/// One page of rows returned for a query.
///
/// `total_count` is authoritative for pagination math. `rows.len()` may be
/// shorter than the requested size only on the last page. Results are never
/// mutated; a newer fetch supersedes them.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    rows: Vec<T>,
    total_count: u64,
    query: QuerySpec,
}

impl<T> PageResult<T> {
    pub fn new(rows: Vec<T>, total_count: u64, query: QuerySpec) -> Self {
        Self {
            rows,
            total_count,
            query,
        }
    }

    /// The rows on this page, in server order.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&T> {
        self.rows.get(index)
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// The query this page answers.
    pub fn query(&self) -> &QuerySpec {
        &self.query
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.query.page, self.query.size, self.total_count)
    }
}

impl<T: Row> PageResult<T> {
    /// Identifiers of the rows on this page.
    pub fn ids(&self) -> impl Iterator<Item = T::Id> + '_ {
        self.rows.iter().map(Row::id)
    }
}

/// Pagination summary for the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl Pagination {
    pub fn new(page: u32, size: u32, total: u64) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
            total,
        }
    }

    pub fn page_count(&self) -> u32 {
        page_count(self.total, self.size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// One-based index of the first row shown, 0 when nothing is shown.
    pub fn first_item(&self) -> u64 {
        let first = u64::from(self.page - 1) * u64::from(self.size) + 1;
        if first > self.total { 0 } else { first }
    }

    /// One-based index of the last row shown, 0 when nothing is shown.
    pub fn last_item(&self) -> u64 {
        if self.first_item() == 0 {
            return 0;
        }
        (u64::from(self.page) * u64::from(self.size)).min(self.total)
    }

    /// `"41-57 of 57"`, or `"0 of 0"` when empty.
    pub fn range_label(&self) -> String {
        match self.first_item() {
            0 => format!("0 of {}", self.total),
            first => format!("{}-{} of {}", first, self.last_item(), self.total),
        }
    }
}
