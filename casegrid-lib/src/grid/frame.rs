//! Render snapshot of a grid.

use crate::error::MutationError;
use crate::query::Direction;
use crate::query::FilterValue;
use crate::query::Pagination;
use crate::response::CacheStatus;
use crate::selection::PageSelection;
use crate::window::Window;

/// Sort state of one header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortIndicator {
    pub direction: Direction,
    /// Zero for the most significant key.
    pub priority: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub id: String,
    pub label: String,
    pub width: u32,
    pub sortable: bool,
    pub filterable: bool,
    pub sort: Option<SortIndicator>,
    pub filter: Option<FilterValue>,
}

/// A materialized row inside the window.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRow<Id> {
    /// Index within the current page.
    pub index: usize,
    pub id: Id,
    /// Top edge in pixels from the start of the body.
    pub top: u64,
    pub height: u32,
    pub selected: bool,
    /// One entry per visible column.
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    /// Nothing to show yet.
    Loading,
    /// The query matched no rows.
    Empty,
    Ready,
    /// The last fetch failed. `retryable` is false for authorization
    /// failures, which the host handles.
    Error {
        message: String,
        status: Option<u16>,
        retryable: bool,
    },
}

/// Everything a view needs to draw the grid once.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<Id> {
    pub header: Vec<HeaderCell>,
    pub rows: Vec<VisibleRow<Id>>,
    pub window: Option<Window>,
    pub content_height: u64,
    pub scroll_offset: u64,
    pub pagination: Pagination,
    pub page_size_options: Vec<u32>,
    /// Search input as typed.
    pub search_input: String,
    pub selected_count: usize,
    /// Header checkbox state for the displayed page.
    pub page_selection: PageSelection,
    pub status: FrameStatus,
    /// A request for the displayed query is outstanding.
    pub fetching: bool,
    /// The rows belong to the previous query and are shown until the
    /// current one loads.
    pub placeholder: bool,
    /// Where the rows came from.
    pub cache: CacheStatus,
    /// The last bulk action failed. The selection it targeted is intact.
    pub bulk_error: Option<MutationError>,
}

impl<Id> Frame<Id> {
    /// Footer text, e.g. `41-57 of 57`.
    pub fn range_label(&self) -> String {
        self.pagination.range_label()
    }
}
