//! Grid events delivered to host listeners.

use crate::query::FilterValue;
use crate::query::SortKey;

/// Something the user did that the host may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent<Id> {
    /// A row body was clicked (typically opens a detail view).
    RowClicked { id: Id },
    SelectionChanged { count: usize },
    /// The committed sort, most significant key first.
    SortChanged(Vec<SortKey>),
    FilterChanged {
        column: String,
        value: Option<FilterValue>,
    },
}

/// Callback registered on a grid.
pub type Listener<Id> = Box<dyn Fn(&GridEvent<Id>) + Send + Sync>;
