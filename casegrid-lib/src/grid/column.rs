//! Column descriptors.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigurationError;
use crate::query::RESERVED_PARAMS;

/// Produces the display text of one cell.
pub type Accessor<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// A grid column definition.
///
/// The column id doubles as the sort key and filter parameter sent to the
/// data source.
pub struct Column<T> {
    id: String,
    header: String,
    width: u32,
    sortable: bool,
    filterable: bool,
    visible: bool,
    accessor: Accessor<T>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            width: self.width,
            sortable: self.sortable,
            filterable: self.filterable,
            visible: self.visible,
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

impl<T> Column<T> {
    /// Create a visible column that is neither sortable nor filterable.
    pub fn new(
        id: impl Into<String>,
        header: impl Into<String>,
        width: u32,
        accessor: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            width,
            sortable: false,
            filterable: false,
            visible: true,
            accessor: Arc::new(accessor),
        }
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Start hidden; the user can show it later.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Render the cell text for `row`.
    pub fn cell(&self, row: &T) -> String {
        (self.accessor)(row)
    }
}

/// Checks a column set: non-empty, unique ids, non-zero widths, and no id
/// that collides with a reserved request parameter.
pub(crate) fn validate_columns<T>(columns: &[Column<T>]) -> Result<(), ConfigurationError> {
    if columns.is_empty() {
        return Err(ConfigurationError::NoColumns);
    }

    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.id.as_str()) {
            return Err(ConfigurationError::DuplicateColumn(column.id.clone()));
        }
        if column.width == 0 {
            return Err(ConfigurationError::ZeroWidthColumn(column.id.clone()));
        }
        if RESERVED_PARAMS.contains(&column.id.as_str()) {
            return Err(ConfigurationError::ReservedColumnId(column.id.clone()));
        }
    }
    Ok(())
}
