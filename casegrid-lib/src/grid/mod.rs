//! Grid composition.
//!
//! [`Grid`] binds the query controller, fetch coordinator, selection,
//! bulk coordinator and window calculator together. It is driven from a
//! single task: synchronous methods handle user input, and completed
//! fetches and debounce timers arrive as messages that the host drains with
//! [`Grid::next_message`], [`Grid::settle`] or [`Grid::poll_messages`].
//! Every read goes through [`Grid::frame`].
//!
//! A grid must be built and driven inside a Tokio runtime; fetches and
//! timers are spawned onto it.

mod column;
mod config;
mod event;
mod frame;

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use log::debug;
use log::trace;
use log::warn;
use tokio::sync::mpsc;

pub use column::*;
pub use config::*;
pub use event::*;
pub use frame::*;

use crate::api::DataSource;
use crate::bulk::BulkAction;
use crate::bulk::BulkCoordinator;
use crate::bulk::BulkOutcome;
use crate::cache::FetchCoordinator;
use crate::cache::Lookup;
use crate::error::ConfigurationError;
use crate::error::FetchError;
use crate::error::MutationError;
use crate::model::Row;
use crate::query::CacheKey;
use crate::query::Direction;
use crate::query::Effect;
use crate::query::FilterValue;
use crate::query::PageResult;
use crate::query::QueryAction;
use crate::query::QuerySpec;
use crate::query::QueryState;
use crate::query::Scope;
use crate::response::CacheStatus;
use crate::response::Response;
use crate::selection::PageSelection;
use crate::selection::SelectionSet;
use crate::window::FixedHeight;
use crate::window::OffsetCache;
use crate::window::RowGeometry;
use crate::window::ScrollRequest;
use crate::window::ScrollState;
use crate::window::WindowCalculator;

enum Message<T> {
    Fetched {
        query: QuerySpec,
        seq: u64,
        /// Revalidation of data already on screen; failures keep the data.
        background: bool,
        result: Result<Response<Arc<PageResult<T>>>, FetchError>,
    },
    DebounceElapsed {
        ticket: u64,
    },
}

/// A virtualized, server-driven data grid over rows of type `T`.
pub struct Grid<T: Row> {
    scope: Scope,
    columns: Vec<Column<T>>,
    config: GridConfig,
    state: QueryState,
    fetcher: FetchCoordinator<T>,
    bulk: BulkCoordinator<T>,
    selection: SelectionSet<T::Id>,
    /// The page on screen. May answer an older query while the committed
    /// one loads.
    page: Option<Arc<PageResult<T>>>,
    /// Where the page on screen came from.
    cache: CacheStatus,
    /// The last bulk action failure, until the next bulk action.
    bulk_error: Option<MutationError>,
    geometry: Box<dyn RowGeometry>,
    offsets: OffsetCache,
    scroll: ScrollState,
    calculator: WindowCalculator,
    listeners: Vec<Listener<T::Id>>,
    tx: mpsc::UnboundedSender<Message<T>>,
    rx: mpsc::UnboundedReceiver<Message<T>>,
    /// Spawned fetches and timers whose message has not been handled.
    outstanding: usize,
    /// Spawned fetches per query whose result has not been handled.
    fetching: HashMap<QuerySpec, usize>,
    issued_seq: u64,
    applied_seq: u64,
}

impl<T: Row> Grid<T> {
    /// Creates a new builder for a grid over `scope`.
    pub fn builder(scope: impl Into<Scope>) -> GridBuilder<T> {
        GridBuilder::new(scope.into())
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The committed query.
    pub fn query(&self) -> &QuerySpec {
        self.state.query()
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn selection(&self) -> &SelectionSet<T::Id> {
        &self.selection
    }

    /// The page on screen, if any.
    pub fn page(&self) -> Option<&PageResult<T>> {
        self.page.as_deref()
    }

    pub fn fetcher(&self) -> &FetchCoordinator<T> {
        &self.fetcher
    }

    /// Whether the page on screen answers an older query.
    pub fn is_placeholder(&self) -> bool {
        self.page
            .as_ref()
            .is_some_and(|page| page.query() != self.state.query())
    }

    // =========================================================================
    // Query actions
    // =========================================================================

    /// Cycles the sort of `column`: none, ascending, descending, none.
    pub fn header_clicked(&mut self, column: &str) {
        let current = self
            .state
            .query()
            .sort()
            .iter()
            .find(|key| key.column == column)
            .map(|key| key.direction);
        match current {
            None => self.set_sort(column, Direction::Asc),
            Some(Direction::Asc) => self.set_sort(column, Direction::Desc),
            Some(Direction::Desc) => self.clear_sort(column),
        }
    }

    pub fn set_sort(&mut self, column: &str, direction: Direction) {
        if !self.is_sortable(column) {
            warn!("ignoring sort on column '{}'", column);
            return;
        }
        self.dispatch_sort(QueryAction::SetSort {
            column: column.to_string(),
            direction,
        });
    }

    pub fn clear_sort(&mut self, column: &str) {
        self.dispatch_sort(QueryAction::ClearSort {
            column: column.to_string(),
        });
    }

    /// Sets or removes (`None` or empty) the filter on `column`.
    ///
    /// Always clears the selection.
    pub fn set_filter(&mut self, column: &str, value: Option<FilterValue>) {
        let filterable = self
            .column(column)
            .is_some_and(|c| c.is_filterable());
        if !filterable {
            warn!("ignoring filter on column '{}'", column);
            return;
        }
        let before = self.state.query().filter(column).cloned();
        self.dispatch(QueryAction::SetFilter {
            column: column.to_string(),
            value,
        });
        let after = self.state.query().filter(column).cloned();
        if before != after {
            self.emit(GridEvent::FilterChanged {
                column: column.to_string(),
                value: after,
            });
        }
    }

    /// Search input as typed; committed after the debounce period.
    pub fn search_input(&mut self, term: impl Into<String>) {
        self.dispatch(QueryAction::SetFreeText(term.into()));
    }

    pub fn set_page(&mut self, page: u32) {
        self.dispatch(QueryAction::SetPage(page));
    }

    pub fn next_page(&mut self) {
        if self.state.pagination().has_next() {
            self.set_page(self.state.query().page() + 1);
        }
    }

    pub fn prev_page(&mut self) {
        if self.state.query().page() > 1 {
            self.set_page(self.state.query().page() - 1);
        }
    }

    /// Changes the page size. Always clears the selection.
    pub fn set_page_size(&mut self, size: u32) {
        self.dispatch(QueryAction::SetPageSize(size));
    }

    /// Re-issues the committed query after a failure.
    pub fn retry(&mut self) {
        self.dispatch(QueryAction::Retry);
    }

    /// Re-issues the committed query.
    pub fn refresh(&mut self) {
        self.dispatch(QueryAction::Refresh);
    }

    // =========================================================================
    // Selection and bulk actions
    // =========================================================================

    pub fn toggle_row(&mut self, id: T::Id) {
        self.selection.toggle(id);
        self.emit_selection();
    }

    /// Adds every row of the displayed page.
    pub fn select_page(&mut self) {
        if let Some(page) = self.page.clone() {
            self.selection.select_page(&*page);
            self.emit_selection();
        }
    }

    /// Header checkbox: deselects the page when fully selected, selects it
    /// otherwise.
    pub fn toggle_page(&mut self) {
        let Some(page) = self.page.clone() else {
            return;
        };
        let ids: Vec<_> = page.ids().collect();
        if self.selection.page_state(&ids) == PageSelection::All {
            self.selection.deselect_page(&*page);
        } else {
            self.selection.select_page(&*page);
        }
        self.emit_selection();
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.emit_selection();
        }
    }

    /// Applies `action` to the selection with one batched request.
    ///
    /// On success the scope's cache is invalidated, the selection cleared
    /// and the committed query refreshed. On failure the selection is kept
    /// and the error stays in the frame until the next bulk action.
    pub async fn apply_bulk(&mut self, action: impl Into<BulkAction>) -> Result<BulkOutcome, MutationError> {
        let result = self.bulk.apply(&self.scope, action, &mut self.selection).await;
        self.bulk_error = result.as_ref().err().cloned();
        let outcome = result?;
        if let BulkOutcome::Applied { .. } = outcome {
            self.emit_selection();
            self.refresh();
        }
        Ok(outcome)
    }

    // =========================================================================
    // View input
    // =========================================================================

    /// Emits [`GridEvent::RowClicked`] for the row at `index` on the page.
    pub fn row_clicked(&mut self, index: usize) {
        let id = self.page.as_ref().and_then(|page| page.row(index)).map(Row::id);
        if let Some(id) = id {
            self.emit(GridEvent::RowClicked { id });
        }
    }

    pub fn scroll(&mut self, request: ScrollRequest) {
        self.scroll.apply(request, &self.offsets);
    }

    pub fn resize_viewport(&mut self, height: u64) {
        self.scroll.set_viewport(height);
    }

    /// Records the rendered height of a row.
    pub fn measure_row(&mut self, index: usize, height: u32) {
        self.offsets.measure(index, height);
        self.scroll.set_content_height(self.offsets.total_height());
    }

    /// Shows or hides a column. Returns the new visibility, or `None` for an
    /// unknown column.
    pub fn toggle_column_visibility(&mut self, id: &str) -> Option<bool> {
        let column = self.columns.iter_mut().find(|c| c.id() == id)?;
        let visible = !column.is_visible();
        column.set_visible(visible);
        Some(visible)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Waits for the next fetch result or timer and applies it.
    ///
    /// Returns `false` without waiting when nothing is outstanding.
    pub async fn next_message(&mut self) -> bool {
        if self.outstanding == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(message) => {
                self.handle(message);
                true
            }
            None => false,
        }
    }

    /// Applies messages until no fetch or timer is outstanding.
    pub async fn settle(&mut self) {
        while self.next_message().await {}
    }

    /// Applies every message that has already arrived, without waiting.
    pub fn poll_messages(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle(message);
            handled += 1;
        }
        handled
    }

    fn handle(&mut self, message: Message<T>) {
        self.outstanding = self.outstanding.saturating_sub(1);
        match message {
            Message::Fetched {
                query,
                seq,
                background,
                result,
            } => {
                if let Some(count) = self.fetching.get_mut(&query) {
                    *count -= 1;
                    if *count == 0 {
                        self.fetching.remove(&query);
                    }
                }
                if &query != self.state.query() {
                    trace!("dropping response for superseded query {}", query);
                    return;
                }
                match result {
                    Ok(response) => {
                        let total_count = response.data().total_count();
                        if self.show(seq, response) {
                            self.dispatch(QueryAction::FetchSucceeded { query, total_count });
                        }
                    }
                    Err(error) => {
                        if background {
                            warn!("revalidation of {} failed, keeping cached rows: {}", query, error);
                        } else {
                            warn!("fetch of {} failed: {}", query, error);
                        }
                        self.dispatch(QueryAction::FetchFailed { query, error });
                    }
                }
            }
            Message::DebounceElapsed { ticket } => {
                self.dispatch(QueryAction::DebounceElapsed { ticket });
            }
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Snapshot of everything the view draws.
    pub fn frame(&self) -> Frame<T::Id> {
        let query = self.state.query();
        let header = self
            .columns
            .iter()
            .filter(|c| c.is_visible())
            .map(|c| HeaderCell {
                id: c.id().to_string(),
                label: c.header().to_string(),
                width: c.width(),
                sortable: c.is_sortable(),
                filterable: c.is_filterable(),
                sort: query
                    .sort()
                    .iter()
                    .position(|key| key.column == c.id())
                    .map(|priority| SortIndicator {
                        direction: query.sort()[priority].direction,
                        priority,
                    }),
                filter: query.filter(c.id()).cloned(),
            })
            .collect();

        let window = self
            .calculator
            .compute(&self.offsets, self.scroll.offset(), self.scroll.viewport());

        let mut rows = Vec::new();
        let mut page_selection = PageSelection::None;
        if let Some(page) = &self.page {
            if let Some(window) = window {
                for index in window.indices() {
                    let Some(row) = page.row(index) else {
                        break;
                    };
                    let id = row.id();
                    rows.push(VisibleRow {
                        index,
                        selected: self.selection.contains(&id),
                        id,
                        top: self.offsets.row_top(index),
                        height: self.offsets.row_height(index),
                        cells: self
                            .columns
                            .iter()
                            .filter(|c| c.is_visible())
                            .map(|c| c.cell(row))
                            .collect(),
                    });
                }
            }
            let ids: Vec<_> = page.ids().collect();
            page_selection = self.selection.page_state(&ids);
        }

        let status = match (self.state.error(), &self.page) {
            (Some(error), _) => FrameStatus::Error {
                message: error.message.clone(),
                status: error.status,
                retryable: !error.is_unauthorized(),
            },
            (None, None) => FrameStatus::Loading,
            (None, Some(page)) if page.is_empty() && !self.is_placeholder() => FrameStatus::Empty,
            (None, Some(_)) => FrameStatus::Ready,
        };

        Frame {
            header,
            rows,
            window,
            content_height: self.offsets.total_height(),
            scroll_offset: self.scroll.offset(),
            pagination: self.state.pagination(),
            page_size_options: self.config.page_size_options.clone(),
            search_input: self.state.raw_term().to_string(),
            selected_count: self.selection.len(),
            page_selection,
            status,
            fetching: self.state.is_fetching() || self.fetching.contains_key(query),
            placeholder: self.is_placeholder(),
            cache: self.cache,
            bulk_error: self.bulk_error.clone(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn column(&self, id: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|c| c.id() == id)
    }

    fn is_sortable(&self, id: &str) -> bool {
        self.column(id).is_some_and(|c| c.is_sortable())
    }

    fn dispatch_sort(&mut self, action: QueryAction) {
        let before = self.state.query().sort().to_vec();
        self.dispatch(action);
        let after = self.state.query().sort();
        if before != after {
            self.emit(GridEvent::SortChanged(after.to_vec()));
        }
    }

    /// Runs `action` through the controller and executes the resulting
    /// effects. Cache hits feed back into the controller in the same call.
    fn dispatch(&mut self, action: QueryAction) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let (next, effects) = self.state.reduce(action);
            self.state = next;
            for effect in effects {
                match effect {
                    Effect::Fetch(query) => self.start_fetch(query, &mut queue),
                    Effect::ScheduleDebounce { ticket, delay } => {
                        let tx = self.tx.clone();
                        self.outstanding += 1;
                        tokio::spawn(async move {
                            tokio::time::sleep(delay).await;
                            let _ = tx.send(Message::DebounceElapsed { ticket });
                        });
                    }
                    Effect::ClearSelection => self.clear_selection(),
                }
            }
        }
    }

    fn start_fetch(&mut self, query: QuerySpec, queue: &mut VecDeque<QueryAction>) {
        let key = CacheKey::new(self.scope.clone(), query.clone());
        match self.fetcher.lookup(&key) {
            Lookup::Fresh(response) => {
                trace!("serving {} from cache", key);
                let seq = self.next_seq();
                let total_count = response.data().total_count();
                if self.show(seq, response) {
                    queue.push_back(QueryAction::FetchSucceeded { query, total_count });
                }
            }
            Lookup::Stale(response) => {
                debug!("serving stale {} while revalidating", key);
                let seq = self.next_seq();
                let total_count = response.data().total_count();
                if self.show(seq, response) {
                    queue.push_back(QueryAction::FetchSucceeded { query, total_count });
                }
                self.spawn_fetch(key, true);
            }
            Lookup::Miss => self.spawn_fetch(key, false),
        }
    }

    fn spawn_fetch(&mut self, key: CacheKey, background: bool) {
        let seq = self.next_seq();
        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();
        self.outstanding += 1;
        *self.fetching.entry(key.query.clone()).or_default() += 1;
        tokio::spawn(async move {
            let query = key.query.clone();
            let result = fetcher.fetch(key).await;
            let _ = tx.send(Message::Fetched {
                query,
                seq,
                background,
                result,
            });
        });
    }

    fn next_seq(&mut self) -> u64 {
        self.issued_seq += 1;
        self.issued_seq
    }

    /// Puts the page on screen unless a newer result is already there.
    /// Returns whether it did.
    fn show(&mut self, seq: u64, response: Response<Arc<PageResult<T>>>) -> bool {
        if seq < self.applied_seq {
            trace!("dropping result #{} older than #{}", seq, self.applied_seq);
            return false;
        }
        self.applied_seq = seq;
        let (page, cache) = response.into_parts();
        self.cache = cache;

        let same_query = self
            .page
            .as_ref()
            .is_some_and(|current| current.query() == page.query());
        self.offsets.reset(page.len(), self.geometry.as_ref());
        self.scroll.set_content_height(self.offsets.total_height());
        if !same_query {
            self.scroll.reset();
        }
        self.page = Some(page);
        true
    }

    fn emit_selection(&self) {
        self.emit(GridEvent::SelectionChanged {
            count: self.selection.len(),
        });
    }

    fn emit(&self, event: GridEvent<T::Id>) {
        for listener in &self.listeners {
            listener(&event);
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for constructing a [`Grid`].
///
/// # Example
///
/// ```ignore
/// let mut grid = Grid::builder("projects/7")
///     .source(Arc::new(client.resource::<TestCase>("testcases")))
///     .columns(TestCase::default_columns())
///     .sort("created_at", Direction::Desc)
///     .build()?;
///
/// grid.settle().await;
/// let frame = grid.frame();
/// ```
pub struct GridBuilder<T: Row> {
    scope: Scope,
    source: Option<Arc<dyn DataSource<T>>>,
    columns: Vec<Column<T>>,
    config: GridConfig,
    geometry: Option<Box<dyn RowGeometry>>,
    initial: Vec<(String, Direction)>,
    filters: Vec<(String, FilterValue)>,
    term: String,
    page: u32,
    listeners: Vec<Listener<T::Id>>,
}

impl<T: Row> GridBuilder<T> {
    fn new(scope: Scope) -> Self {
        Self {
            scope,
            source: None,
            columns: Vec::new(),
            config: GridConfig::default(),
            geometry: None,
            initial: Vec::new(),
            filters: Vec::new(),
            term: String::new(),
            page: 1,
            listeners: Vec::new(),
        }
    }

    pub fn source(mut self, source: Arc<dyn DataSource<T>>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn columns(mut self, columns: Vec<Column<T>>) -> Self {
        self.columns = columns;
        self
    }

    pub fn config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the fixed row height from the config.
    pub fn geometry(mut self, geometry: impl RowGeometry + 'static) -> Self {
        self.geometry = Some(Box::new(geometry));
        self
    }

    /// Adds an initial sort key. The first key added is the most
    /// significant.
    pub fn sort(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.initial.push((column.into(), direction));
        self
    }

    pub fn filter(mut self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn on_event(mut self, listener: impl Fn(&GridEvent<T::Id>) + Send + Sync + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Validates the setup and issues the initial load.
    pub fn build(self) -> Result<Grid<T>, ConfigurationError> {
        let source = self.source.ok_or(ConfigurationError::MissingSource)?;
        validate_columns(&self.columns)?;
        self.config.validate()?;

        let find = |id: &str| self.columns.iter().find(|c| c.id() == id);
        let mut spec = QuerySpec::new(self.config.page_size)
            .with_page(self.page)
            .with_term(self.term);
        for (column, direction) in self.initial {
            match find(&column) {
                None => return Err(ConfigurationError::UnknownSortColumn(column)),
                Some(c) if !c.is_sortable() => return Err(ConfigurationError::UnsortableColumn(column)),
                Some(_) => spec = spec.with_sort(column, direction),
            }
        }
        for (column, value) in self.filters {
            if !find(&column).is_some_and(|c| c.is_filterable()) {
                return Err(ConfigurationError::UnfilterableColumn(column));
            }
            spec = spec.with_filter(column, value);
        }

        let fetcher = FetchCoordinator::new(Arc::clone(&source), self.config.cache.clone());
        let bulk = BulkCoordinator::new(source, fetcher.clone());
        let geometry = self
            .geometry
            .unwrap_or_else(|| Box::new(FixedHeight::new(self.config.row_height)));
        let (tx, rx) = mpsc::unbounded_channel();

        debug!("building grid for {} with {} columns", self.scope, self.columns.len());
        let mut grid = Grid {
            scope: self.scope,
            columns: self.columns,
            state: QueryState::new(spec, self.config.controller_options()),
            fetcher,
            bulk,
            selection: SelectionSet::new(),
            page: None,
            cache: CacheStatus::None,
            bulk_error: None,
            offsets: OffsetCache::new(0, geometry.as_ref()),
            geometry,
            scroll: ScrollState::new(self.config.viewport_height),
            calculator: WindowCalculator::new(self.config.overscan),
            config: self.config,
            listeners: self.listeners,
            tx,
            rx,
            outstanding: 0,
            fetching: HashMap::new(),
            issued_seq: 0,
            applied_seq: 0,
        };
        grid.dispatch(QueryAction::Load);
        Ok(grid)
    }
}
