//! Query state controller.
//!
//! The controller is a pure reducer: [`QueryState::reduce`] takes the
//! current state and an action and returns the next state plus the side
//! effects the caller must run (fetches, debounce timers, selection
//! clearing). Nothing here performs I/O or reads the clock, so every
//! transition is testable without a runtime.
//!
//! ```text
//! Idle -> Debouncing -> Fetching -> Settled(Success | Error)
//!              ^                          |
//!              +---- any state change ----+
//! ```
//!
//! Free-text changes wait out a quiet period before they commit. All other
//! changes commit in the same update.

use std::time::Duration;

use log::debug;
use log::trace;

use crate::error::FetchError;

use super::Direction;
use super::FilterValue;
use super::Pagination;
use super::QuerySpec;
use super::SortKey;
use super::page_count;

/// How the last fetch for the committed query ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error(FetchError),
}

/// Controller phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet.
    Idle,
    /// A free-text change is waiting out its quiet period.
    Debouncing,
    /// A fetch for the committed query is outstanding.
    Fetching,
    /// The last fetch for the committed query finished.
    Settled(Outcome),
}

/// Inputs to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryAction {
    /// Initial load at mount.
    Load,
    /// Sort by `column`. Single-column mode replaces the sort; multi-column
    /// mode moves the column to the front (most recent wins ties).
    SetSort { column: String, direction: Direction },
    /// Remove `column` from the sort.
    ClearSort { column: String },
    /// Upsert a filter. `None` or an empty value removes it.
    SetFilter {
        column: String,
        value: Option<FilterValue>,
    },
    /// Raw search input. Committed after the quiet period.
    SetFreeText(String),
    /// A debounce timer fired.
    DebounceElapsed { ticket: u64 },
    /// Go to a page; out-of-range pages are clamped.
    SetPage(u32),
    /// Change the page size, keeping the first visible row in view.
    SetPageSize(u32),
    /// A fetch finished successfully.
    FetchSucceeded { query: QuerySpec, total_count: u64 },
    /// A fetch failed.
    FetchFailed { query: QuerySpec, error: FetchError },
    /// Re-issue the committed query after an error.
    Retry,
    /// Re-issue the committed query after its cache entry went stale.
    Refresh,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Load this query.
    Fetch(QuerySpec),
    /// Deliver `DebounceElapsed { ticket }` after `delay`.
    ScheduleDebounce { ticket: u64, delay: Duration },
    /// The addressable universe of rows changed; empty the selection.
    ClearSelection,
}

/// Controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Quiet period before a search term commits.
    pub debounce: Duration,
    /// Keep a multi-column sort instead of replacing it.
    pub multi_sort: bool,
    /// Upper bound applied to page size changes.
    pub max_page_size: u32,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            multi_sort: false,
            max_page_size: 100,
        }
    }
}

/// Immutable controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    committed: QuerySpec,
    raw_term: String,
    pending_ticket: Option<u64>,
    next_ticket: u64,
    fetching: bool,
    phase: Phase,
    last_outcome: Option<Outcome>,
    total_count: Option<u64>,
    options: ControllerOptions,
}

impl QueryState {
    /// Creates an idle controller around the initial spec.
    pub fn new(initial: QuerySpec, options: ControllerOptions) -> Self {
        let mut committed = initial;
        committed.size = committed.size.clamp(1, options.max_page_size.max(1));
        Self {
            raw_term: committed.term.clone(),
            committed,
            pending_ticket: None,
            next_ticket: 0,
            fetching: false,
            phase: Phase::Idle,
            last_outcome: None,
            total_count: None,
            options,
        }
    }

    /// The committed spec; this is what gets fetched.
    pub fn query(&self) -> &QuerySpec {
        &self.committed
    }

    /// The search input as typed, possibly not yet committed.
    pub fn raw_term(&self) -> &str {
        &self.raw_term
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Total row count reported by the last settled fetch.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn is_debouncing(&self) -> bool {
        self.pending_ticket.is_some()
    }

    /// The error from the last fetch of the committed query, if it failed.
    pub fn error(&self) -> Option<&FetchError> {
        match &self.last_outcome {
            Some(Outcome::Error(e)) => Some(e),
            _ => None,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(
            self.committed.page,
            self.committed.size,
            self.total_count.unwrap_or(0),
        )
    }

    /// Applies `action` and returns the next state with its effects.
    pub fn reduce(&self, action: QueryAction) -> (QueryState, Vec<Effect>) {
        let mut next = self.clone();
        let mut effects = Vec::new();
        next.apply(action, &mut effects);
        (next, effects)
    }

    fn apply(&mut self, action: QueryAction, effects: &mut Vec<Effect>) {
        trace!("query action: {:?}", action);
        match action {
            QueryAction::Load => self.commit(effects),

            QueryAction::SetSort { column, direction } => {
                let key = SortKey::new(column, direction);
                let mut sort = self.committed.sort.clone();
                if self.options.multi_sort {
                    sort.retain(|k| k.column != key.column);
                    sort.insert(0, key);
                } else {
                    sort = vec![key];
                }
                self.change(effects, |spec| {
                    spec.sort = sort;
                    spec.page = 1;
                });
            }

            QueryAction::ClearSort { column } => {
                self.change(effects, |spec| {
                    spec.sort.retain(|k| k.column != column);
                    spec.page = 1;
                });
            }

            QueryAction::SetFilter { column, value } => {
                effects.push(Effect::ClearSelection);
                self.change(effects, |spec| {
                    match value.filter(|v| !v.is_empty()) {
                        Some(value) => {
                            spec.filters.insert(column, value);
                        }
                        None => {
                            spec.filters.remove(&column);
                        }
                    }
                    spec.page = 1;
                });
            }

            QueryAction::SetFreeText(term) => {
                let ticket = self.next_ticket;
                self.next_ticket += 1;
                self.raw_term = term;
                self.pending_ticket = Some(ticket);
                self.phase = Phase::Debouncing;
                effects.push(Effect::ScheduleDebounce {
                    ticket,
                    delay: self.options.debounce,
                });
            }

            QueryAction::DebounceElapsed { ticket } => {
                if self.pending_ticket != Some(ticket) {
                    trace!("ignoring superseded debounce ticket {}", ticket);
                    return;
                }
                self.pending_ticket = None;
                effects.push(Effect::ClearSelection);
                let term = self.raw_term.trim().to_string();
                self.change(effects, |spec| {
                    if spec.term != term {
                        spec.term = term;
                        spec.page = 1;
                    }
                });
                self.phase = self.resting_phase();
            }

            QueryAction::SetPage(page) => {
                let last = self.last_page(self.committed.size);
                self.change(effects, |spec| {
                    spec.page = page.clamp(1, last);
                });
            }

            QueryAction::SetPageSize(size) => {
                let size = size.clamp(1, self.options.max_page_size.max(1));
                let first_row = self.committed.first_row_index();
                let last = self.last_page(size);
                let page = u32::try_from(first_row / u64::from(size) + 1).unwrap_or(u32::MAX);
                effects.push(Effect::ClearSelection);
                self.change(effects, |spec| {
                    spec.size = size;
                    spec.page = page.clamp(1, last);
                });
            }

            QueryAction::FetchSucceeded { query, total_count } => {
                if query != self.committed {
                    trace!("ignoring result for superseded query {}", query);
                    return;
                }
                self.fetching = false;
                self.total_count = Some(total_count);
                self.last_outcome = Some(Outcome::Success);
                self.phase = self.resting_phase();

                // Rows disappeared elsewhere and the page no longer exists.
                let last = page_count(total_count, self.committed.size).max(1);
                if self.committed.page > last {
                    debug!(
                        "page {} out of range for {} rows, moving to {}",
                        self.committed.page, total_count, last
                    );
                    self.committed.page = last;
                    self.commit(effects);
                }
            }

            QueryAction::FetchFailed { query, error } => {
                if query != self.committed {
                    trace!("ignoring failure for superseded query {}", query);
                    return;
                }
                self.fetching = false;
                self.last_outcome = Some(Outcome::Error(error));
                self.phase = self.resting_phase();
            }

            QueryAction::Retry => {
                if matches!(self.last_outcome, Some(Outcome::Error(_))) && !self.fetching {
                    self.commit(effects);
                }
            }

            QueryAction::Refresh => self.commit(effects),
        }
    }

    /// Applies `edit` to a copy of the committed spec and commits it if it
    /// differs.
    fn change(&mut self, effects: &mut Vec<Effect>, edit: impl FnOnce(&mut QuerySpec)) {
        let mut spec = self.committed.clone();
        edit(&mut spec);
        if spec != self.committed {
            self.committed = spec;
            self.commit(effects);
        }
    }

    fn commit(&mut self, effects: &mut Vec<Effect>) {
        debug!("committing query {}", self.committed);
        self.fetching = true;
        self.phase = self.resting_phase();
        effects.push(Effect::Fetch(self.committed.clone()));
    }

    fn resting_phase(&self) -> Phase {
        if self.pending_ticket.is_some() {
            Phase::Debouncing
        } else if self.fetching {
            Phase::Fetching
        } else {
            match &self.last_outcome {
                Some(outcome) => Phase::Settled(outcome.clone()),
                None => Phase::Idle,
            }
        }
    }

    /// Highest valid page for `size`, or unbounded when no total is known.
    fn last_page(&self, size: u32) -> u32 {
        match self.total_count {
            Some(total) => page_count(total, size).max(1),
            None => u32::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled(total: u64) -> QueryState {
        let state = QueryState::new(QuerySpec::new(20), ControllerOptions::default());
        let (state, _) = state.reduce(QueryAction::Load);
        let query = state.query().clone();
        let (state, _) = state.reduce(QueryAction::FetchSucceeded {
            query,
            total_count: total,
        });
        state
    }

    fn fetches(effects: &[Effect]) -> Vec<&QuerySpec> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Fetch(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_load_fetches_initial_query() {
        let state = QueryState::new(QuerySpec::new(20), ControllerOptions::default());
        assert_eq!(state.phase(), &Phase::Idle);

        let (state, effects) = state.reduce(QueryAction::Load);
        assert_eq!(state.phase(), &Phase::Fetching);
        assert_eq!(effects, vec![Effect::Fetch(QuerySpec::new(20))]);
    }

    #[test]
    fn test_success_settles() {
        let state = settled(57);
        assert_eq!(state.phase(), &Phase::Settled(Outcome::Success));
        assert_eq!(state.total_count(), Some(57));
        assert!(!state.is_fetching());
    }

    #[test]
    fn test_set_filter_is_idempotent() {
        let state = settled(57);
        let action = QueryAction::SetFilter {
            column: "status".into(),
            value: Some("active".into()),
        };

        let (once, first_effects) = state.reduce(action.clone());
        let (twice, second_effects) = once.reduce(action);

        assert_eq!(once.query(), twice.query());
        assert_eq!(fetches(&first_effects).len(), 1);
        assert!(fetches(&second_effects).is_empty());
        assert!(second_effects.contains(&Effect::ClearSelection));
    }

    #[test]
    fn test_empty_filter_removes() {
        let state = settled(57);
        let (state, _) = state.reduce(QueryAction::SetFilter {
            column: "status".into(),
            value: Some("active".into()),
        });
        let (state, _) = state.reduce(QueryAction::SetFilter {
            column: "status".into(),
            value: Some("".into()),
        });
        assert!(state.query().filters().is_empty());

        let (state, _) = state.reduce(QueryAction::SetFilter {
            column: "priority".into(),
            value: Some("high".into()),
        });
        let (state, _) = state.reduce(QueryAction::SetFilter {
            column: "priority".into(),
            value: None,
        });
        assert!(state.query().filters().is_empty());
    }

    #[test]
    fn test_filter_resets_page() {
        let (state, _) = settled(57).reduce(QueryAction::SetPage(3));
        let (state, _) = state.reduce(QueryAction::SetFilter {
            column: "status".into(),
            value: Some("active".into()),
        });
        assert_eq!(state.query().page(), 1);
    }

    #[test]
    fn test_single_sort_replaces() {
        let (state, _) = settled(57).reduce(QueryAction::SetPage(2));
        let (state, _) = state.reduce(QueryAction::SetSort {
            column: "title".into(),
            direction: Direction::Asc,
        });
        let (state, effects) = state.reduce(QueryAction::SetSort {
            column: "priority".into(),
            direction: Direction::Desc,
        });
        assert_eq!(state.query().sort(), &[SortKey::new("priority", Direction::Desc)]);
        assert_eq!(state.query().page(), 1);
        assert!(!effects.contains(&Effect::ClearSelection));
    }

    #[test]
    fn test_multi_sort_most_recent_first() {
        let options = ControllerOptions {
            multi_sort: true,
            ..Default::default()
        };
        let state = QueryState::new(QuerySpec::new(20), options);
        let (state, _) = state.reduce(QueryAction::SetSort {
            column: "title".into(),
            direction: Direction::Asc,
        });
        let (state, _) = state.reduce(QueryAction::SetSort {
            column: "priority".into(),
            direction: Direction::Desc,
        });
        let (state, _) = state.reduce(QueryAction::SetSort {
            column: "title".into(),
            direction: Direction::Desc,
        });
        assert_eq!(
            state.query().sort(),
            &[
                SortKey::new("title", Direction::Desc),
                SortKey::new("priority", Direction::Desc),
            ]
        );

        let (state, _) = state.reduce(QueryAction::ClearSort {
            column: "title".into(),
        });
        assert_eq!(state.query().sort(), &[SortKey::new("priority", Direction::Desc)]);
    }

    #[test]
    fn test_free_text_debounces() {
        let state = settled(57);
        let (state, effects) = state.reduce(QueryAction::SetFreeText("log".into()));
        assert_eq!(state.phase(), &Phase::Debouncing);
        assert_eq!(
            effects,
            vec![Effect::ScheduleDebounce {
                ticket: 0,
                delay: Duration::from_millis(300)
            }]
        );
        assert_eq!(state.query().term(), "");

        let (state, _) = state.reduce(QueryAction::SetFreeText("login".into()));

        // First timer fires late; superseded.
        let (state, effects) = state.reduce(QueryAction::DebounceElapsed { ticket: 0 });
        assert!(effects.is_empty());
        assert_eq!(state.query().term(), "");

        let (state, effects) = state.reduce(QueryAction::DebounceElapsed { ticket: 1 });
        assert_eq!(state.query().term(), "login");
        assert_eq!(state.phase(), &Phase::Fetching);
        assert_eq!(effects[0], Effect::ClearSelection);
        assert_eq!(fetches(&effects).len(), 1);
    }

    #[test]
    fn test_unchanged_term_does_not_refetch() {
        let state = settled(57);
        let (state, _) = state.reduce(QueryAction::SetFreeText("  ".into()));
        let (state, effects) = state.reduce(QueryAction::DebounceElapsed { ticket: 0 });
        assert_eq!(effects, vec![Effect::ClearSelection]);
        assert_eq!(state.phase(), &Phase::Settled(Outcome::Success));
    }

    #[test]
    fn test_set_page_clamps() {
        let state = settled(57);
        let (high, _) = state.reduce(QueryAction::SetPage(9));
        assert_eq!(high.query().page(), 3);
        let (low, _) = state.reduce(QueryAction::SetPage(0));
        assert_eq!(low.query().page(), 1);
    }

    #[test]
    fn test_set_page_without_total_only_clamps_below() {
        let state = QueryState::new(QuerySpec::new(20), ControllerOptions::default());
        let (state, effects) = state.reduce(QueryAction::SetPage(4));
        assert_eq!(state.query().page(), 4);
        assert_eq!(fetches(&effects).len(), 1);
    }

    #[test]
    fn test_page_size_keeps_first_row() {
        let (state, _) = settled(57).reduce(QueryAction::SetPage(3));

        let (bigger, effects) = state.reduce(QueryAction::SetPageSize(50));
        assert_eq!(bigger.query().size(), 50);
        assert_eq!(bigger.query().page(), 1);
        assert!(effects.contains(&Effect::ClearSelection));

        let (smaller, _) = state.reduce(QueryAction::SetPageSize(10));
        assert_eq!(smaller.query().page(), 5);
    }

    #[test]
    fn test_page_after_page_size_is_always_in_range() {
        for total in [0u64, 1, 19, 20, 57, 1000] {
            let base = settled(total);
            for start in [1u32, 2, 3, 7, 50] {
                let (state, _) = base.reduce(QueryAction::SetPage(start));
                for size in [1u32, 5, 10, 20, 33, 50, 100, 500] {
                    let (next, _) = state.reduce(QueryAction::SetPageSize(size));
                    let size = next.query().size();
                    let page = next.query().page();
                    assert!(page >= 1);
                    assert!(page <= page_count(total, size).max(1));
                }
            }
        }
    }

    #[test]
    fn test_page_size_is_capped() {
        let (state, _) = settled(57).reduce(QueryAction::SetPageSize(10_000));
        assert_eq!(state.query().size(), 100);
        let (state, _) = state.reduce(QueryAction::SetPageSize(0));
        assert_eq!(state.query().size(), 1);
    }

    #[test]
    fn test_stale_result_is_ignored() {
        let state = settled(57);
        let old = state.query().clone();
        let (state, _) = state.reduce(QueryAction::SetPage(2));
        let before = state.clone();
        let (state, effects) = state.reduce(QueryAction::FetchSucceeded {
            query: old,
            total_count: 3,
        });
        assert_eq!(state, before);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_shrunk_total_moves_to_last_page() {
        let (state, _) = settled(57).reduce(QueryAction::SetPage(3));
        let query = state.query().clone();
        let (state, effects) = state.reduce(QueryAction::FetchSucceeded {
            query,
            total_count: 30,
        });
        assert_eq!(state.query().page(), 2);
        assert_eq!(fetches(&effects).len(), 1);
        assert_eq!(state.phase(), &Phase::Fetching);
    }

    #[test]
    fn test_failure_then_retry() {
        let state = QueryState::new(QuerySpec::new(20), ControllerOptions::default());
        let (state, _) = state.reduce(QueryAction::Load);
        let query = state.query().clone();
        let error = FetchError::new(Some(500), "boom");
        let (state, _) = state.reduce(QueryAction::FetchFailed {
            query,
            error: error.clone(),
        });
        assert_eq!(state.phase(), &Phase::Settled(Outcome::Error(error.clone())));
        assert_eq!(state.error(), Some(&error));

        let (state, effects) = state.reduce(QueryAction::Retry);
        assert_eq!(state.phase(), &Phase::Fetching);
        assert_eq!(fetches(&effects).len(), 1);

        // Retry while fetching is a no-op.
        let (_, effects) = state.reduce(QueryAction::Retry);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_retry_without_error_is_noop() {
        let (_, effects) = settled(57).reduce(QueryAction::Retry);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_reduce_does_not_touch_input() {
        let state = settled(57);
        let copy = state.clone();
        let _ = state.reduce(QueryAction::SetPage(2));
        assert_eq!(state, copy);
    }
}
