//! Query state for a grid.
//!
//! - [`QuerySpec`] - what the grid should display (page, size, sort, filters, search term)
//! - [`CacheKey`] - a query spec prefixed with the host-supplied [`Scope`]
//! - [`PageResult`] - one page of rows with the authoritative total count
//! - [`QueryState`] - the controller state machine, a pure reducer over
//!   [`QueryAction`]s that returns [`Effect`]s for the caller to run

mod controller;
mod key;
mod page;
mod spec;

pub use controller::*;
pub use key::*;
pub use page::*;
pub use spec::*;
