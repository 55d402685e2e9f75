//! Row model.
//!
//! The grid is generic over its row type. A row only has to expose a stable
//! identifier; everything else is reached through column accessors.

mod testcase;

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;

pub use testcase::*;

/// A record displayed by the grid.
///
/// Identifiers must be unique within a scope and stable across fetches;
/// selection and bulk actions are keyed on them.
pub trait Row: Clone + Send + Sync + 'static {
    type Id: Clone + Ord + Hash + Debug + Serialize + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}
