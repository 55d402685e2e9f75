//! Error types

mod api;
mod grid;

pub use api::*;
pub use grid::*;

/// Top-level error for hosts that drive a grid end to end.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure outside of a fetch or mutation.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A list query failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A bulk mutation failed.
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// The grid or client was configured incorrectly.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
