//! Headless data grid engine for the test-management web client.
//!
//! Renders large, sortable, filterable, paginated result sets by fetching
//! only the page in view and materializing only the rows inside the scroll
//! window. Query state, selection and bulk mutations are kept consistent
//! with the remote resource through an explicit state machine and an
//! explicit cache invalidation contract.

pub mod api;
pub mod auth;
pub mod bulk;
pub mod cache;
pub mod error;
pub mod grid;
pub mod model;
pub mod query;
pub mod response;
pub mod retry;
pub mod selection;
pub mod window;

mod client;

pub use client::*;
pub use error::Error;
pub use response::CacheStatus;
pub use response::Response;
