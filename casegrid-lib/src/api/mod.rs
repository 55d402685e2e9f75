//! Remote resource access.
//!
//! [`DataSource`] is the seam between the grid and the backend. The
//! [`HttpSource`] implementation talks to the test-management REST API
//! through a [`GridClient`](crate::GridClient); tests and embedders can
//! supply their own.

mod http;
mod source;

pub use http::*;
pub use source::*;
