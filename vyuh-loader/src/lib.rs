//! Document loading for Vyuh.
//!
//! A [`DocumentLoader`] turns a route path or a literal query into a
//! [`LoaderState`] that the host renders: `Idle`, `Loading`, `Ready`,
//! `Empty` or `Error`. Routes resolve through the CMS query
//! `*[_type == "<route-type>" && path == "<url>"][0]`.
//!
//! The CMS itself sits behind [`CmsTransport`]; [`transport::mock`] ships an
//! in-memory implementation for tests and previews.

mod error;
mod loader;
mod query;
mod state;
pub mod transport;

pub use error::{LoaderError, LoaderResult};
pub use loader::{DocumentLoader, LiveSubscription, LoaderOptions};
pub use query::{DEFAULT_ROUTE_TYPE, DocumentSource, Query, normalize_path};
pub use state::LoaderState;
pub use transport::{CmsTransport, UpdateStream};
