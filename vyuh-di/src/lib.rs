//! Dependency injection container for Vyuh feature extensions.
//!
//! Independently built feature packages share services (router, CMS client,
//! analytics, ...) through a keyed registry instead of a central wiring step:
//! - [`Container`] — keyed factories with lazy, memoized instantiation
//! - [`DiKey`] — string names, Rust types, or process-unique tokens
//! - [`global`] — the process-wide container used by application code
//!
//! Registration is **first-wins**: a second `register` under an existing key
//! is ignored, so packages may register shared services defensively without
//! caring about load order. Overriding is only possible through
//! [`Container::replace`]. Content descriptors deliberately use the opposite
//! policy (last-wins); see `vyuh-content`.

mod container;
mod error;
mod key;

pub use container::Container;
pub use error::{DiError, DiResult};
pub use key::DiKey;

use std::sync::OnceLock;

static GLOBAL: OnceLock<Container> = OnceLock::new();

/// Returns the process-wide container.
///
/// Created empty on first access and kept until process exit. Call
/// [`Container::reset`] for explicit teardown. Tests should prefer
/// constructing isolated [`Container`] instances.
pub fn global() -> &'static Container {
    GLOBAL.get_or_init(Container::new)
}
