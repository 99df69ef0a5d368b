//! Built-in content types every app gets.
//!
//! - `vyuh.route` — a page: regions of items, or a flat `items` list
//! - `vyuh.divider` — horizontal rule, solid or dashed
//! - `vyuh.card` — title, description and image
//! - `vyuh.group` — nested items as a list or a grid

mod card;
mod divider;
mod group;
mod route;

use crate::analytics::{ANALYTICS_KEY, LogAnalytics, SharedAnalytics};
use crate::feature::{FeatureExtension, Registrar};
use std::sync::Arc;

pub use card::CARD_TYPE;
pub use divider::DIVIDER_TYPE;
pub use group::GROUP_TYPE;
pub use route::ROUTE_TYPE;

/// Registers the built-in content types and the default analytics service.
pub struct SystemFeature {
    analytics: SharedAnalytics,
}

impl SystemFeature {
    pub fn new() -> Self {
        Self::with_analytics(Arc::new(LogAnalytics))
    }

    /// Uses `analytics` unless another feature registered one first.
    pub fn with_analytics(analytics: SharedAnalytics) -> Self {
        Self { analytics }
    }
}

impl Default for SystemFeature {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtension for SystemFeature {
    fn name(&self) -> &str {
        "system"
    }

    fn title(&self) -> &str {
        "System"
    }

    fn register(&self, registrar: &mut Registrar<'_>) {
        registrar
            .register_descriptor(route::descriptor())
            .register_builder(route::builder())
            .register_descriptor(divider::descriptor())
            .register_builder(divider::builder())
            .register_descriptor(card::descriptor())
            .register_builder(card::builder())
            .register_descriptor(group::descriptor())
            .register_builder(group::builder());

        registrar
            .container()
            .register_instance(ANALYTICS_KEY, Arc::clone(&self.analytics));
    }
}
