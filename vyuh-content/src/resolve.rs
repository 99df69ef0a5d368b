//! Layout resolution.
//!
//! Picks exactly one layout for an item, in priority order:
//! 1. the item's authored `layout`, if its `_type` is registered for the
//!    content type (searched in descriptor layouts, descriptor default,
//!    builder layouts, builder default)
//! 2. the descriptor's default layout
//! 3. the builder's default layout
//!
//! Resolution is pure: the same item and registry state always yield the
//! same choice.

use crate::builder::ContentBuilder;
use crate::descriptor::ContentDescriptor;
use crate::error::{ContentError, ContentResult};
use crate::item::ContentItem;
use crate::layout::{ContentLayout, LayoutDescriptor};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which resolution step chose the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSource {
    /// The item's authored `layout` matched a registered layout.
    Item,
    /// The descriptor's default layout.
    Descriptor,
    /// The builder's default layout.
    Builder,
}

/// The outcome of layout resolution.
#[derive(Clone)]
pub struct ResolvedLayout {
    pub descriptor: LayoutDescriptor,
    pub source: LayoutSource,
    pub layout: Arc<dyn ContentLayout>,
}

impl ResolvedLayout {
    pub fn schema_type(&self) -> &str {
        self.descriptor.schema_type()
    }
}

impl fmt::Debug for ResolvedLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedLayout")
            .field("layout", &self.descriptor.schema_type())
            .field("source", &self.source)
            .finish()
    }
}

/// Resolves the layout for `item`.
///
/// Fails with [`ContentError::NoLayoutAvailable`] only when neither the
/// descriptor nor the builder declares a default, which is a wiring bug.
pub fn resolve_layout<B>(
    item: &ContentItem,
    descriptor: Option<&ContentDescriptor>,
    builder: &B,
) -> ContentResult<ResolvedLayout>
where
    B: ContentBuilder + ?Sized,
{
    if let Some(config) = item.layout() {
        let authored = config.schema_type();
        let registered = descriptor
            .and_then(|d| d.find_layout(authored))
            .or_else(|| {
                builder
                    .layouts()
                    .iter()
                    .chain(builder.default_layout())
                    .find(|layout| layout.schema_type() == authored)
            });

        if let Some(found) = registered {
            return Ok(ResolvedLayout {
                layout: found.create(Some(config)),
                descriptor: found.clone(),
                source: LayoutSource::Item,
            });
        }

        debug!(
            schema_type = %item.schema_type(),
            layout = %authored,
            "authored layout not registered, falling back to default"
        );
    }

    if let Some(default) = descriptor.and_then(ContentDescriptor::default_layout) {
        return Ok(ResolvedLayout {
            layout: default.create(None),
            descriptor: default.clone(),
            source: LayoutSource::Descriptor,
        });
    }

    if let Some(default) = builder.default_layout() {
        return Ok(ResolvedLayout {
            layout: default.create(None),
            descriptor: default.clone(),
            source: LayoutSource::Builder,
        });
    }

    Err(ContentError::NoLayoutAvailable {
        schema_type: item.schema_type().to_string(),
    })
}
