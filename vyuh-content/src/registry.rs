//! Descriptor and builder registries.
//!
//! Both registries are **last-wins**: a later, more specific package may
//! override a content type's descriptor or builder. The DI container is
//! first-wins instead: descriptors are configuration meant to be
//! specialized, shared services are not.
//!
//! Registration is expected during startup; lookups are synchronous and safe
//! to run concurrently with it.

use crate::builder::ContentBuilder;
use crate::descriptor::ContentDescriptor;
use crate::error::ContentResult;
use crate::item::ContentItem;
use crate::layout::LayoutDescriptor;
use crate::render::RenderNode;
use crate::resolve::ResolvedLayout;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Maximum nesting depth for [`BuildContext::build`]. Deeper items render
/// as [`RenderNode::Invalid`].
pub const MAX_BUILD_DEPTH: usize = 64;

/// Outcome of a descriptor lookup. Unknown types are an expected case.
#[derive(Debug, Clone)]
pub enum Lookup {
    Known(Arc<ContentDescriptor>),
    Unknown,
}

impl Lookup {
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn descriptor(&self) -> Option<&Arc<ContentDescriptor>> {
        match self {
            Self::Known(descriptor) => Some(descriptor),
            Self::Unknown => None,
        }
    }

    pub fn into_descriptor(self) -> Option<Arc<ContentDescriptor>> {
        match self {
            Self::Known(descriptor) => Some(descriptor),
            Self::Unknown => None,
        }
    }
}

// ================================================================
// Descriptors
// ================================================================

/// Content descriptors keyed by schema type.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    descriptors: RwLock<HashMap<String, Arc<ContentDescriptor>>>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the descriptor for its schema type.
    /// Returns the replaced descriptor, if any.
    pub fn register(&self, descriptor: ContentDescriptor) -> Option<Arc<ContentDescriptor>> {
        let schema_type = descriptor.schema_type().to_string();
        let replaced = self
            .descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(schema_type.clone(), Arc::new(descriptor));
        if replaced.is_some() {
            debug!(schema_type = %schema_type, "content descriptor replaced");
        } else {
            debug!(schema_type = %schema_type, "content descriptor registered");
        }
        replaced
    }

    pub fn lookup(&self, schema_type: &str) -> Lookup {
        match self
            .descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(schema_type)
        {
            Some(descriptor) => Lookup::Known(Arc::clone(descriptor)),
            None => Lookup::Unknown,
        }
    }

    /// Registered layouts for the type in declaration order. Empty for
    /// unknown types.
    pub fn layouts_for(&self, schema_type: &str) -> Vec<LayoutDescriptor> {
        self.lookup(schema_type)
            .descriptor()
            .map(|descriptor| descriptor.layouts().to_vec())
            .unwrap_or_default()
    }

    /// Registered schema types, sorted.
    pub fn schema_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        types.sort();
        types
    }

    /// All descriptors, sorted by schema type.
    pub fn descriptors(&self) -> Vec<Arc<ContentDescriptor>> {
        let mut descriptors: Vec<Arc<ContentDescriptor>> = self
            .descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        descriptors.sort_by(|a, b| a.schema_type().cmp(b.schema_type()));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ================================================================
// Builders
// ================================================================

/// Content builders keyed by schema type.
#[derive(Default)]
pub struct BuilderRegistry {
    builders: RwLock<HashMap<String, Arc<dyn ContentBuilder>>>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the builder for its schema type.
    /// Returns `true` if an existing builder was replaced.
    pub fn register(&self, builder: Arc<dyn ContentBuilder>) -> bool {
        let schema_type = builder.schema_type().to_string();
        let replaced = self
            .builders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(schema_type.clone(), builder)
            .is_some();
        if replaced {
            debug!(schema_type = %schema_type, "content builder replaced");
        } else {
            debug!(schema_type = %schema_type, "content builder registered");
        }
        replaced
    }

    pub fn get(&self, schema_type: &str) -> Option<Arc<dyn ContentBuilder>> {
        self.builders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(schema_type)
            .cloned()
    }

    pub fn contains(&self, schema_type: &str) -> bool {
        self.builders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(schema_type)
    }

    pub fn len(&self) -> usize {
        self.builders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<String> = self
            .builders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        types.sort();
        f.debug_struct("BuilderRegistry")
            .field("schema_types", &types)
            .finish()
    }
}

// ================================================================
// Combined registry
// ================================================================

/// Descriptor and builder registries, plus the `build` entry point.
#[derive(Debug, Default)]
pub struct ContentRegistry {
    descriptors: DescriptorRegistry,
    builders: BuilderRegistry,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_descriptor(&self, descriptor: ContentDescriptor) {
        self.descriptors.register(descriptor);
    }

    pub fn register_builder(&self, builder: impl ContentBuilder + 'static) {
        self.builders.register(Arc::new(builder));
    }

    pub fn descriptors(&self) -> &DescriptorRegistry {
        &self.descriptors
    }

    pub fn builders(&self) -> &BuilderRegistry {
        &self.builders
    }

    pub fn lookup(&self, schema_type: &str) -> Lookup {
        self.descriptors.lookup(schema_type)
    }

    pub fn layouts_for(&self, schema_type: &str) -> Vec<LayoutDescriptor> {
        self.descriptors.layouts_for(schema_type)
    }

    /// Resolves the layout `item` would be built with.
    /// `Ok(None)` when no builder is registered for its type.
    pub fn resolve_layout(&self, item: &ContentItem) -> ContentResult<Option<ResolvedLayout>> {
        let Some(builder) = self.builders.get(item.schema_type()) else {
            return Ok(None);
        };
        let descriptor = self.descriptors.lookup(item.schema_type()).into_descriptor();
        builder.resolve_layout(item, descriptor.as_deref()).map(Some)
    }

    /// Builds `item` and everything nested in it.
    ///
    /// Unknown schema types render as [`RenderNode::Unknown`]. Only wiring
    /// errors such as a missing layout are returned as `Err`.
    pub fn build(&self, item: &ContentItem) -> ContentResult<RenderNode> {
        BuildContext::new(self).build(item)
    }
}

/// Passed to layouts so they can build nested items.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    registry: &'a ContentRegistry,
    depth: usize,
}

impl<'a> BuildContext<'a> {
    pub fn new(registry: &'a ContentRegistry) -> Self {
        Self { registry, depth: 0 }
    }

    pub fn registry(&self) -> &'a ContentRegistry {
        self.registry
    }

    /// Nesting depth of items built through this context; 0 for the
    /// top-level item.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn descriptor(&self, schema_type: &str) -> Option<Arc<ContentDescriptor>> {
        self.registry.lookup(schema_type).into_descriptor()
    }

    pub fn build(&self, item: &ContentItem) -> ContentResult<RenderNode> {
        if self.depth >= MAX_BUILD_DEPTH {
            warn!(schema_type = %item.schema_type(), depth = self.depth, "content nested too deeply");
            return Ok(RenderNode::invalid(
                item.schema_type(),
                format!("nesting exceeds {MAX_BUILD_DEPTH} levels"),
            ));
        }

        let Some(builder) = self.registry.builders.get(item.schema_type()) else {
            warn!(schema_type = %item.schema_type(), "no builder registered for content type");
            return Ok(RenderNode::unknown(item.schema_type()));
        };

        let nested = Self {
            registry: self.registry,
            depth: self.depth + 1,
        };
        builder.build(item, &nested)
    }

    /// Builds each item in order.
    pub fn build_all<'i>(
        &self,
        items: impl IntoIterator<Item = &'i ContentItem>,
    ) -> ContentResult<Vec<RenderNode>> {
        items.into_iter().map(|item| self.build(item)).collect()
    }
}
