//! Layouts: the rendering strategies a content type can offer.

use crate::error::ContentResult;
use crate::item::{ContentItem, LayoutConfiguration};
use crate::registry::BuildContext;
use crate::render::RenderNode;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

/// Renders one content item.
///
/// Nested items are built through `ctx` so they go through the same
/// registry and layout resolution.
pub trait ContentLayout: Send + Sync {
    fn render(&self, item: &ContentItem, ctx: &BuildContext<'_>) -> ContentResult<RenderNode>;
}

type LayoutFactory = Arc<dyn Fn(Option<&LayoutConfiguration>) -> Arc<dyn ContentLayout> + Send + Sync>;

/// One registered layout for a content type.
///
/// The key is scoped to the parent content type (e.g.
/// `vyuh.card.layout.list_item`) and is matched against the `_type` of an
/// item's authored `layout` object.
#[derive(Clone)]
pub struct LayoutDescriptor {
    schema_type: String,
    title: String,
    factory: LayoutFactory,
}

impl LayoutDescriptor {
    /// A layout that ignores any authored configuration.
    pub fn new(
        schema_type: impl Into<String>,
        title: impl Into<String>,
        layout: impl ContentLayout + 'static,
    ) -> Self {
        let layout: Arc<dyn ContentLayout> = Arc::new(layout);
        Self {
            schema_type: schema_type.into(),
            title: title.into(),
            factory: Arc::new(move |_: Option<&LayoutConfiguration>| Arc::clone(&layout)),
        }
    }

    /// A layout constructed from the authored configuration, which is
    /// `None` when the layout was chosen as a default.
    pub fn configurable<F>(schema_type: impl Into<String>, title: impl Into<String>, factory: F) -> Self
    where
        F: Fn(Option<&LayoutConfiguration>) -> Arc<dyn ContentLayout> + Send + Sync + 'static,
    {
        Self {
            schema_type: schema_type.into(),
            title: title.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn schema_type(&self) -> &str {
        &self.schema_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Instantiates the layout renderer.
    pub fn create(&self, config: Option<&LayoutConfiguration>) -> Arc<dyn ContentLayout> {
        (self.factory)(config)
    }
}

impl fmt::Debug for LayoutDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutDescriptor")
            .field("schema_type", &self.schema_type)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Layout backed by a plain function.
pub struct FnLayout<F>(F);

/// Wraps `render` as a [`ContentLayout`].
pub fn fn_layout<F>(render: F) -> FnLayout<F>
where
    F: Fn(&ContentItem, &BuildContext<'_>) -> ContentResult<RenderNode> + Send + Sync,
{
    FnLayout(render)
}

impl<F> ContentLayout for FnLayout<F>
where
    F: Fn(&ContentItem, &BuildContext<'_>) -> ContentResult<RenderNode> + Send + Sync,
{
    fn render(&self, item: &ContentItem, ctx: &BuildContext<'_>) -> ContentResult<RenderNode> {
        (self.0)(item, ctx)
    }
}

/// Layout that decodes the item's fields into `T` before rendering.
///
/// Fields that do not decode render as [`RenderNode::Invalid`] instead of
/// failing the surrounding build.
pub struct TypedLayout<T, F> {
    render: F,
    _marker: PhantomData<fn() -> T>,
}

pub fn typed_layout<T, F>(render: F) -> TypedLayout<T, F>
where
    T: DeserializeOwned,
    F: Fn(&T, &ContentItem, &BuildContext<'_>) -> ContentResult<RenderNode> + Send + Sync,
{
    TypedLayout {
        render,
        _marker: PhantomData,
    }
}

impl<T, F> ContentLayout for TypedLayout<T, F>
where
    T: DeserializeOwned,
    F: Fn(&T, &ContentItem, &BuildContext<'_>) -> ContentResult<RenderNode> + Send + Sync,
{
    fn render(&self, item: &ContentItem, ctx: &BuildContext<'_>) -> ContentResult<RenderNode> {
        match item.decode::<T>() {
            Ok(value) => (self.render)(&value, item, ctx),
            Err(err) => {
                warn!(schema_type = %item.schema_type(), "content fields failed to decode: {}", err);
                Ok(RenderNode::invalid(item.schema_type(), err.to_string()))
            }
        }
    }
}
