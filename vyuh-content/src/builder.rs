use crate::descriptor::ContentDescriptor;
use crate::error::ContentResult;
use crate::item::ContentItem;
use crate::layout::LayoutDescriptor;
use crate::registry::BuildContext;
use crate::render::RenderNode;
use crate::resolve::{ResolvedLayout, resolve_layout};

/// Build logic for one content type.
///
/// Most content types only need [`SimpleContentBuilder`]. Implement this
/// directly to customize resolution or wrap the rendered node.
pub trait ContentBuilder: Send + Sync {
    fn schema_type(&self) -> &str;

    /// Layout used when neither the item nor the descriptor picks one.
    fn default_layout(&self) -> Option<&LayoutDescriptor>;

    /// Extra layouts the builder itself registers, in declaration order.
    fn layouts(&self) -> &[LayoutDescriptor] {
        &[]
    }

    fn resolve_layout(
        &self,
        item: &ContentItem,
        descriptor: Option<&ContentDescriptor>,
    ) -> ContentResult<ResolvedLayout> {
        resolve_layout(item, descriptor, self)
    }

    /// Resolves a layout for `item` and renders it.
    fn build(&self, item: &ContentItem, ctx: &BuildContext<'_>) -> ContentResult<RenderNode> {
        let descriptor = ctx.descriptor(item.schema_type());
        let resolved = self.resolve_layout(item, descriptor.as_deref())?;
        resolved.layout.render(item, ctx)
    }
}

/// Builder with a mandatory default layout and optional extra layouts.
#[derive(Debug, Clone)]
pub struct SimpleContentBuilder {
    schema_type: String,
    default_layout: LayoutDescriptor,
    layouts: Vec<LayoutDescriptor>,
}

impl SimpleContentBuilder {
    pub fn new(schema_type: impl Into<String>, default_layout: LayoutDescriptor) -> Self {
        Self {
            schema_type: schema_type.into(),
            default_layout,
            layouts: Vec::new(),
        }
    }

    pub fn with_layout(mut self, layout: LayoutDescriptor) -> Self {
        self.layouts.push(layout);
        self
    }
}

impl ContentBuilder for SimpleContentBuilder {
    fn schema_type(&self) -> &str {
        &self.schema_type
    }

    fn default_layout(&self) -> Option<&LayoutDescriptor> {
        Some(&self.default_layout)
    }

    fn layouts(&self) -> &[LayoutDescriptor] {
        &self.layouts
    }
}
