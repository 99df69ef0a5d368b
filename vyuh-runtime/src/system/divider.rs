use serde::Deserialize;
use std::sync::Arc;
use vyuh_content::{
    BuildContext, ContentDescriptor, ContentItem, ContentLayout, ContentResult, LayoutDescriptor,
    RenderNode, SimpleContentBuilder, TypedLayout, typed_layout,
};

pub const DIVIDER_TYPE: &str = "vyuh.divider";
const DEFAULT_LAYOUT: &str = "vyuh.divider.layout.default";
const DASHED_LAYOUT: &str = "vyuh.divider.layout.dashed";
const DEFAULT_DASH_LENGTH: f64 = 4.0;

#[derive(Debug, Deserialize)]
struct Divider {
    #[serde(default = "default_thickness")]
    thickness: f64,
    #[serde(default)]
    indent: f64,
}

fn default_thickness() -> f64 {
    1.0
}

fn divider_node(divider: &Divider, style: &str) -> RenderNode {
    RenderNode::element("divider")
        .with_prop("thickness", divider.thickness)
        .with_prop("indent", divider.indent)
        .with_prop("style", style)
}

fn solid(divider: &Divider, _item: &ContentItem, _ctx: &BuildContext<'_>) -> ContentResult<RenderNode> {
    Ok(divider_node(divider, "solid"))
}

fn default_layout() -> LayoutDescriptor {
    LayoutDescriptor::new(DEFAULT_LAYOUT, "Solid", typed_layout(solid))
}

/// Dashed rule; the authored layout may set `dashLength`.
fn dashed_layout() -> LayoutDescriptor {
    LayoutDescriptor::configurable(DASHED_LAYOUT, "Dashed", |config| {
        let dash_length = config
            .and_then(|config| config.get_number("dashLength"))
            .filter(|length| *length > 0.0)
            .unwrap_or(DEFAULT_DASH_LENGTH);
        let layout: TypedLayout<Divider, _> = typed_layout(
            move |divider: &Divider, _item: &ContentItem, _ctx: &BuildContext<'_>| {
                Ok(divider_node(divider, "dashed").with_prop("dashLength", dash_length))
            },
        );
        Arc::new(layout) as Arc<dyn ContentLayout>
    })
}

pub(super) fn descriptor() -> ContentDescriptor {
    ContentDescriptor::new(DIVIDER_TYPE, "Divider")
        .with_layout(default_layout())
        .with_layout(dashed_layout())
}

pub(super) fn builder() -> SimpleContentBuilder {
    SimpleContentBuilder::new(DIVIDER_TYPE, default_layout())
}
