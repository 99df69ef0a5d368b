use serde::Deserialize;
use serde_json::Value;
use vyuh_content::{
    BuildContext, ContentDescriptor, ContentItem, ContentResult, LayoutDescriptor, RenderNode,
    SimpleContentBuilder, typed_layout,
};

pub const ROUTE_TYPE: &str = "vyuh.route";
const DEFAULT_LAYOUT: &str = "vyuh.route.layout.default";

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    regions: Vec<Region>,
}

#[derive(Debug, Deserialize)]
struct Region {
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    items: Vec<Value>,
}

fn items(values: &[Value]) -> Vec<ContentItem> {
    values
        .iter()
        .filter_map(|value| ContentItem::from_value(value.clone()).ok())
        .collect()
}

fn render(route: &Route, item: &ContentItem, ctx: &BuildContext<'_>) -> ContentResult<RenderNode> {
    let mut node = RenderNode::element("route")
        .with_opt_prop("title", route.title.clone())
        .with_opt_prop("path", route.path.clone());

    for region in &route.regions {
        let children = ctx.build_all(&items(&region.items))?;
        node = node.with_child(
            RenderNode::element("region")
                .with_prop("identifier", region.identifier.clone())
                .with_opt_prop("title", region.title.clone())
                .with_children(children),
        );
    }

    // Routes without regions carry their items directly.
    let flat = ctx.build_all(&item.children("items"))?;
    Ok(node.with_children(flat))
}

fn default_layout() -> LayoutDescriptor {
    LayoutDescriptor::new(DEFAULT_LAYOUT, "Default", typed_layout(render))
}

pub(super) fn descriptor() -> ContentDescriptor {
    ContentDescriptor::new(ROUTE_TYPE, "Route").with_default_layout(default_layout())
}

pub(super) fn builder() -> SimpleContentBuilder {
    SimpleContentBuilder::new(ROUTE_TYPE, default_layout())
}
