use serde::Deserialize;
use vyuh_content::{
    BuildContext, ContentDescriptor, ContentItem, ContentResult, LayoutDescriptor, RenderNode,
    SimpleContentBuilder, typed_layout,
};

pub const CARD_TYPE: &str = "vyuh.card";
const DEFAULT_LAYOUT: &str = "vyuh.card.layout.default";
const LIST_ITEM_LAYOUT: &str = "vyuh.card.layout.list_item";

#[derive(Debug, Deserialize)]
struct Card {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Accepts a plain URL or a CMS image object (`image.asset.url`).
fn image_url(item: &ContentItem) -> Option<&str> {
    item.get_str("/image")
        .or_else(|| item.get_str("/image/asset/url"))
        .or_else(|| item.get_str("/image/url"))
}

fn card(card: &Card, item: &ContentItem, _ctx: &BuildContext<'_>) -> ContentResult<RenderNode> {
    let mut node = RenderNode::element("card").with_opt_prop("image", image_url(item));
    if let Some(title) = &card.title {
        node = node.with_child(RenderNode::element("title").with_child(RenderNode::text(title)));
    }
    if let Some(description) = &card.description {
        node = node.with_child(RenderNode::text(description));
    }
    Ok(node)
}

fn list_item(card: &Card, item: &ContentItem, _ctx: &BuildContext<'_>) -> ContentResult<RenderNode> {
    Ok(RenderNode::element("list_item")
        .with_opt_prop("title", card.title.clone())
        .with_opt_prop("subtitle", card.description.clone())
        .with_opt_prop("leading", image_url(item)))
}

fn default_layout() -> LayoutDescriptor {
    LayoutDescriptor::new(DEFAULT_LAYOUT, "Card", typed_layout(card))
}

fn list_item_layout() -> LayoutDescriptor {
    LayoutDescriptor::new(LIST_ITEM_LAYOUT, "List Item", typed_layout(list_item))
}

pub(super) fn descriptor() -> ContentDescriptor {
    ContentDescriptor::new(CARD_TYPE, "Card")
        .with_layout(default_layout())
        .with_layout(list_item_layout())
}

pub(super) fn builder() -> SimpleContentBuilder {
    SimpleContentBuilder::new(CARD_TYPE, default_layout())
}
