//! Layout resolution priority and determinism.

use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vyuh_content::{
    BuildContext, ContentDescriptor, ContentItem, ContentLayout, ContentRegistry,
    LayoutConfiguration, LayoutDescriptor, LayoutSource, RenderNode, SimpleContentBuilder,
    fn_layout, typed_layout,
};

fn marker(name: &'static str) -> LayoutDescriptor {
    LayoutDescriptor::new(
        name,
        name,
        fn_layout(move |_item: &ContentItem, _ctx: &BuildContext<'_>| Ok(RenderNode::element(name))),
    )
}

fn card_registry(with_descriptor_default: bool) -> ContentRegistry {
    let registry = ContentRegistry::new();
    let mut descriptor = ContentDescriptor::new("vyuh.card", "Card")
        .with_layout(marker("vyuh.card.layout.list_item"))
        .with_layout(marker("vyuh.card.layout.hero"));
    if with_descriptor_default {
        descriptor = descriptor.with_default_layout(marker("vyuh.card.layout.descriptor_default"));
    }
    registry.register_descriptor(descriptor);
    registry.register_builder(
        SimpleContentBuilder::new("vyuh.card", marker("vyuh.card.layout.builder_default"))
            .with_layout(marker("vyuh.card.layout.builder_extra")),
    );
    registry
}

fn card(layout: Option<&str>) -> ContentItem {
    let item = ContentItem::new("vyuh.card").with_field("title", "Chakra");
    match layout {
        Some(layout) => item.with_layout(LayoutConfiguration::new(layout)),
        None => item,
    }
}

// ── Priority order ───────────────────────────────────────────────

#[test]
fn authored_descriptor_layout_wins() {
    let registry = card_registry(true);
    let resolved = registry
        .resolve_layout(&card(Some("vyuh.card.layout.hero")))
        .unwrap()
        .unwrap();
    assert_eq!(resolved.schema_type(), "vyuh.card.layout.hero");
    assert_eq!(resolved.source, LayoutSource::Item);
}

#[test]
fn authored_builder_layout_is_found() {
    let registry = card_registry(true);
    let resolved = registry
        .resolve_layout(&card(Some("vyuh.card.layout.builder_extra")))
        .unwrap()
        .unwrap();
    assert_eq!(resolved.schema_type(), "vyuh.card.layout.builder_extra");
    assert_eq!(resolved.source, LayoutSource::Item);
}

#[test]
fn unregistered_authored_layout_falls_back_to_descriptor_default() {
    let registry = card_registry(true);
    let resolved = registry
        .resolve_layout(&card(Some("vyuh.card.layout.from_the_future")))
        .unwrap()
        .unwrap();
    assert_eq!(resolved.schema_type(), "vyuh.card.layout.descriptor_default");
    assert_eq!(resolved.source, LayoutSource::Descriptor);
}

#[test]
fn no_layout_uses_descriptor_default_then_builder_default() {
    let with_default = card_registry(true);
    let resolved = with_default.resolve_layout(&card(None)).unwrap().unwrap();
    assert_eq!(resolved.source, LayoutSource::Descriptor);

    let without_default = card_registry(false);
    let resolved = without_default.resolve_layout(&card(None)).unwrap().unwrap();
    assert_eq!(resolved.schema_type(), "vyuh.card.layout.builder_default");
    assert_eq!(resolved.source, LayoutSource::Builder);
}

#[test]
fn builder_default_without_any_descriptor() {
    let registry = ContentRegistry::new();
    registry.register_builder(SimpleContentBuilder::new("vyuh.divider", marker("divider")));

    let node = registry.build(&ContentItem::new("vyuh.divider")).unwrap();
    assert_eq!(node, RenderNode::element("divider"));
}

#[test]
fn unknown_type_has_no_resolution() {
    let registry = card_registry(true);
    assert!(registry
        .resolve_layout(&ContentItem::new("vyuh.nonexistent"))
        .unwrap()
        .is_none());
}

// ── Layout configuration ─────────────────────────────────────────

struct Columns(u64);

impl ContentLayout for Columns {
    fn render(&self, _item: &ContentItem, _ctx: &BuildContext<'_>) -> vyuh_content::ContentResult<RenderNode> {
        Ok(RenderNode::element("grid").with_prop("columns", self.0))
    }
}

#[test]
fn authored_configuration_reaches_the_factory() {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&created);
    let grid = LayoutDescriptor::configurable("vyuh.group.layout.grid", "Grid", move |config| {
        counter.fetch_add(1, Ordering::SeqCst);
        let columns = config
            .and_then(|c| c.get_number("columns"))
            .map(|n| n as u64)
            .unwrap_or(2);
        Arc::new(Columns(columns)) as Arc<dyn ContentLayout>
    });

    let registry = ContentRegistry::new();
    registry.register_descriptor(ContentDescriptor::new("vyuh.group", "Group").with_layout(grid.clone()));
    registry.register_builder(SimpleContentBuilder::new("vyuh.group", grid));

    let authored = ContentItem::from_value(json!({
        "_type": "vyuh.group",
        "layout": { "_type": "vyuh.group.layout.grid", "columns": 4 },
    }))
    .unwrap();
    assert_eq!(registry.build(&authored).unwrap().prop("columns"), Some(&json!(4)));

    let defaulted = ContentItem::new("vyuh.group");
    assert_eq!(registry.build(&defaulted).unwrap().prop("columns"), Some(&json!(2)));
    assert_eq!(created.load(Ordering::SeqCst), 2);
}

#[derive(serde::Deserialize)]
struct Divider {
    thickness: f64,
}

#[test]
fn typed_layout_decodes_or_degrades() {
    let registry = ContentRegistry::new();
    registry.register_builder(SimpleContentBuilder::new(
        "vyuh.divider",
        LayoutDescriptor::new(
            "vyuh.divider.layout.default",
            "Default",
            typed_layout(|divider: &Divider, _item: &ContentItem, _ctx: &BuildContext<'_>| {
                Ok(RenderNode::element("divider").with_prop("thickness", divider.thickness))
            }),
        ),
    ));

    let ok = ContentItem::new("vyuh.divider").with_field("thickness", 2.0);
    assert_eq!(registry.build(&ok).unwrap().prop("thickness"), Some(&json!(2.0)));

    let bad = ContentItem::new("vyuh.divider").with_field("thickness", "thick");
    assert!(matches!(
        registry.build(&bad).unwrap(),
        RenderNode::Invalid { .. }
    ));
}

// ── Properties ───────────────────────────────────────────────────

fn layout_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z]{1,8}", 0..12)
        .prop_map(|names| names.into_iter().map(|n| format!("vyuh.card.layout.{n}")).collect())
}

proptest! {
    /// layouts_for returns layouts in registration order.
    #[test]
    fn layouts_keep_registration_order(names in layout_names()) {
        let registry = ContentRegistry::new();
        let mut descriptor = ContentDescriptor::new("vyuh.card", "Card");
        for name in &names {
            let kind = name.clone();
            descriptor = descriptor.with_layout(LayoutDescriptor::new(
                name.clone(),
                name.clone(),
                fn_layout(move |_item: &ContentItem, _ctx: &BuildContext<'_>| {
                    Ok(RenderNode::element(kind.clone()))
                }),
            ));
        }
        registry.register_descriptor(descriptor);

        let listed: Vec<String> = registry
            .layouts_for("vyuh.card")
            .iter()
            .map(|l| l.schema_type().to_string())
            .collect();
        prop_assert_eq!(listed, names);
    }

    /// Items without a layout always resolve to the builder default.
    #[test]
    fn default_resolution_is_deterministic(
        title in "[a-zA-Z ]{0,20}",
        repeats in 1usize..8,
    ) {
        let registry = card_registry(false);
        let item = card(None).with_field("subtitle", title);

        for _ in 0..repeats {
            let resolved = registry.resolve_layout(&item).unwrap().unwrap();
            prop_assert_eq!(resolved.schema_type(), "vyuh.card.layout.builder_default");
            prop_assert_eq!(resolved.source, LayoutSource::Builder);
        }
        let first = registry.build(&item).unwrap();
        let second = registry.build(&item).unwrap();
        prop_assert_eq!(first, second);
    }

    /// An authored layout resolves to itself exactly when it is registered.
    #[test]
    fn authored_layout_matches_only_registered(suffix in "[a-z_]{1,12}") {
        let registry = card_registry(true);
        let authored = format!("vyuh.card.layout.{suffix}");
        let resolved = registry.resolve_layout(&card(Some(&authored))).unwrap().unwrap();

        let registered = [
            "vyuh.card.layout.list_item",
            "vyuh.card.layout.hero",
            "vyuh.card.layout.descriptor_default",
            "vyuh.card.layout.builder_default",
            "vyuh.card.layout.builder_extra",
        ];
        if registered.contains(&authored.as_str()) {
            prop_assert_eq!(resolved.schema_type(), authored.as_str());
            prop_assert_eq!(resolved.source, LayoutSource::Item);
        } else {
            prop_assert_eq!(resolved.source, LayoutSource::Descriptor);
        }
    }
}
