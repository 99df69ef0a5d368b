use std::sync::Arc;
use vyuh_content::{
    BuildContext, ContentDescriptor, ContentItem, ContentLayout, ContentResult, LayoutDescriptor,
    RenderNode, SimpleContentBuilder, fn_layout,
};

pub const GROUP_TYPE: &str = "vyuh.group";
const LIST_LAYOUT: &str = "vyuh.group.layout.list";
const GRID_LAYOUT: &str = "vyuh.group.layout.grid";
const DEFAULT_COLUMNS: u64 = 2;

fn group_node(kind: &str, item: &ContentItem, ctx: &BuildContext<'_>) -> ContentResult<RenderNode> {
    let children = ctx.build_all(&item.children("items"))?;
    Ok(RenderNode::element(kind)
        .with_opt_prop("title", item.get_str("/title"))
        .with_children(children))
}

fn list_layout() -> LayoutDescriptor {
    LayoutDescriptor::new(
        LIST_LAYOUT,
        "List",
        fn_layout(|item: &ContentItem, ctx: &BuildContext<'_>| group_node("list", item, ctx)),
    )
}

struct Grid {
    columns: u64,
}

impl ContentLayout for Grid {
    fn render(&self, item: &ContentItem, ctx: &BuildContext<'_>) -> ContentResult<RenderNode> {
        Ok(group_node("grid", item, ctx)?.with_prop("columns", self.columns))
    }
}

/// Grid of the group's items; the authored layout sets `columns`.
fn grid_layout() -> LayoutDescriptor {
    LayoutDescriptor::configurable(GRID_LAYOUT, "Grid", |config| {
        let columns = config
            .and_then(|config| config.get_number("columns"))
            .filter(|columns| *columns >= 1.0)
            .map(|columns| columns as u64)
            .unwrap_or(DEFAULT_COLUMNS);
        Arc::new(Grid { columns }) as Arc<dyn ContentLayout>
    })
}

pub(super) fn descriptor() -> ContentDescriptor {
    ContentDescriptor::new(GROUP_TYPE, "Group")
        .with_layout(list_layout())
        .with_layout(grid_layout())
}

pub(super) fn builder() -> SimpleContentBuilder {
    SimpleContentBuilder::new(GROUP_TYPE, list_layout()).with_layout(grid_layout())
}
