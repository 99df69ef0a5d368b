use crate::layout::LayoutDescriptor;
use std::fmt;

/// Registration metadata for one content type.
///
/// Layouts keep declaration order; pickers and documentation list them in
/// that order. The optional default layout is kept apart from `layouts`.
#[derive(Clone)]
pub struct ContentDescriptor {
    schema_type: String,
    title: String,
    layouts: Vec<LayoutDescriptor>,
    default_layout: Option<LayoutDescriptor>,
}

impl ContentDescriptor {
    pub fn new(schema_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            schema_type: schema_type.into(),
            title: title.into(),
            layouts: Vec::new(),
            default_layout: None,
        }
    }

    /// Appends a layout.
    pub fn with_layout(mut self, layout: LayoutDescriptor) -> Self {
        self.layouts.push(layout);
        self
    }

    pub fn with_default_layout(mut self, layout: LayoutDescriptor) -> Self {
        self.default_layout = Some(layout);
        self
    }

    pub fn schema_type(&self) -> &str {
        &self.schema_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn layouts(&self) -> &[LayoutDescriptor] {
        &self.layouts
    }

    pub fn default_layout(&self) -> Option<&LayoutDescriptor> {
        self.default_layout.as_ref()
    }

    /// Finds a layout by key among the declared layouts, then the default.
    pub fn find_layout(&self, layout_type: &str) -> Option<&LayoutDescriptor> {
        self.layouts
            .iter()
            .chain(self.default_layout.iter())
            .find(|layout| layout.schema_type() == layout_type)
    }
}

impl fmt::Debug for ContentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layouts: Vec<&str> = self.layouts.iter().map(LayoutDescriptor::schema_type).collect();
        f.debug_struct("ContentDescriptor")
            .field("schema_type", &self.schema_type)
            .field("title", &self.title)
            .field("layouts", &layouts)
            .field(
                "default_layout",
                &self.default_layout.as_ref().map(LayoutDescriptor::schema_type),
            )
            .finish()
    }
}
