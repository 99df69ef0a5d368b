//! Content extension model for Vyuh.
//!
//! Maps opaque schema-type identifiers from remote CMS payloads to locally
//! registered rendering logic:
//! - [`ContentItem`] — one deserialized content block (`_type` + fields + optional layout)
//! - [`ContentDescriptor`] — registration metadata: title, ordered layouts, default layout
//! - [`ContentBuilder`] — per-type build logic; resolves a layout and renders the item
//! - [`resolve_layout`] — item layout → descriptor default → builder default
//! - [`ContentRegistry`] — descriptor and builder registries plus `build`
//! - [`RenderNode`] — the value handed to the host UI
//!
//! Unknown schema types are expected (CMS/client version skew) and render as
//! a placeholder. A content type with no reachable layout is a wiring bug and
//! surfaces as [`ContentError::NoLayoutAvailable`].

mod builder;
mod descriptor;
mod error;
mod item;
mod layout;
mod registry;
mod render;
mod resolve;

pub use builder::{ContentBuilder, SimpleContentBuilder};
pub use descriptor::ContentDescriptor;
pub use error::{ContentError, ContentResult};
pub use item::{ContentItem, LayoutConfiguration};
pub use layout::{ContentLayout, FnLayout, LayoutDescriptor, TypedLayout, fn_layout, typed_layout};
pub use registry::{
    BuildContext, BuilderRegistry, ContentRegistry, DescriptorRegistry, Lookup, MAX_BUILD_DEPTH,
};
pub use render::RenderNode;
pub use resolve::{LayoutSource, ResolvedLayout, resolve_layout};
