//! The runtime facade: features in, render nodes out.

use crate::analytics::{ANALYTICS_KEY, AnalyticsEvent, SharedAnalytics};
use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::feature::{FeatureExtension, Registrar};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use vyuh_content::{ContentItem, ContentRegistry, LayoutDescriptor, RenderNode};
use vyuh_di::Container;
use vyuh_loader::{CmsTransport, DocumentLoader, LoaderOptions, LoaderState, Query};

/// Container key the CMS transport is registered under.
pub const CMS_KEY: &str = "vyuh.cms";

/// How the CMS transport is stored in the container.
pub type SharedTransport = Arc<dyn CmsTransport>;

/// Name and title of a registered feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureInfo {
    pub name: String,
    pub title: String,
}

/// Catalog entry for one registered content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeInfo {
    pub schema_type: String,
    pub title: String,
    pub layouts: Vec<LayoutInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_layout: Option<LayoutInfo>,
    pub has_builder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub schema_type: String,
    pub title: String,
}

impl From<&LayoutDescriptor> for LayoutInfo {
    fn from(layout: &LayoutDescriptor) -> Self {
        Self {
            schema_type: layout.schema_type().to_string(),
            title: layout.title().to_string(),
        }
    }
}

/// Collects configuration and features, then registers them in order.
#[derive(Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    container: Option<Arc<Container>>,
    features: Vec<Box<dyn FeatureExtension>>,
}

impl RuntimeBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `container` instead of a fresh one.
    pub fn container(mut self, container: Arc<Container>) -> Self {
        self.container = Some(container);
        self
    }

    pub fn feature(mut self, feature: impl FeatureExtension + 'static) -> Self {
        self.features.push(Box::new(feature));
        self
    }

    /// Registers every feature in the order added, then runs their `init`
    /// hooks in the same order.
    pub async fn build(self) -> RuntimeResult<Runtime> {
        let mut seen = HashSet::new();
        for feature in &self.features {
            if !seen.insert(feature.name()) {
                return Err(RuntimeError::DuplicateFeature(feature.name().to_string()));
            }
        }

        let container = self.container.unwrap_or_default();
        let content = Arc::new(ContentRegistry::new());

        for feature in &self.features {
            let mut registrar = Registrar::new(feature.name(), &content, &container);
            feature.register(&mut registrar);
            let (descriptors, builders) = registrar.counts();
            info!(
                feature = %feature.name(),
                descriptors,
                builders,
                "feature registered"
            );
        }

        for feature in &self.features {
            feature
                .init(&container)
                .await
                .map_err(|source| RuntimeError::FeatureInit {
                    feature: feature.name().to_string(),
                    source,
                })?;
            debug!(feature = %feature.name(), "feature initialized");
        }

        let features = self
            .features
            .iter()
            .map(|feature| FeatureInfo {
                name: feature.name().to_string(),
                title: feature.title().to_string(),
            })
            .collect();

        Ok(Runtime {
            config: self.config,
            container,
            content,
            features,
        })
    }
}

/// A configured set of features with their content registry and services.
pub struct Runtime {
    config: RuntimeConfig,
    container: Arc<Container>,
    content: Arc<ContentRegistry>,
    features: Vec<FeatureInfo>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn content(&self) -> &ContentRegistry {
        &self.content
    }

    /// Registered features in registration order.
    pub fn features(&self) -> &[FeatureInfo] {
        &self.features
    }

    /// Loader options derived from the runtime configuration.
    pub fn loader_options(&self) -> LoaderOptions {
        self.config.loader_options()
    }

    /// Builds `item` and reports any unknown schema types to analytics.
    ///
    /// Analytics is only consulted if it is registered and already
    /// instantiated, so building never waits on a service factory.
    pub fn build(&self, item: &ContentItem) -> RuntimeResult<RenderNode> {
        let node = self.content.build(item)?;
        let unknown = node.unknown_schema_types();
        if !unknown.is_empty() && self.container.contains(ANALYTICS_KEY) {
            if let Some(analytics) = self.container.try_get::<SharedAnalytics>(ANALYTICS_KEY)? {
                for schema_type in unknown {
                    analytics.track(&AnalyticsEvent::UnknownSchemaType {
                        schema_type: schema_type.to_string(),
                    });
                }
            }
        }
        Ok(node)
    }

    /// Maps a loader state to what the host should show.
    pub fn render(&self, state: &LoaderState) -> RuntimeResult<RenderNode> {
        match state {
            LoaderState::Idle | LoaderState::Loading => Ok(RenderNode::Loading),
            LoaderState::Empty => Ok(RenderNode::Empty),
            LoaderState::Error(err) => Ok(RenderNode::Failure {
                message: err.to_string(),
                transient: err.is_transient(),
            }),
            LoaderState::Ready(item) => self.build(item),
        }
    }

    /// The CMS transport registered under [`CMS_KEY`].
    pub async fn transport(&self) -> RuntimeResult<SharedTransport> {
        let transport = self.container.get::<SharedTransport>(CMS_KEY).await?;
        Ok(transport.as_ref().clone())
    }

    pub async fn route_loader(
        &self,
        path: impl Into<String>,
        options: LoaderOptions,
    ) -> RuntimeResult<DocumentLoader> {
        Ok(DocumentLoader::for_route(self.transport().await?, path, options))
    }

    pub async fn query_loader(
        &self,
        query: Query,
        options: LoaderOptions,
    ) -> RuntimeResult<DocumentLoader> {
        Ok(DocumentLoader::for_query(self.transport().await?, query, options))
    }

    /// Every registered content type, sorted by schema type.
    pub fn catalog(&self) -> Vec<ContentTypeInfo> {
        let builders = self.content.builders();
        let mut catalog: Vec<ContentTypeInfo> = self
            .content
            .descriptors()
            .descriptors()
            .iter()
            .map(|descriptor| ContentTypeInfo {
                schema_type: descriptor.schema_type().to_string(),
                title: descriptor.title().to_string(),
                layouts: descriptor.layouts().iter().map(LayoutInfo::from).collect(),
                default_layout: descriptor.default_layout().map(LayoutInfo::from),
                has_builder: builders.contains(descriptor.schema_type()),
            })
            .collect();
        catalog.sort_by(|a, b| a.schema_type.cmp(&b.schema_type));
        catalog
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("features", &self.features)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}
