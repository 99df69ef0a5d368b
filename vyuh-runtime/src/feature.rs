//! Feature extensions: the packages that plug content types and shared
//! services into the runtime.

use async_trait::async_trait;
use vyuh_content::{ContentBuilder, ContentDescriptor, ContentRegistry};
use vyuh_di::Container;

/// An independently built package of content types and services.
#[async_trait]
pub trait FeatureExtension: Send + Sync {
    /// Unique feature name.
    fn name(&self) -> &str;

    fn title(&self) -> &str {
        self.name()
    }

    /// Registers content types and services. Runs once, in the order
    /// features were added to the runtime.
    fn register(&self, registrar: &mut Registrar<'_>);

    /// Runs after every feature has registered.
    async fn init(&self, _container: &Container) -> anyhow::Result<()> {
        Ok(())
    }
}

/// What a feature may mutate while registering.
pub struct Registrar<'a> {
    feature: &'a str,
    content: &'a ContentRegistry,
    container: &'a Container,
    descriptors: usize,
    builders: usize,
}

impl<'a> Registrar<'a> {
    pub(crate) fn new(feature: &'a str, content: &'a ContentRegistry, container: &'a Container) -> Self {
        Self {
            feature,
            content,
            container,
            descriptors: 0,
            builders: 0,
        }
    }

    /// Name of the feature being registered.
    pub fn feature(&self) -> &str {
        self.feature
    }

    pub fn register_descriptor(&mut self, descriptor: ContentDescriptor) -> &mut Self {
        self.content.register_descriptor(descriptor);
        self.descriptors += 1;
        self
    }

    pub fn register_builder(&mut self, builder: impl ContentBuilder + 'static) -> &mut Self {
        self.content.register_builder(builder);
        self.builders += 1;
        self
    }

    pub fn container(&self) -> &'a Container {
        self.container
    }

    pub(crate) fn counts(&self) -> (usize, usize) {
        (self.descriptors, self.builders)
    }
}
