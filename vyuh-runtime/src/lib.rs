//! Vyuh extension runtime.
//!
//! Wires independently built [`FeatureExtension`]s into one [`Runtime`]:
//! each feature registers content descriptors, builders and shared services
//! through a [`Registrar`], and the runtime turns loader states into
//! [`RenderNode`](vyuh_content::RenderNode) trees.
//!
//! ```no_run
//! # async fn run() -> vyuh_runtime::RuntimeResult<()> {
//! use vyuh_runtime::{Runtime, RuntimeConfig, SystemFeature};
//!
//! let runtime = Runtime::builder()
//!     .config(RuntimeConfig::load_from("vyuh.toml"))
//!     .feature(SystemFeature::new())
//!     .build()
//!     .await?;
//! let loader = runtime.route_loader("/chakra", runtime.loader_options()).await?;
//! loader.load().await?;
//! let node = runtime.render(&loader.settled().await)?;
//! # Ok(())
//! # }
//! ```

mod analytics;
mod config;
mod error;
mod feature;
mod runtime;
pub mod system;

pub use analytics::{ANALYTICS_KEY, Analytics, AnalyticsEvent, LogAnalytics, SharedAnalytics};
pub use config::{CONFIG_FILE_NAME, LoaderConfig, RuntimeConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use feature::{FeatureExtension, Registrar};
pub use runtime::{
    CMS_KEY, ContentTypeInfo, FeatureInfo, LayoutInfo, Runtime, RuntimeBuilder, SharedTransport,
};
pub use system::SystemFeature;
