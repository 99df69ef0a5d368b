//! Analytics service shared through the DI container.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Container key the analytics service is registered under.
pub const ANALYTICS_KEY: &str = "vyuh.analytics";

/// How analytics is stored in the container.
pub type SharedAnalytics = Arc<dyn Analytics>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    /// Content arrived with a schema type no feature registered.
    UnknownSchemaType { schema_type: String },
    /// A loader settled.
    DocumentLoaded { query: String, state: String },
}

pub trait Analytics: Send + Sync {
    fn track(&self, event: &AnalyticsEvent);
}

/// Writes events to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnalytics;

impl Analytics for LogAnalytics {
    fn track(&self, event: &AnalyticsEvent) {
        match event {
            AnalyticsEvent::UnknownSchemaType { schema_type } => {
                info!(schema_type = %schema_type, "analytics: unknown schema type");
            }
            AnalyticsEvent::DocumentLoaded { query, state } => {
                info!(query = %query, state = %state, "analytics: document loaded");
            }
        }
    }
}
