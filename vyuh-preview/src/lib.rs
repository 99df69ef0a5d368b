//! HTTP API for the Vyuh preview server.

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use vyuh_content::RenderNode;
use vyuh_loader::transport::mock::MemoryTransport;
use vyuh_loader::{LoaderOptions, LoaderState};
use vyuh_runtime::{
    CMS_KEY, ContentTypeInfo, FeatureExtension, Registrar, Runtime, RuntimeConfig, RuntimeResult,
    SharedTransport, SystemFeature,
};

/// Response body of `GET /api/v1/render`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RenderResponse {
    pub path: String,
    pub state: String,
    pub node: RenderNode,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
struct RenderParams {
    path: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

/// Serves fixture documents as the CMS.
pub struct FixtureFeature {
    transport: MemoryTransport,
}

impl FixtureFeature {
    pub fn new(documents: Vec<Value>) -> Self {
        Self {
            transport: MemoryTransport::with_documents(documents),
        }
    }
}

impl FeatureExtension for FixtureFeature {
    fn name(&self) -> &str {
        "fixtures"
    }

    fn title(&self) -> &str {
        "Fixture CMS"
    }

    fn register(&self, registrar: &mut Registrar<'_>) {
        let transport: SharedTransport = Arc::new(self.transport.clone());
        registrar.container().register_instance(CMS_KEY, transport);
    }
}

/// Reads fixture documents: a JSON array of documents or a single document.
pub fn load_fixtures(path: &Path) -> anyhow::Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)?;
    let fixtures: Value = serde_json::from_str(&contents)?;
    match fixtures {
        Value::Array(documents) => Ok(documents),
        document @ Value::Object(_) => Ok(vec![document]),
        _ => anyhow::bail!("fixtures must be a JSON array or object"),
    }
}

/// A runtime with the system feature backed by `documents`.
pub async fn build_runtime(config: RuntimeConfig, documents: Vec<Value>) -> RuntimeResult<Runtime> {
    Runtime::builder()
        .config(config)
        .feature(SystemFeature::new())
        .feature(FixtureFeature::new(documents))
        .build()
        .await
}

fn status_for(state: &LoaderState) -> StatusCode {
    match state {
        LoaderState::Ready(_) => StatusCode::OK,
        LoaderState::Empty => StatusCode::NOT_FOUND,
        LoaderState::Error(err) if err.is_transient() => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

async fn render_handler(
    State(runtime): State<Arc<Runtime>>,
    Query(params): Query<RenderParams>,
) -> Result<(StatusCode, Json<RenderResponse>), ApiError> {
    let path = params.path.unwrap_or_else(|| "/".to_string());
    let options = LoaderOptions {
        live: false,
        ..runtime.loader_options()
    };

    let loader = runtime
        .route_loader(path.as_str(), options)
        .await
        .map_err(|e| api_error(StatusCode::SERVICE_UNAVAILABLE, e))?;
    loader
        .load()
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    let state = loader.settled().await;

    let node = runtime.render(&state).map_err(|e| {
        warn!(path = %path, "render failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;
    debug!(path = %path, state = state.name(), "rendered route");

    Ok((
        status_for(&state),
        Json(RenderResponse {
            path: loader.query().as_route().map(|(_, p)| p).unwrap_or(path),
            state: state.name().to_string(),
            node,
        }),
    ))
}

async fn content_types_handler(State(runtime): State<Arc<Runtime>>) -> Json<Vec<ContentTypeInfo>> {
    Json(runtime.catalog())
}

/// Build the HTTP API router for `runtime`.
pub fn build_router(runtime: Arc<Runtime>) -> Router {
    Router::new()
        .route("/api/v1/render", get(render_handler))
        .route("/api/v1/content-types", get(content_types_handler))
        .with_state(runtime)
}
