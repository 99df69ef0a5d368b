use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use vyuh_content::{ContentItem, RenderNode};
use vyuh_di::{Container, DiError};
use vyuh_loader::transport::mock::MemoryTransport;
use vyuh_loader::{LoaderError, LoaderState};
use vyuh_runtime::{
    Analytics, AnalyticsEvent, CMS_KEY, FeatureExtension, Registrar, Runtime, RuntimeConfig,
    RuntimeError, SharedTransport, SystemFeature,
};

#[derive(Default)]
struct Recorder(Mutex<Vec<AnalyticsEvent>>);

impl Analytics for Recorder {
    fn track(&self, event: &AnalyticsEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

struct CmsFeature {
    name: &'static str,
    transport: MemoryTransport,
}

impl CmsFeature {
    fn new(name: &'static str, transport: MemoryTransport) -> Self {
        Self { name, transport }
    }
}

impl FeatureExtension for CmsFeature {
    fn name(&self) -> &str {
        self.name
    }

    fn register(&self, registrar: &mut Registrar<'_>) {
        let transport: SharedTransport = Arc::new(self.transport.clone());
        registrar.container().register_instance(CMS_KEY, transport);
    }
}

struct InitProbe {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[async_trait]
impl FeatureExtension for InitProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn register(&self, _registrar: &mut Registrar<'_>) {
        self.log.lock().unwrap().push(format!("register:{}", self.name));
    }

    async fn init(&self, _container: &Container) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(format!("init:{}", self.name));
        if self.fail {
            anyhow::bail!("cms credentials missing");
        }
        Ok(())
    }
}

fn chakra_page() -> Value {
    json!({
        "_type": "vyuh.route",
        "_id": "route-chakra",
        "title": "Chakra",
        "path": "/chakra",
        "regions": [
            {
                "identifier": "body",
                "items": [
                    { "_type": "vyuh.card", "title": "Root", "description": "Muladhara",
                      "image": { "asset": { "url": "https://cdn.example.com/root.png" } },
                      "layout": { "_type": "vyuh.card.layout.list_item" } },
                    { "_type": "vyuh.divider", "thickness": 2,
                      "layout": { "_type": "vyuh.divider.layout.dashed", "dashLength": 8 } },
                    { "_type": "vyuh.group", "title": "Seven",
                      "layout": { "_type": "vyuh.group.layout.grid", "columns": 3 },
                      "items": [
                          { "_type": "vyuh.card", "title": "Crown" },
                          { "_type": "vyuh.poll", "question": "Which one?" }
                      ] }
                ]
            }
        ]
    })
}

async fn runtime_with(transport: MemoryTransport, recorder: Arc<Recorder>) -> Runtime {
    Runtime::builder()
        .feature(SystemFeature::with_analytics(recorder))
        .feature(CmsFeature::new("cms", transport))
        .build()
        .await
        .unwrap()
}

// ── Registration ─────────────────────────────────────────────────

#[tokio::test]
async fn system_feature_registers_catalog() {
    let runtime = runtime_with(MemoryTransport::new(), Arc::default()).await;

    let names: Vec<&str> = runtime.features().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["system", "cms"]);

    let catalog = runtime.catalog();
    let types: Vec<&str> = catalog.iter().map(|c| c.schema_type.as_str()).collect();
    assert_eq!(types, vec!["vyuh.card", "vyuh.divider", "vyuh.group", "vyuh.route"]);
    assert!(catalog.iter().all(|c| c.has_builder));

    let group = catalog.iter().find(|c| c.schema_type == "vyuh.group").unwrap();
    let layouts: Vec<&str> = group.layouts.iter().map(|l| l.schema_type.as_str()).collect();
    assert_eq!(layouts, vec!["vyuh.group.layout.list", "vyuh.group.layout.grid"]);

    let json = serde_json::to_value(&catalog).unwrap();
    assert_eq!(json[0]["schemaType"], "vyuh.card");
    assert_eq!(json[0]["layouts"][1]["title"], "List Item");
}

#[tokio::test]
async fn duplicate_feature_names_are_rejected() {
    let err = Runtime::builder()
        .feature(SystemFeature::new())
        .feature(SystemFeature::new())
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::DuplicateFeature(name) if name == "system"));
}

#[tokio::test]
async fn init_hooks_run_after_all_registration_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let probe = |name, fail| InitProbe {
        name,
        log: Arc::clone(&log),
        fail,
    };

    Runtime::builder()
        .feature(probe("auth", false))
        .feature(probe("blog", false))
        .build()
        .await
        .unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["register:auth", "register:blog", "init:auth", "init:blog"]
    );
}

#[tokio::test]
async fn failing_init_names_the_feature() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let err = Runtime::builder()
        .feature(InitProbe {
            name: "cms",
            log: Arc::clone(&log),
            fail: true,
        })
        .build()
        .await
        .unwrap_err();

    match err {
        RuntimeError::FeatureInit { feature, source } => {
            assert_eq!(feature, "cms");
            assert_eq!(source.to_string(), "cms credentials missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn first_feature_to_register_a_service_wins() {
    let first = MemoryTransport::with_documents([json!({ "_type": "vyuh.route", "path": "/", "title": "first" })]);
    let second = MemoryTransport::with_documents([json!({ "_type": "vyuh.route", "path": "/", "title": "second" })]);

    let runtime = Runtime::builder()
        .feature(CmsFeature::new("primary-cms", first))
        .feature(CmsFeature::new("fallback-cms", second))
        .build()
        .await
        .unwrap();

    let loader = runtime.route_loader("/", runtime.loader_options()).await.unwrap();
    loader.load().await.unwrap();
    let state = loader.settled().await;
    assert_eq!(state.content().and_then(|item| item.get_str("/title")), Some("first"));
}

#[tokio::test]
async fn shared_container_is_used() {
    let container = Arc::new(Container::new());
    let runtime = Runtime::builder()
        .container(Arc::clone(&container))
        .feature(SystemFeature::new())
        .build()
        .await
        .unwrap();

    assert!(Arc::ptr_eq(runtime.container(), &container));
    assert!(container.contains(vyuh_runtime::ANALYTICS_KEY));
}

// ── Rendering ────────────────────────────────────────────────────

#[tokio::test]
async fn loader_states_map_to_affordances() {
    let runtime = runtime_with(MemoryTransport::new(), Arc::default()).await;

    assert_eq!(runtime.render(&LoaderState::Idle).unwrap(), RenderNode::Loading);
    assert_eq!(runtime.render(&LoaderState::Loading).unwrap(), RenderNode::Loading);
    assert_eq!(runtime.render(&LoaderState::Empty).unwrap(), RenderNode::Empty);
    assert_eq!(
        runtime
            .render(&LoaderState::Error(LoaderError::Network("offline".into())))
            .unwrap(),
        RenderNode::Failure {
            message: "network error: offline".into(),
            transient: true,
        }
    );
}

#[tokio::test]
async fn chakra_route_renders_end_to_end() {
    let recorder = Arc::new(Recorder::default());
    let transport = MemoryTransport::with_documents([chakra_page()]);
    let runtime = runtime_with(transport, Arc::clone(&recorder)).await;

    let loader = runtime
        .route_loader("/chakra", runtime.loader_options())
        .await
        .unwrap();
    loader.load().await.unwrap();
    let node = runtime.render(&loader.settled().await).unwrap();

    assert_eq!(node.kind(), Some("route"));
    assert_eq!(node.prop("title"), Some(&json!("Chakra")));
    let [region] = node.children() else {
        panic!("expected one region, got {node}");
    };
    assert_eq!(region.prop("identifier"), Some(&json!("body")));

    let [card, divider, group] = region.children() else {
        panic!("expected three items, got {region}");
    };
    assert_eq!(
        *card,
        RenderNode::element("list_item")
            .with_prop("title", "Root")
            .with_prop("subtitle", "Muladhara")
            .with_prop("leading", "https://cdn.example.com/root.png")
    );
    assert_eq!(divider.prop("style"), Some(&json!("dashed")));
    assert_eq!(divider.prop("dashLength"), Some(&json!(8.0)));
    assert_eq!(divider.prop("thickness"), Some(&json!(2.0)));

    assert_eq!(group.kind(), Some("grid"));
    assert_eq!(group.prop("columns"), Some(&json!(3)));
    assert_eq!(group.children()[1], RenderNode::unknown("vyuh.poll"));

    assert_eq!(
        *recorder.0.lock().unwrap(),
        vec![AnalyticsEvent::UnknownSchemaType {
            schema_type: "vyuh.poll".into()
        }]
    );
}

#[tokio::test]
async fn defaults_apply_without_authored_layouts() {
    let runtime = runtime_with(MemoryTransport::new(), Arc::default()).await;

    let divider = ContentItem::new("vyuh.divider");
    assert_eq!(
        runtime.build(&divider).unwrap(),
        RenderNode::element("divider")
            .with_prop("thickness", 1.0)
            .with_prop("indent", 0.0)
            .with_prop("style", "solid")
    );

    let group = ContentItem::new("vyuh.group").with_field("items", json!([{ "_type": "vyuh.divider" }]));
    let node = runtime.build(&group).unwrap();
    assert_eq!(node.kind(), Some("list"));
    assert_eq!(node.children().len(), 1);

    let card = ContentItem::new("vyuh.card").with_field("title", "Solo");
    let node = runtime.build(&card).unwrap();
    assert_eq!(node.kind(), Some("card"));
    assert_eq!(node.prop("image"), None);
}

#[tokio::test]
async fn malformed_fields_render_invalid_placeholder() {
    let runtime = runtime_with(MemoryTransport::new(), Arc::default()).await;
    let divider = ContentItem::new("vyuh.divider").with_field("thickness", "heavy");
    assert!(matches!(
        runtime.build(&divider).unwrap(),
        RenderNode::Invalid { .. }
    ));
}

#[tokio::test]
async fn build_without_analytics_still_renders_unknown() {
    let runtime = Runtime::builder().build().await.unwrap();
    let node = runtime.build(&ContentItem::new("vyuh.anything")).unwrap();
    assert_eq!(node, RenderNode::unknown("vyuh.anything"));
}

// ── Loaders ──────────────────────────────────────────────────────

#[tokio::test]
async fn loaders_need_a_registered_transport() {
    let runtime = Runtime::builder()
        .feature(SystemFeature::new())
        .build()
        .await
        .unwrap();

    let err = runtime
        .route_loader("/chakra", runtime.loader_options())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Di(DiError::NotRegistered { .. })));
}

#[tokio::test]
async fn configured_route_type_reaches_loaders() {
    let config = RuntimeConfig::from_toml_str(
        r#"
route_type = "marketing.page"

[loader]
allow_refresh = false
"#,
    )
    .unwrap();
    let transport = MemoryTransport::with_documents([
        json!({ "_type": "marketing.page", "path": "/launch", "title": "Launch" }),
    ]);
    let runtime = Runtime::builder()
        .config(config)
        .feature(CmsFeature::new("cms", transport))
        .build()
        .await
        .unwrap();

    let loader = runtime
        .route_loader("launch", runtime.loader_options())
        .await
        .unwrap();
    loader.load().await.unwrap();
    assert!(matches!(loader.settled().await, LoaderState::Ready(_)));
    assert_eq!(loader.refresh(), Err(LoaderError::RefreshDisabled));
}
