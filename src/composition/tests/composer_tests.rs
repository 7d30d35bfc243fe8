//! Unit tests for the composer entry wrapper.

use super::fixtures::{CallLog, host_with_recorders};
use crate::composition::{
    adapters::memory::{HostEvent, InMemoryFramework, InMemoryServer, StaticRoutePlugin},
    domain::{
        ConnectionConfig, Manifest, PluginAttributes, Registration, RegistrationOptions, Select,
    },
    ports::{HostError, HostFramework, ServerPlugin, ServerSettings},
    services::{
        ComposeOptions, ComposeParameters, Composer, CompositionError, HostRegistrationOptions,
    },
};
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::{Arc, mpsc};

fn attributes() -> PluginAttributes {
    PluginAttributes::new("trellis-test", "0.1.0")
}

fn labelled_server(labels: &[&str]) -> Arc<InMemoryServer> {
    let server = Arc::new(InMemoryServer::new(ServerSettings::default()));
    for label in labels {
        server
            .add_connection(&ConnectionConfig::new().with("labels", json!(label)))
            .expect("connection should bind");
    }
    server
}

#[fixture]
fn route_host() -> Arc<InMemoryFramework> {
    let host = Arc::new(InMemoryFramework::new());
    host.add_plugin(
        "/srv/app/plugins/route",
        Arc::new(StaticRoutePlugin::new(
            PluginAttributes::new("route", "1.0.0").allowing_multiple(),
            "plugin",
            json!({"plugin": "works"}),
        )),
    )
    .expect("plugin should be added");
    host
}

fn route_manifest() -> Manifest {
    let mut options = RegistrationOptions::new();
    options.insert("routes".to_owned(), json!({"prefix": "/b/"}));
    Manifest::new().with_registration(Registration::new("./plugins/route").with_options(options))
}

fn route_composer(
    host: Arc<InMemoryFramework>,
    select: Option<Select>,
) -> Composer<InMemoryFramework> {
    let mut options = ComposeOptions::new().with_relative_to("/srv/app");
    options.select = select;
    Composer::new(
        host,
        ComposeParameters::new(route_manifest()).with_options(options),
        attributes(),
    )
}

#[rstest]
fn attributes_are_exposed_unchanged(route_host: Arc<InMemoryFramework>) {
    let custom = PluginAttributes::new("custom", "9.9.9").allowing_multiple();
    let composer = Composer::new(
        route_host,
        ComposeParameters::new(Manifest::new()),
        custom.clone(),
    );

    assert_eq!(composer.attributes(), &custom);
    assert_eq!(ServerPlugin::attributes(&composer), &custom);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn compose_builds_a_serving_server(route_host: Arc<InMemoryFramework>) {
    let composer = route_composer(route_host, None);

    let server = composer.compose().await.expect("composition should succeed");

    assert_eq!(
        server.inject(None, "/b/plugin").expect("inject"),
        Some(json!({"plugin": "works"}))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn compose_with_supplied_server_keeps_its_state(route_host: Arc<InMemoryFramework>) {
    let server = labelled_server(&["api"]);
    server.set_app("key", json!("abcdefg")).expect("app value");
    let composer = Composer::new(
        route_host,
        ComposeParameters::new(Manifest::new()).with_server(Arc::clone(&server)),
        attributes(),
    );

    let composed = composer.compose().await.expect("composition should succeed");

    assert!(Arc::ptr_eq(&composed, &server));
    assert_eq!(composed.app("key").expect("app"), Some(json!("abcdefg")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_targets_the_host_server(route_host: Arc<InMemoryFramework>) {
    let composer = route_composer(Arc::clone(&route_host), Some(Select::from("api")));
    let server = labelled_server(&["api", "admin"]);

    let composed = composer
        .register(Arc::clone(&server), HostRegistrationOptions::new())
        .await
        .expect("registration should succeed");

    assert!(Arc::ptr_eq(&composed, &server));
    assert_eq!(
        server.inject(Some("api"), "/b/plugin").expect("inject"),
        Some(json!({"plugin": "works"}))
    );
    assert_eq!(server.inject(Some("admin"), "/b/plugin").expect("inject"), None);
    assert!(
        !route_host
            .events()
            .expect("events")
            .iter()
            .any(|event| matches!(event, HostEvent::ConnectionAdded { .. }))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn host_select_replaces_configured_select(route_host: Arc<InMemoryFramework>) {
    let composer = route_composer(route_host, Some(Select::from("api")));
    let server = labelled_server(&["api", "admin"]);

    composer
        .register(
            Arc::clone(&server),
            HostRegistrationOptions::new().with_select("admin"),
        )
        .await
        .expect("registration should succeed");

    assert_eq!(server.inject(Some("api"), "/b/plugin").expect("inject"), None);
    assert!(server.inject(Some("admin"), "/b/plugin").expect("inject").is_some());
    assert_eq!(
        composer.parameters().options.select,
        Some(Select::from("api"))
    );
    assert!(composer.parameters().server.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn compose_with_delivers_outcome_to_callback(route_host: Arc<InMemoryFramework>) {
    let composer = route_composer(route_host, None);
    let (sender, receiver) = mpsc::channel();

    composer
        .compose_with(move |outcome| {
            sender.send(outcome).expect("receiver should be alive");
        })
        .await
        .expect("callback task should complete");

    let server = receiver
        .recv()
        .expect("callback should run")
        .expect("composition should succeed");
    assert_eq!(server.connections().expect("connections").len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_with_delivers_failure_to_callback() {
    let host = Arc::new(InMemoryFramework::new());
    let composer = route_composer(host, None);
    let (sender, receiver) = mpsc::channel();

    composer
        .register_with(
            labelled_server(&["api"]),
            HostRegistrationOptions::new(),
            move |outcome| {
                sender.send(outcome).expect("receiver should be alive");
            },
        )
        .await
        .expect("callback task should complete");

    let outcome = receiver.recv().expect("callback should run");
    assert!(matches!(
        outcome,
        Err(CompositionError::Step(HostError::ModuleNotFound(_)))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn composer_registers_as_a_plugin_of_another_composition(
    route_host: Arc<InMemoryFramework>,
) {
    let inner = route_composer(Arc::clone(&route_host), None);
    route_host
        .add_plugin("/srv/app/bundles/inner", Arc::new(inner))
        .expect("plugin should be added");
    let mut options = RegistrationOptions::new();
    options.insert("select".to_owned(), json!("api"));
    let outer = Composer::new(
        Arc::clone(&route_host),
        ComposeParameters::new(
            Manifest::new()
                .with_connection(ConnectionConfig::new().with("labels", json!("api")))
                .with_connection(ConnectionConfig::new().with("labels", json!("admin")))
                .with_registration(Registration::new("./bundles/inner").with_options(options)),
        )
        .with_options(ComposeOptions::new().with_relative_to("/srv/app")),
        PluginAttributes::new("outer", "0.1.0"),
    );

    let server = outer.compose().await.expect("composition should succeed");

    assert_eq!(server.plugins().expect("plugins"), vec!["route", "trellis-test"]);
    assert!(server.inject(Some("api"), "/b/plugin").expect("inject").is_some());
    assert_eq!(server.inject(Some("admin"), "/b/plugin").expect("inject"), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plugin_registration_reports_invalid_host_select(route_host: Arc<InMemoryFramework>) {
    let composer = route_composer(route_host, None);
    let mut options = RegistrationOptions::new();
    options.insert("select".to_owned(), json!(42));

    let result = ServerPlugin::register(&composer, labelled_server(&["api"]), &options).await;

    assert!(matches!(result, Err(HostError::Runtime(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plugin_registration_passes_step_errors_through() {
    let log = CallLog::default();
    let (host, _) = host_with_recorders(&[], &log);
    let composer = route_composer(Arc::clone(&host), None);
    let server = host
        .construct_server(ServerSettings::default())
        .expect("server should be constructed");

    let result = ServerPlugin::register(&composer, server, &RegistrationOptions::new()).await;

    let Err(HostError::ModuleNotFound(module)) = result else {
        panic!("expected the missing module to be reported, got {result:?}");
    };
    assert_eq!(module.as_str(), "/srv/app/plugins/route");
}
