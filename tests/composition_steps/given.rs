//! Given steps for composition BDD scenarios.

use std::sync::Arc;

use super::world::{APP_ROOT, CompositionWorld, route_body};
use camino::Utf8Path;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::json;
use trellis::composition::{
    adapters::memory::StaticRoutePlugin,
    domain::{ConnectionConfig, ModulePath, PluginAttributes, Registration, RegistrationOptions},
};

#[given(r#"the host offers a route plugin at "{path}""#)]
fn host_offers_route_plugin(
    world: &mut CompositionWorld,
    path: String,
) -> Result<(), eyre::Report> {
    let module = ModulePath::new(path).resolve(Some(Utf8Path::new(APP_ROOT)));
    let plugin = StaticRoutePlugin::new(
        PluginAttributes::new("route", "1.0.0").allowing_multiple(),
        "plugin",
        route_body(),
    );
    world
        .host
        .add_plugin(module, Arc::new(plugin))
        .wrap_err("add route plugin to host")
}

#[given(r#"the manifest declares a connection labelled "{label}" on port {port:u16}"#)]
fn manifest_declares_connection(world: &mut CompositionWorld, label: String, port: u16) {
    let connection = ConnectionConfig::new()
        .with("labels", json!(label))
        .with("port", json!(port));
    world.manifest = world.manifest.clone().with_connection(connection);
}

#[given(r#"the manifest registers "{path}" with route prefix "{prefix}""#)]
fn manifest_registers_plugin(world: &mut CompositionWorld, path: String, prefix: String) {
    let mut options = RegistrationOptions::new();
    options.insert("routes".to_owned(), json!({ "prefix": prefix }));
    let registration = Registration::new(path.as_str()).with_options(options);
    world.manifest = world.manifest.clone().with_registration(registration);
}

#[given("the manifest registers a plugin with an empty module path")]
fn manifest_registers_empty_plugin(world: &mut CompositionWorld) {
    world.manifest = world.manifest.clone().with_registration(Registration::new(""));
}

#[given(r#"the composition selects connections labelled "{label}""#)]
fn composition_selects(world: &mut CompositionWorld, label: String) {
    world.options = world.options.clone().with_select(label.as_str());
}

#[given(r#"an existing server with a connection labelled "{label}""#)]
fn existing_server_with_connection(
    world: &mut CompositionWorld,
    label: String,
) -> Result<(), eyre::Report> {
    world
        .existing_server()
        .add_connection(&ConnectionConfig::new().with("labels", json!(label)))
        .wrap_err("bind connection on existing server")
}

#[given(r#"the existing server stores "{value}" under app key "{key}""#)]
fn existing_server_stores(
    world: &mut CompositionWorld,
    value: String,
    key: String,
) -> Result<(), eyre::Report> {
    world
        .existing_server()
        .set_app(key, json!(value))
        .wrap_err("store app value on existing server")
}
