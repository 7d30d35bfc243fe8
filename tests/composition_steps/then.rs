//! Then steps for composition BDD scenarios.

use std::sync::Arc;

use super::world::{CompositionWorld, route_body};
use rstest_bdd_macros::then;
use serde_json::json;
use trellis::composition::{adapters::memory::HostEvent, ports::HostError, services::CompositionError};

#[then("composition succeeds")]
fn composition_succeeds(world: &CompositionWorld) -> Result<(), eyre::Report> {
    world.composed_server().map(drop)
}

#[then(r#"a request for "{path}" on connection "{label}" is answered"#)]
fn request_is_answered(
    world: &CompositionWorld,
    path: String,
    label: String,
) -> Result<(), eyre::Report> {
    let body = world
        .composed_server()?
        .inject(Some(&label), &path)
        .map_err(|err| eyre::eyre!("inject failed: {err}"))?;
    if body != Some(route_body()) {
        return Err(eyre::eyre!("expected route body on '{label}', got {body:?}"));
    }
    Ok(())
}

#[then(r#"a request for "{path}" on connection "{label}" is not answered"#)]
fn request_is_not_answered(
    world: &CompositionWorld,
    path: String,
    label: String,
) -> Result<(), eyre::Report> {
    let body = world
        .composed_server()?
        .inject(Some(&label), &path)
        .map_err(|err| eyre::eyre!("inject failed: {err}"))?;
    if let Some(found) = body {
        return Err(eyre::eyre!("expected no route on '{label}', got {found}"));
    }
    Ok(())
}

#[then("the host bound {count:usize} connections")]
fn host_bound_connections(world: &CompositionWorld, count: usize) -> Result<(), eyre::Report> {
    let events = world
        .host
        .events()
        .map_err(|err| eyre::eyre!("events failed: {err}"))?;
    let bound = events
        .iter()
        .filter(|event| matches!(event, HostEvent::ConnectionAdded { .. }))
        .count();
    if bound != count {
        return Err(eyre::eyre!("expected {count} bound connections, found {bound}"));
    }
    Ok(())
}

#[then("the composed server is the existing server")]
fn composed_server_is_existing(world: &CompositionWorld) -> Result<(), eyre::Report> {
    let composed = world.composed_server()?;
    let existing = world
        .existing_server
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no existing server in scenario world"))?;
    if !Arc::ptr_eq(&composed, existing) {
        return Err(eyre::eyre!("composition returned a different server"));
    }
    Ok(())
}

#[then(r#"the composed server stores "{value}" under app key "{key}""#)]
fn composed_server_stores(
    world: &CompositionWorld,
    value: String,
    key: String,
) -> Result<(), eyre::Report> {
    let stored = world
        .composed_server()?
        .app(&key)
        .map_err(|err| eyre::eyre!("app lookup failed: {err}"))?;
    if stored != Some(json!(value)) {
        return Err(eyre::eyre!("expected '{value}' under '{key}', got {stored:?}"));
    }
    Ok(())
}

#[then(r#"composition fails because module "{module}" cannot be found"#)]
fn composition_fails_with_missing_module(
    world: &CompositionWorld,
    module: String,
) -> Result<(), eyre::Report> {
    match &world.outcome {
        Some(Err(CompositionError::Step(HostError::ModuleNotFound(missing))))
            if missing.as_str() == module =>
        {
            Ok(())
        }
        other => Err(eyre::eyre!("expected missing module '{module}', got {other:?}")),
    }
}

#[then(r#"composition fails validation at "{path}""#)]
fn composition_fails_validation(
    world: &CompositionWorld,
    path: String,
) -> Result<(), eyre::Report> {
    let Some(Err(CompositionError::Validation(err))) = &world.outcome else {
        return Err(eyre::eyre!(
            "expected a validation failure, got {:?}",
            world.outcome
        ));
    };
    if !err.to_string().starts_with(&path) {
        return Err(eyre::eyre!("expected a violation at '{path}', got '{err}'"));
    }
    Ok(())
}

#[then("no plugin was registered")]
fn no_plugin_registered(world: &CompositionWorld) -> Result<(), eyre::Report> {
    let events = world
        .host
        .events()
        .map_err(|err| eyre::eyre!("events failed: {err}"))?;
    if events
        .iter()
        .any(|event| matches!(event, HostEvent::PluginRegistered { .. }))
    {
        return Err(eyre::eyre!("expected no registrations, got {events:?}"));
    }
    Ok(())
}

#[then("the host recorded no events")]
fn host_recorded_no_events(world: &CompositionWorld) -> Result<(), eyre::Report> {
    let events = world
        .host
        .events()
        .map_err(|err| eyre::eyre!("events failed: {err}"))?;
    if !events.is_empty() {
        return Err(eyre::eyre!("expected no host events, got {events:?}"));
    }
    Ok(())
}
