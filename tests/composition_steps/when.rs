//! When steps for composition BDD scenarios.

use super::world::{CompositionWorld, run_async};
use rstest_bdd_macros::when;
use trellis::composition::services::HostRegistrationOptions;

#[when("the manifest is composed")]
fn manifest_is_composed(world: &mut CompositionWorld) {
    let composer = world.composer();
    world.outcome = Some(run_async(composer.compose()));
}

#[when("the composer is registered into the existing server")]
fn composer_is_registered(world: &mut CompositionWorld) {
    let server = world.existing_server();
    let composer = world.composer();
    world.outcome = Some(run_async(
        composer.register(server, HostRegistrationOptions::new()),
    ));
}
