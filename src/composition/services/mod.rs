//! Application services for manifest composition.

mod composer;
mod document;
mod engine;
mod parameters;

pub use composer::Composer;
pub use document::{OptionsDocument, ParametersDocument};
pub use engine::{
    CompositionError, CompositionResult, CompositionService, merge_registration_options,
};
pub use parameters::{
    ComposeOptions, ComposeParameters, Hook, HookFuture, HostRegistrationOptions,
};
