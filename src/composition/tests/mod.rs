//! Unit tests for the composition module.

mod composer_tests;
mod fixtures;
