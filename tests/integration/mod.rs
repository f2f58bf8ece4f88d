//! Integration tests for the notetree store, builder and matcher

mod engine_scenario;
mod schema_matching;
mod store_integration;
mod support;
mod tree_determinism;
mod tree_structure;
