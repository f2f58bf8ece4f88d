//! Merge of configuration sources.

pub(crate) mod merge_policy;
pub mod service;
