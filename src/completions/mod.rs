//! Completion request front end.

pub mod client;
pub mod postprocess;

pub use client::{CompletionClient, complete_from_env};
