//! Local model integration: prompts, the completion client and response cleanup

pub mod client;
pub mod prompts;
pub mod response;
pub mod resume_import;

pub use client::{Completer, CompletionClient};
