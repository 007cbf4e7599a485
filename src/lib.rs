//! Job application generator library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod processing;
pub mod profile;

pub use config::Config;
pub use error::{JobAppError, PipelineStage, Result};
pub use profile::Profile;
