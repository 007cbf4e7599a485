//! Job application processing: listing analysis, placeholder values and the run pipeline

pub mod document;
pub mod listing;
pub mod variables;
pub mod pipeline;

pub use pipeline::{ApplicationRequest, Pipeline};
