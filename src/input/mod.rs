//! Resume input handling
//! Detects the resume file type and extracts its plain text

pub mod file_detector;
pub mod text_extractor;
pub mod manager;

pub use manager::ResumeExtractor;
