//! Resume extraction entry point: dispatches on the file extension

use crate::error::{JobAppError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{DocxExtractor, PdfExtractor, TextExtractor};
use log::{debug, info};
use std::path::Path;
use tokio::fs;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx"];

#[derive(Default)]
pub struct ResumeExtractor {
    docx: DocxExtractor,
}

impl ResumeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn extract(&self, path: &Path) -> Result<String> {
        let extractor: &(dyn TextExtractor + Sync) = match FileType::from_path(path) {
            FileType::Pdf => &PdfExtractor,
            FileType::Docx => &self.docx,
            FileType::Unknown => {
                return Err(JobAppError::UnsupportedFormat(format!(
                    "{} (supported: {})",
                    path.display(),
                    SUPPORTED_EXTENSIONS.join(", ")
                )));
            }
        };

        if !path.exists() {
            return Err(JobAppError::InvalidInput(format!(
                "Resume file does not exist: {}",
                path.display()
            )));
        }

        info!("Extracting text from {} resume: {}", extractor.name(), path.display());
        let bytes = fs::read(path).await?;

        let text = extractor.extract(&bytes).map_err(|e| match e {
            JobAppError::Extraction(msg) => {
                JobAppError::Extraction(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        debug!("Extracted {} characters from {}", text.chars().count(), path.display());
        Ok(text)
    }
}
