//! Document kinds produced per run and the content generated for them

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Resume, DocumentKind::CoverLetter];

    /// Prefix used for output file names.
    pub fn file_stem(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover_letter",
        }
    }

    pub fn template_file_name(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume_template.md",
            DocumentKind::CoverLetter => "cover_letter_template.md",
        }
    }

    /// The section of the document the model writes.
    pub fn section_name(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "summary",
            DocumentKind::CoverLetter => "custom paragraph for cover letter",
        }
    }

    /// Template placeholder receiving the generated text.
    pub fn placeholder(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "CustomSummary",
            DocumentKind::CoverLetter => "CustomParagraphFromAI",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Resume => f.write_str("resume"),
            DocumentKind::CoverLetter => f.write_str("cover letter"),
        }
    }
}

/// Model output for one run, held only while the pipeline executes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedContent {
    pub resume_summary: String,
    pub cover_letter_paragraph: String,
}

impl GeneratedContent {
    pub fn get(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Resume => &self.resume_summary,
            DocumentKind::CoverLetter => &self.cover_letter_paragraph,
        }
    }

    pub fn set(&mut self, kind: DocumentKind, text: String) {
        match kind {
            DocumentKind::Resume => self.resume_summary = text,
            DocumentKind::CoverLetter => self.cover_letter_paragraph = text,
        }
    }
}
