//! Summary of a generation run for the console

use crate::output::exporter::ExportedDocument;
use crate::processing::document::DocumentKind;
use colored::Colorize;
use std::fmt;

/// Non-fatal problems noticed during a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunWarning {
    /// Placeholders left in a rendered document with no value for them
    TemplateMismatch {
        kind: DocumentKind,
        placeholders: Vec<String>,
    },
    /// PDF conversion failed; the markdown file is still available
    Conversion { kind: DocumentKind, message: String },
    /// Job title could not be determined and the fallback was used
    JobTitleFallback(String),
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::TemplateMismatch { kind, placeholders } => write!(
                f,
                "{} template has unresolved placeholders: {}",
                kind,
                placeholders
                    .iter()
                    .map(|p| format!("{{{{{}}}}}", p))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            RunWarning::Conversion { kind, message } => {
                write!(f, "PDF for {} not created ({}); markdown kept", kind, message)
            }
            RunWarning::JobTitleFallback(reason) => {
                write!(f, "Could not determine job title ({}), using fallback", reason)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationReport {
    pub job_title: String,
    pub company: String,
    pub documents: Vec<ExportedDocument>,
    pub warnings: Vec<RunWarning>,
}

impl ApplicationReport {
    pub fn new(job_title: String, company: String) -> Self {
        Self {
            job_title,
            company,
            documents: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn document(&self, kind: DocumentKind) -> Option<&ExportedDocument> {
        self.documents.iter().find(|d| d.kind == kind)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn print(&self) {
        println!();
        println!("{}", "✅ Application documents generated".green().bold());
        println!("💼 Position: {} at {}", self.job_title.bold(), self.company.bold());

        for doc in &self.documents {
            println!("📄 {}: {}", doc.kind, doc.markdown_path.display());
            if let Some(pdf) = &doc.pdf_path {
                println!("   📑 PDF: {}", pdf.display());
            }
        }

        if self.has_warnings() {
            println!();
            for warning in &self.warnings {
                println!("{} {}", "⚠️".yellow(), warning.to_string().yellow());
            }
        }
    }
}
