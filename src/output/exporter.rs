//! Writes rendered documents to disk and converts them to PDF via pandoc

use crate::config::PdfConfig;
use crate::error::{JobAppError, Result};
use crate::processing::document::DocumentKind;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const MAX_COMPANY_LEN: usize = 75;
const MAX_NAME_ATTEMPTS: usize = 100;
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// LaTeX engines pandoc can render PDFs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfEngine {
    Xelatex,
    Lualatex,
    Pdflatex,
}

impl PdfEngine {
    /// Engines in the order they are tried.
    pub fn preference_order() -> &'static [PdfEngine] {
        &[PdfEngine::Xelatex, PdfEngine::Lualatex, PdfEngine::Pdflatex]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PdfEngine::Xelatex => "xelatex",
            PdfEngine::Lualatex => "lualatex",
            PdfEngine::Pdflatex => "pdflatex",
        }
    }
}

impl fmt::Display for PdfEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markdown to PDF conversion with a single engine.
pub trait PdfConverter {
    fn convert(
        &self,
        markdown: &Path,
        pdf: &Path,
        engine: PdfEngine,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Runs the external `pandoc` binary
pub struct PandocConverter {
    program: String,
    timeout: Duration,
    margin: String,
}

impl PandocConverter {
    pub fn new(config: &PdfConfig) -> Self {
        Self {
            program: "pandoc".to_string(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            margin: config.margin.clone(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl PdfConverter for PandocConverter {
    async fn convert(&self, markdown: &Path, pdf: &Path, engine: PdfEngine) -> Result<()> {
        let mut command = Command::new(&self.program);
        command
            .arg(markdown)
            .arg("-o")
            .arg(pdf)
            .arg(format!("--pdf-engine={}", engine))
            .arg("--variable")
            .arg(format!("geometry=margin={}", self.margin))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running {} with {}", self.program, engine);
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                JobAppError::Conversion(format!(
                    "{} timed out after {}s",
                    engine,
                    self.timeout.as_secs()
                ))
            })??;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(JobAppError::Conversion(format!(
                "{} exited with {}: {}",
                engine,
                output.status,
                stderr.trim()
            )))
        }
    }
}

/// One document written by the exporter
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub kind: DocumentKind,
    pub markdown_path: PathBuf,
    pub pdf_path: Option<PathBuf>,
    pub pdf_warning: Option<String>,
}

pub struct DocumentExporter<P> {
    output_dir: PathBuf,
    converter: P,
    engines: Vec<PdfEngine>,
    pdf_enabled: bool,
}

impl<P: PdfConverter> DocumentExporter<P> {
    pub fn new(output_dir: impl Into<PathBuf>, converter: P, pdf: &PdfConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            converter,
            engines: pdf.engines.clone(),
            pdf_enabled: pdf.enabled,
        }
    }

    pub fn set_pdf_enabled(&mut self, enabled: bool) {
        self.pdf_enabled = enabled;
    }

    /// Write the markdown file, then try each PDF engine in turn.
    ///
    /// Existing files are never overwritten: if the name is taken, `_1`,
    /// `_2`, ... is appended to the stem. A failed PDF conversion is reported
    /// on the returned document rather than as an error; the markdown file is
    /// kept either way.
    pub async fn export(
        &self,
        rendered: &str,
        kind: DocumentKind,
        company: &str,
        timestamp: &NaiveDateTime,
    ) -> Result<ExportedDocument> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let stem = output_file_stem(kind, company, timestamp);
        let markdown_path = self.write_new_markdown(&stem, rendered).await?;
        info!("Saved {}: {}", kind, markdown_path.display());

        let mut document = ExportedDocument {
            kind,
            markdown_path,
            pdf_path: None,
            pdf_warning: None,
        };

        if !self.pdf_enabled {
            return Ok(document);
        }

        match self.convert_with_fallback(&document.markdown_path).await {
            Ok(pdf_path) => document.pdf_path = Some(pdf_path),
            Err(message) => {
                warn!("PDF conversion failed for {}: {}", kind, message);
                document.pdf_warning = Some(message);
            }
        }
        Ok(document)
    }

    /// Create `{stem}.md` (or the first free `{stem}_N.md`) and write it.
    async fn write_new_markdown(&self, stem: &str, rendered: &str) -> Result<PathBuf> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = match attempt {
                0 => format!("{}.md", stem),
                n => format!("{}_{}.md", stem, n),
            };
            let path = self.output_dir.join(name);
            if tokio::fs::try_exists(path.with_extension("pdf")).await.unwrap_or(false) {
                continue;
            }

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(mut file) => {
                    file.write_all(rendered.as_bytes()).await?;
                    file.flush().await?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} already exists", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(JobAppError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free file name for {} in {}", stem, self.output_dir.display()),
        )))
    }

    async fn convert_with_fallback(&self, markdown: &Path) -> std::result::Result<PathBuf, String> {
        if self.engines.is_empty() {
            return Err("no PDF engines configured".to_string());
        }

        let pdf_path = markdown.with_extension("pdf");
        let mut failures = Vec::new();

        for engine in &self.engines {
            match self.converter.convert(markdown, &pdf_path, *engine).await {
                Ok(()) => {
                    info!("Generated PDF with {}: {}", engine, pdf_path.display());
                    return Ok(pdf_path);
                }
                Err(JobAppError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                    failures.push("pandoc not found on PATH".to_string());
                    break;
                }
                Err(e) => {
                    debug!("{} failed: {}", engine, e);
                    failures.push(e.to_string());
                }
            }
        }

        if tokio::fs::try_exists(&pdf_path).await.unwrap_or(false) {
            if let Err(e) = tokio::fs::remove_file(&pdf_path).await {
                warn!("Could not remove partial PDF {}: {}", pdf_path.display(), e);
            }
        }
        Err(failures.join("; "))
    }
}

/// `{kind}_{company}_{YYYYMMDD_HHMMSS}` without an extension.
pub fn output_file_stem(kind: DocumentKind, company: &str, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}_{}_{}",
        kind.file_stem(),
        sanitize_company(company),
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Make a company name safe to embed in a file name.
pub fn sanitize_company(company: &str) -> String {
    let sanitized: String = company
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_COMPANY_LEN)
        .collect();

    let sanitized = sanitized.trim_matches(|c| c == '_' || c == '.').to_string();
    if sanitized.is_empty() {
        "company".to_string()
    } else {
        sanitized
    }
}

/// First line of `<program> --version`, or `None` if it can't be run.
pub async fn tool_version(program: &str) -> Option<String> {
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(Duration::from_secs(10), output).await {
        Ok(Ok(out)) if out.status.success() => String::from_utf8_lossy(&out.stdout)
            .lines()
            .next()
            .map(|line| line.trim().to_string()),
        _ => None,
    }
}
