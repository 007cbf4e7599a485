//! One job application run: resume, prompts, generation, templates, export

use crate::config::Config;
use crate::error::{JobAppError, PipelineStage, Result};
use crate::input::ResumeExtractor;
use crate::llm::client::{Completer, CompletionClient};
use crate::llm::prompts::{job_title_prompt, PromptBuilder, PromptInput};
use crate::llm::response::{clean_job_title, ResponseCleaner};
use crate::output::exporter::{DocumentExporter, PandocConverter, PdfConverter};
use crate::output::report::{ApplicationReport, RunWarning};
use crate::output::template::{strip_empty_bullets, TemplateRenderer, TemplateStore};
use crate::processing::document::{DocumentKind, GeneratedContent};
use crate::processing::listing::{ListingAnalyzer, FALLBACK_JOB_TITLE};
use crate::processing::variables::build_substitutions;
use chrono::{Local, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Inputs for a single run
#[derive(Debug, Clone, Default)]
pub struct ApplicationRequest {
    pub job_listing: String,
    pub company_override: Option<String>,
    pub resume_path: Option<PathBuf>,
    /// Timestamp used in output file names; the current local time if unset
    pub timestamp: Option<NaiveDateTime>,
}

impl ApplicationRequest {
    pub fn new(job_listing: impl Into<String>) -> Self {
        Self {
            job_listing: job_listing.into(),
            ..Self::default()
        }
    }
}

pub struct Pipeline<C, P> {
    config: Config,
    completer: C,
    exporter: DocumentExporter<P>,
    prompts: PromptBuilder,
    templates: TemplateStore,
    renderer: TemplateRenderer,
    cleaner: ResponseCleaner,
    listing: ListingAnalyzer,
    extractor: ResumeExtractor,
    show_progress: bool,
}

impl Pipeline<CompletionClient, PandocConverter> {
    /// Pipeline talking to the configured model server and pandoc.
    pub fn from_config(config: Config) -> Result<Self> {
        let client = CompletionClient::new(config.lm_studio.clone())
            .map_err(|e| e.at_stage(PipelineStage::ConfigLoaded))?;
        let converter = PandocConverter::new(&config.pdf);
        Ok(Self::new(config, client, converter))
    }

    pub fn from_config_file(path: &Path) -> Result<Self> {
        let config = Config::load(path).map_err(|e| e.at_stage(PipelineStage::ConfigLoaded))?;
        Self::from_config(config)
    }
}

impl<C: Completer, P: PdfConverter> Pipeline<C, P> {
    pub fn new(config: Config, completer: C, converter: P) -> Self {
        Self {
            exporter: DocumentExporter::new(config.output_dir(), converter, &config.pdf),
            prompts: PromptBuilder::new(&config.lm_studio),
            templates: TemplateStore::new(config.templates_dir()),
            renderer: TemplateRenderer::new(),
            cleaner: ResponseCleaner::new(),
            listing: ListingAnalyzer::new(),
            extractor: ResumeExtractor::new(),
            show_progress: false,
            completer,
            config,
        }
    }

    /// Show a console spinner while the run is in progress.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn completer(&self) -> &C {
        &self.completer
    }

    pub async fn run(&self, request: &ApplicationRequest) -> Result<ApplicationReport> {
        let progress = self.progress_bar();
        let result = self.run_stages(request, &progress).await;
        match &result {
            Ok(_) => progress.finish_and_clear(),
            Err(e) => progress.abandon_with_message(format!("❌ {}", e)),
        }
        result
    }

    async fn run_stages(
        &self,
        request: &ApplicationRequest,
        progress: &ProgressBar,
    ) -> Result<ApplicationReport> {
        let timestamp = request
            .timestamp
            .unwrap_or_else(|| Local::now().naive_local());

        let extracted_resume = match &request.resume_path {
            Some(path) => {
                progress.set_message(format!("Reading resume {}", path.display()));
                let text = self
                    .extractor
                    .extract(path)
                    .await
                    .map_err(|e| e.at_stage(PipelineStage::ResumeParsed))?;
                Some(text)
            }
            None => None,
        };

        progress.set_message("Analyzing job listing");
        let listing = request.job_listing.trim();
        if listing.is_empty() {
            return Err(JobAppError::InvalidInput("Job listing is empty".to_string())
                .at_stage(PipelineStage::PromptsBuilt));
        }

        let mut warnings = Vec::new();
        let job_title = match self.resolve_job_title(listing).await {
            Ok(title) => title,
            Err(reason) => {
                warn!("Falling back to '{}': {}", FALLBACK_JOB_TITLE, reason);
                warnings.push(RunWarning::JobTitleFallback(reason));
                FALLBACK_JOB_TITLE.to_string()
            }
        };
        let company = self
            .listing
            .resolve_company(listing, request.company_override.as_deref());
        info!("Target: {} at {}", job_title, company);

        let input = PromptInput {
            profile: &self.config.profile,
            job_listing: listing,
            extracted_resume: extracted_resume.as_deref(),
            job_title: &job_title,
            company: &company,
        };
        let prompts = DocumentKind::ALL
            .iter()
            .map(|kind| self.prompts.build(&input, *kind).map(|p| (*kind, p)))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.at_stage(PipelineStage::PromptsBuilt))?;

        let mut content = GeneratedContent::default();
        for (kind, prompt) in &prompts {
            progress.set_message(format!("Generating {} content", kind));
            debug!("{} prompt is {} bytes", kind, prompt.len());
            let raw = self
                .completer
                .complete(prompt)
                .await
                .map_err(|e| e.at_stage(PipelineStage::ContentGenerated))?;

            let cleaned = self.cleaner.clean(&raw, *kind);
            content.set(*kind, if cleaned.is_empty() { raw.trim().to_string() } else { cleaned });
        }

        progress.set_message("Filling templates");
        let substitutions =
            build_substitutions(&self.config.profile, &job_title, &company, &content);
        let mut rendered = Vec::new();
        for kind in DocumentKind::ALL {
            let template = self
                .templates
                .load(kind)
                .map_err(|e| e.at_stage(PipelineStage::TemplatesRendered))?;
            let (text, placeholders) = self.renderer.render_tracked(&template, &substitutions);
            let text = strip_empty_bullets(&text);

            if !placeholders.is_empty() {
                warn!("Unresolved placeholders in {}: {:?}", kind, placeholders);
                warnings.push(RunWarning::TemplateMismatch { kind, placeholders });
            }
            rendered.push((kind, text));
        }

        progress.set_message("Saving documents");
        let mut report = ApplicationReport::new(job_title, company);
        for (kind, text) in &rendered {
            let document = self
                .exporter
                .export(text, *kind, &report.company, &timestamp)
                .await
                .map_err(|e| e.at_stage(PipelineStage::ArtifactsExported))?;

            if let Some(message) = &document.pdf_warning {
                warnings.push(RunWarning::Conversion {
                    kind: *kind,
                    message: message.clone(),
                });
            }
            report.documents.push(document);
        }

        report.warnings = warnings;
        info!("Run finished ({})", PipelineStage::Done);
        Ok(report)
    }

    /// Pattern match first, then ask the model.
    async fn resolve_job_title(&self, listing: &str) -> std::result::Result<String, String> {
        if let Some(title) = self.listing.job_title(listing) {
            debug!("Job title from listing: {}", title);
            return Ok(title);
        }

        let raw = self
            .completer
            .complete(&job_title_prompt(listing))
            .await
            .map_err(|e| e.to_string())?;

        clean_job_title(&raw).ok_or_else(|| format!("model reply '{}' is not a job title", raw.trim()))
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::exporter::PdfEngine;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Returns canned replies in order and records the prompts it saw
    struct ScriptedCompleter {
        replies: Mutex<Vec<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCompleter {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl Completer for ScriptedCompleter {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                Err(JobAppError::Api("no scripted reply".to_string()))
            } else {
                replies.remove(0)
            }
        }

        async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String> {
            self.complete(&format!("{}\n\n{}", system, prompt)).await
        }
    }

    struct NoPdf;

    impl PdfConverter for NoPdf {
        async fn convert(&self, _markdown: &Path, _pdf: &Path, engine: PdfEngine) -> Result<()> {
            Err(JobAppError::Conversion(format!("{} unavailable", engine)))
        }
    }

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.paths.templates_dir = dir.join("templates");
        config.paths.output_dir = dir.join("output");
        config
    }

    fn request(listing: &str) -> ApplicationRequest {
        ApplicationRequest {
            job_listing: listing.to_string(),
            company_override: Some("Acme".to_string()),
            resume_path: None,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_opt(12, 0, 0)),
        }
    }

    #[tokio::test]
    async fn test_full_run_writes_both_documents() {
        let dir = TempDir::new().unwrap();
        let completer = ScriptedCompleter::new(vec![
            Ok("Here is a summary:\nRust engineer focused on reliable services.".to_string()),
            Ok("Dear Hiring Manager,\n\nMy work on async Rust at Initech matches what Acme needs for this role.\n\nSincerely,\nMe".to_string()),
        ]);
        let pipeline = Pipeline::new(config_in(dir.path()), completer, NoPdf);

        let report = pipeline
            .run(&request("Job Title: Backend Engineer\nWe use tokio."))
            .await
            .unwrap();

        assert_eq!(report.job_title, "Backend Engineer");
        assert_eq!(report.company, "Acme");
        assert_eq!(report.documents.len(), 2);

        let resume = report.document(DocumentKind::Resume).unwrap();
        assert!(resume.markdown_path.ends_with("resume_Acme_20240101_120000.md"));
        let text = std::fs::read_to_string(&resume.markdown_path).unwrap();
        assert!(text.contains("Rust engineer focused on reliable services."));
        assert!(!text.contains("{{"));

        let letter = report.document(DocumentKind::CoverLetter).unwrap();
        let text = std::fs::read_to_string(&letter.markdown_path).unwrap();
        assert!(text.contains("My work on async Rust at Initech"));
        assert!(text.contains("Backend Engineer position at Acme"));

        let conversion_warnings = report
            .warnings
            .iter()
            .filter(|w| matches!(w, RunWarning::Conversion { .. }))
            .count();
        assert_eq!(conversion_warnings, 2);
    }

    #[tokio::test]
    async fn test_title_falls_back_when_model_reply_is_unusable() {
        let dir = TempDir::new().unwrap();
        let completer = ScriptedCompleter::new(vec![
            Ok("?".to_string()),
            Ok("A summary paragraph.".to_string()),
            Ok("A cover letter paragraph that is long enough to be kept as the body.".to_string()),
        ]);
        let pipeline = Pipeline::new(config_in(dir.path()), completer, NoPdf);

        let report = pipeline.run(&request("great benefits, apply now")).await.unwrap();

        assert_eq!(report.job_title, FALLBACK_JOB_TITLE);
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, RunWarning::JobTitleFallback(_))));
    }

    #[tokio::test]
    async fn test_template_mismatch_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        std::fs::create_dir_all(config.templates_dir()).unwrap();
        std::fs::write(
            config.templates_dir().join("resume_template.md"),
            "{{CustomSummary}} {{Unknown}}",
        )
        .unwrap();
        let completer = ScriptedCompleter::new(vec![
            Ok("Summary.".to_string()),
            Ok("Paragraph.".to_string()),
        ]);
        let pipeline = Pipeline::new(config, completer, NoPdf);

        let report = pipeline
            .run(&request("Position: Data Engineer"))
            .await
            .unwrap();

        let resume = report.document(DocumentKind::Resume).unwrap();
        assert_eq!(
            std::fs::read_to_string(&resume.markdown_path).unwrap(),
            "Summary. {{Unknown}}"
        );
        assert!(report.warnings.contains(&RunWarning::TemplateMismatch {
            kind: DocumentKind::Resume,
            placeholders: vec!["Unknown".to_string()],
        }));
    }

    #[tokio::test]
    async fn test_braces_in_model_reply_are_not_a_mismatch() {
        let dir = TempDir::new().unwrap();
        let completer = ScriptedCompleter::new(vec![
            Ok("Built {{mustache}} templating for internal docs.".to_string()),
            Ok("I maintained the {{handlebars}} helpers that power Acme's email templates today.".to_string()),
        ]);
        let pipeline = Pipeline::new(config_in(dir.path()), completer, NoPdf);

        let report = pipeline
            .run(&request("Position: Data Engineer"))
            .await
            .unwrap();

        let resume = report.document(DocumentKind::Resume).unwrap();
        let text = std::fs::read_to_string(&resume.markdown_path).unwrap();
        assert!(text.contains("Built {{mustache}} templating"));
        assert!(!report
            .warnings
            .iter()
            .any(|w| matches!(w, RunWarning::TemplateMismatch { .. })));
    }

    #[tokio::test]
    async fn test_empty_listing_stops_before_any_completion() {
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::new(config_in(dir.path()), ScriptedCompleter::new(vec![]), NoPdf);

        let err = pipeline.run(&request("   ")).await.unwrap_err();

        assert_eq!(err.stage(), Some(PipelineStage::PromptsBuilt));
        assert!(matches!(err.root(), JobAppError::InvalidInput(_)));
        assert!(pipeline.completer().prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_names_stage_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let completer = ScriptedCompleter::new(vec![Err(JobAppError::Connection(
            "refused".to_string(),
        ))]);
        let pipeline = Pipeline::new(config_in(dir.path()), completer, NoPdf);

        let err = pipeline
            .run(&request("Job Title: Backend Engineer"))
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(PipelineStage::ContentGenerated));
        assert!(err.is_connection());
        assert!(!dir.path().join("output").exists());
    }
}
