//! Builds a profile from an existing resume with the help of the model

use crate::config::Config;
use crate::error::{JobAppError, Result};
use crate::input::ResumeExtractor;
use crate::llm::client::Completer;
use crate::llm::prompts::{professional_title_prompt, resume_parse_prompt, RESUME_PARSER_SYSTEM_PROMPT};
use crate::llm::response::clean_professional_title;
use crate::processing::listing::{ProfessionalTitle, FALLBACK_PROFESSIONAL_TITLE};
use crate::profile::{DegreeStatus, Profile};
use chrono::Datelike;
use log::{debug, info, warn};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};

const REQUIRED_KEYS: &[&str] = &["personal_info", "skills", "experience"];

const IN_PROGRESS_HINTS: &[&str] = &[
    "in progress",
    "in-progress",
    "currently enrolled",
    "pursuing",
    "working toward",
    "candidate for",
];
const EXPECTED_HINTS: &[&str] = &[
    "expected graduation",
    "expected completion",
    "anticipated graduation",
    "will graduate",
    "graduating",
    "expected",
];

/// Result of a successful import
#[derive(Debug)]
pub struct ImportOutcome {
    pub config: Config,
    pub config_path: PathBuf,
    pub backup_path: Option<PathBuf>,
}

pub struct ResumeImporter<C> {
    completer: C,
    extractor: ResumeExtractor,
    titles: ProfessionalTitle,
    json_object: Regex,
}

impl<C: Completer> ResumeImporter<C> {
    pub fn new(completer: C) -> Self {
        Self {
            completer,
            extractor: ResumeExtractor::new(),
            titles: ProfessionalTitle::new(),
            json_object: Regex::new(r"(?s)\{.*\}").expect("Invalid JSON object regex"),
        }
    }

    /// Extract, parse and save: the config at `config_path` keeps its model,
    /// path and PDF settings and takes the profile found in the resume.
    pub async fn import(
        &self,
        resume: &Path,
        config_path: &Path,
        backup: bool,
    ) -> Result<ImportOutcome> {
        let text = self.extractor.extract(resume).await?;
        let profile = self.parse_text(&text).await?;

        let mut config = if config_path.exists() {
            Config::load(config_path)?
        } else {
            Config::default()
        };
        config.profile = profile;

        let backup_path = if backup {
            Config::backup(config_path)?
        } else {
            None
        };
        if let Some(path) = &backup_path {
            info!("Backed up existing config to {}", path.display());
        }

        config.save(config_path)?;
        info!("Config updated from resume: {}", config_path.display());

        Ok(ImportOutcome {
            config,
            config_path: config_path.to_path_buf(),
            backup_path,
        })
    }

    pub async fn parse_text(&self, resume_text: &str) -> Result<Profile> {
        if resume_text.trim().is_empty() {
            return Err(JobAppError::Extraction(
                "No text could be extracted from the resume".to_string(),
            ));
        }

        let response = self
            .completer
            .complete_with_system(RESUME_PARSER_SYSTEM_PROMPT, &resume_parse_prompt(resume_text))
            .await?;

        let mut profile = self.parse_response(&response, resume_text, chrono::Local::now().year())?;
        if ProfessionalTitle::needs_replacing(&profile.personal_info.field) {
            profile.personal_info.field = self.professional_title(resume_text).await;
        }
        Ok(profile)
    }

    /// Patterns in the resume first, then the model, then a generic fallback.
    pub async fn professional_title(&self, resume_text: &str) -> String {
        if let Some(title) = self.titles.from_resume(resume_text) {
            debug!("Professional title from resume: {}", title);
            return title;
        }

        match self.completer.complete(&professional_title_prompt(resume_text)).await {
            Ok(raw) => match clean_professional_title(&raw) {
                Some(title) => return title,
                None => warn!("Model reply '{}' is not a professional title", raw.trim()),
            },
            Err(e) => warn!("Could not ask the model for a professional title: {}", e),
        }
        FALLBACK_PROFESSIONAL_TITLE.to_string()
    }

    /// Turn the model's reply into a profile. A missing or generic `field`
    /// is left as the model gave it.
    pub fn parse_response(
        &self,
        response: &str,
        resume_text: &str,
        current_year: i32,
    ) -> Result<Profile> {
        let json = self
            .json_object
            .find(response)
            .map(|m| m.as_str())
            .unwrap_or(response);

        let mut value: Value = serde_json::from_str(json)
            .map_err(|e| JobAppError::Api(format!("Model returned invalid JSON: {}", e)))?;

        for key in REQUIRED_KEYS {
            if value.get(key).is_none() {
                return Err(JobAppError::Api(format!("Parsed resume is missing '{}'", key)));
            }
        }

        let raw_status = value
            .get_mut("personal_info")
            .and_then(Value::as_object_mut)
            .and_then(|info| info.remove("degree_status"))
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let mut profile: Profile = serde_json::from_value(value)
            .map_err(|e| JobAppError::Api(format!("Parsed resume has an unexpected shape: {}", e)))?;

        let info = &mut profile.personal_info;
        info.degree_status = if raw_status.trim().is_empty() {
            infer_degree_status(resume_text, &info.graduation_year, current_year)
        } else {
            DegreeStatus::parse(&raw_status).unwrap_or_else(|| {
                warn!("Unknown degree status '{}', assuming completed", raw_status);
                DegreeStatus::Completed
            })
        };

        Ok(profile)
    }
}

/// Guess the degree status from wording in the resume, then from the
/// graduation year relative to `current_year`.
pub fn infer_degree_status(resume_text: &str, graduation_year: &str, current_year: i32) -> DegreeStatus {
    let lower = resume_text.to_lowercase();
    if IN_PROGRESS_HINTS.iter().any(|hint| lower.contains(hint)) {
        return DegreeStatus::InProgress;
    }
    if EXPECTED_HINTS.iter().any(|hint| lower.contains(hint)) {
        return DegreeStatus::Expected;
    }

    match graduation_year.trim().parse::<i32>() {
        Ok(year) if year > current_year => DegreeStatus::Expected,
        _ => DegreeStatus::Completed,
    }
}
