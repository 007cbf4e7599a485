//! Configuration management for the job application generator

use crate::error::{JobAppError, Result};
use crate::output::exporter::PdfEngine;
use crate::profile::Profile;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lm_studio: ModelSettings,
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub pdf: PdfConfig,
}

/// Connection settings for the OpenAI-compatible completion server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub enabled: bool,
    pub engines: Vec<PdfEngine>,
    pub timeout_secs: u64,
    pub margin: String,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_context_window() -> usize {
    8192
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234/v1".to_string(),
            model: "local-model".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout_secs: default_timeout_secs(),
            context_window: default_context_window(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engines: PdfEngine::preference_order().to_vec(),
            timeout_secs: 120,
            margin: "0.75in".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lm_studio: ModelSettings::default(),
            profile: Profile::default(),
            paths: PathsConfig::default(),
            pdf: PdfConfig::default(),
        }
    }
}

impl Config {
    /// Load the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content).map_err(|e| {
                JobAppError::Configuration(format!(
                    "Failed to parse config '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            warn!(
                "Config file {} not found, writing defaults. Edit it with your own details.",
                path.display()
            );
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| {
            JobAppError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Copy the config at `path` to `<path>.backup`, returning the backup path.
    pub fn backup(path: &Path) -> Result<Option<PathBuf>> {
        if !path.exists() {
            return Ok(None);
        }
        let mut backup = path.as_os_str().to_owned();
        backup.push(".backup");
        let backup = PathBuf::from(backup);
        std::fs::copy(path, &backup)?;
        Ok(Some(backup))
    }

    pub fn templates_dir(&self) -> &Path {
        &self.paths.templates_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.paths.output_dir
    }
}
