//! CLI interface for the job application generator

use crate::config::DEFAULT_CONFIG_FILE;
use crate::input::manager::SUPPORTED_EXTENSIONS;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "job-app-generator")]
#[command(about = "Generate tailored resumes and cover letters with a local language model")]
#[command(long_about = "Paste a job listing and get a resume and cover letter filled in from your profile, \
                        with the custom sections written by a model served from LM Studio or any \
                        OpenAI-compatible endpoint. Documents are saved as markdown and, when pandoc \
                        is installed, as PDF.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

/// Options for the default generate command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Company name to use instead of the one found in the listing
    #[arg(long)]
    pub company: Option<String>,

    /// Existing resume (PDF or DOCX) used as extra context
    #[arg(short, long)]
    pub resume: Option<PathBuf>,

    /// Read the job listing from a file instead of stdin
    #[arg(short, long)]
    pub job: Option<PathBuf>,

    /// Only write markdown, skip PDF conversion
    #[arg(long)]
    pub no_pdf: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a resume and cover letter for a job listing (default)
    Generate(GenerateArgs),

    /// Fill the profile in the config file from an existing resume
    Import {
        /// Resume file (PDF or DOCX)
        resume: PathBuf,

        /// Don't copy the current config to <config>.backup first
        #[arg(long)]
        no_backup: bool,
    },

    /// List the models offered by the completion server
    Models,

    /// Create default config, templates and folders, and check dependencies
    Setup,
}

impl Cli {
    /// The command to run, treating a bare invocation as `generate`.
    pub fn command(&self) -> Commands {
        match &self.command {
            Some(Commands::Generate(args)) => Commands::Generate(args.clone()),
            Some(Commands::Import { resume, no_backup }) => Commands::Import {
                resume: resume.clone(),
                no_backup: *no_backup,
            },
            Some(Commands::Models) => Commands::Models,
            Some(Commands::Setup) => Commands::Setup,
            None => Commands::Generate(self.generate.clone()),
        }
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

pub fn validate_resume_path(path: &Path) -> Result<(), String> {
    validate_file_extension(path, SUPPORTED_EXTENSIONS)
}
