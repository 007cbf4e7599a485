//! Error handling for the job application generator

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobAppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction error: {0}")]
    Extraction(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Completion API error: {0}")]
    Api(String),

    #[error("PDF conversion error: {0}")]
    Conversion(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pipeline failed at stage '{stage}': {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Box<JobAppError>,
    },
}

pub type Result<T> = std::result::Result<T, JobAppError>;

impl JobAppError {
    /// Wrap an error with the pipeline stage it aborted.
    pub fn at_stage(self, stage: PipelineStage) -> Self {
        match self {
            JobAppError::Stage { .. } => self,
            other => JobAppError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage a pipeline error was raised in, if any.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            JobAppError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error, looking through stage wrappers.
    pub fn root(&self) -> &JobAppError {
        match self {
            JobAppError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self.root(), JobAppError::Connection(_))
    }
}

/// Stages of a single generation run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    ConfigLoaded,
    ResumeParsed,
    PromptsBuilt,
    ContentGenerated,
    TemplatesRendered,
    ArtifactsExported,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::ConfigLoaded => "configuration loading",
            PipelineStage::ResumeParsed => "resume extraction",
            PipelineStage::PromptsBuilt => "prompt building",
            PipelineStage::ContentGenerated => "content generation (completion client)",
            PipelineStage::TemplatesRendered => "template rendering",
            PipelineStage::ArtifactsExported => "document export",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Classify reqwest failures into "server unreachable" and "bad response"
impl From<reqwest::Error> for JobAppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            JobAppError::Connection(err.to_string())
        } else {
            JobAppError::Api(err.to_string())
        }
    }
}

impl From<zip::result::ZipError> for JobAppError {
    fn from(err: zip::result::ZipError) -> Self {
        JobAppError::Extraction(format!("Invalid DOCX container: {}", err))
    }
}
