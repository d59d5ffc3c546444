//! Error taxonomy shared by every stage and collaborator.

use std::path::PathBuf;

/// Why a generator reply could not be turned into a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedKind {
    /// No `{`/`}` pair anywhere in the reply.
    NoJsonFound,
    /// A candidate object was found but did not parse.
    InvalidJson(String),
}

impl std::fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoJsonFound => write!(f, "no JSON object found"),
            Self::InvalidJson(reason) => write!(f, "invalid JSON: {}", reason),
        }
    }
}

/// Errors raised by pipeline stages and their collaborators.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("transport error calling {service}: {message}")]
    Transport { service: String, message: String },

    #[error("malformed generator output ({kind})")]
    MalformedOutput { kind: MalformedKind, raw_text: String },

    #[error("validation failed in {stage}: {message}")]
    Validation { stage: String, message: String },

    #[error("missing prerequisite {}: {hint}", path.display())]
    MissingPrerequisite { path: PathBuf, hint: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn transport(service: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub fn validation(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Parse and shape failures; the only errors a best-effort stage may absorb.
    pub fn is_output_error(&self) -> bool {
        matches!(self, Self::MalformedOutput { .. } | Self::Validation { .. })
    }

    /// Raw generator text carried by a malformed-output error.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::MalformedOutput { raw_text, .. } => Some(raw_text),
            _ => None,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
