use thiserror::Error;

use super::ShaderStage;

/// Shader pipeline failures.
///
/// All variants are recoverable: the program is marked unusable and the
/// failure is reported, but rendering carries on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShaderError {
    #[error("shader source `{path}` is unavailable: {reason}")]
    SourceUnavailable { path: String, reason: String },

    #[error("{stage} shader compilation failed:\n{log}")]
    CompileFailed { stage: ShaderStage, log: String },

    #[error("program link failed:\n{log}")]
    LinkFailed { log: String },
}

impl ShaderError {
    /// Diagnostic text carried by the error.
    pub fn log(&self) -> &str {
        match self {
            ShaderError::SourceUnavailable { reason, .. } => reason,
            ShaderError::CompileFailed { log, .. } | ShaderError::LinkFailed { log } => log,
        }
    }
}
