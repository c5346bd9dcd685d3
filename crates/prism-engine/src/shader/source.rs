use std::path::Path;

use super::{ShaderError, ShaderStage};

/// WGSL source text for one pipeline stage.
///
/// Sources come from external text assets (`load`) or from memory
/// (`embedded`). Loaded assets are validated up front so that toolchain
/// diagnostics only ever concern the shader text itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSource {
    label: String,
    stage: ShaderStage,
    text: String,
}

impl StageSource {
    /// Upper bound on an asset's size in bytes.
    pub const MAX_LEN: usize = 1 << 20;

    pub fn embedded(label: impl Into<String>, stage: ShaderStage, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            stage,
            text: text.into(),
        }
    }

    /// Reads and validates a shader asset from disk.
    pub fn load(path: impl AsRef<Path>, stage: ShaderStage) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let label = path.display().to_string();

        let bytes = std::fs::read(path).map_err(|e| ShaderError::SourceUnavailable {
            path: label.clone(),
            reason: e.to_string(),
        })?;

        let source = Self::from_bytes(label, stage, bytes)?;
        log::debug!(target: "prism::shader", "loaded {} shader from {}", stage, source.label);
        Ok(source)
    }

    pub(crate) fn from_bytes(
        label: String,
        stage: ShaderStage,
        bytes: Vec<u8>,
    ) -> Result<Self, ShaderError> {
        let unavailable = |reason: String| ShaderError::SourceUnavailable {
            path: label.clone(),
            reason,
        };

        if bytes.len() > Self::MAX_LEN {
            return Err(unavailable(format!(
                "{} bytes exceeds the {} byte limit",
                bytes.len(),
                Self::MAX_LEN
            )));
        }

        let text = String::from_utf8(bytes)
            .map_err(|e| unavailable(format!("not valid UTF-8: {e}")))?;

        if text.trim().is_empty() {
            return Err(unavailable("file is empty".to_string()));
        }

        Ok(Self { label, stage, text })
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}
