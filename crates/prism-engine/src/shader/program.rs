use std::path::Path;

use super::{compile, link, CompiledStage, LinkedProgram, ShaderError, StageSource};

/// Compile outcome of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Compiled,
    Failed(ShaderError),
}

/// Final link outcome of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Linked(LinkedProgram),
    Failed(ShaderError),
    /// At least one stage failed to compile, so no link was attempted.
    Skipped,
}

/// A vertex + fragment program and the outcome of building it.
///
/// An unlinked program is still a valid value: it can be registered and bound,
/// but draws against it are skipped.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    label: String,
    vertex: StageStatus,
    fragment: StageStatus,
    link: LinkStatus,
}

impl ShaderProgram {
    /// Compiles both stages and links them when both succeeded.
    pub fn build(label: impl Into<String>, vertex: &StageSource, fragment: &StageSource) -> Self {
        Self::assemble(label.into(), compile(vertex), compile(fragment))
    }

    /// Loads both stage assets from disk, then builds as [`ShaderProgram::build`].
    ///
    /// An unreadable asset counts as a failed compile for that stage.
    pub fn load(
        label: impl Into<String>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Self {
        use super::ShaderStage::{Fragment, Vertex};

        let vertex = StageSource::load(vertex_path, Vertex).and_then(|s| compile(&s));
        let fragment = StageSource::load(fragment_path, Fragment).and_then(|s| compile(&s));
        Self::assemble(label.into(), vertex, fragment)
    }

    fn assemble(
        label: String,
        vertex: Result<CompiledStage, ShaderError>,
        fragment: Result<CompiledStage, ShaderError>,
    ) -> Self {
        let (vertex_status, fragment_status, link_status) = match (vertex, fragment) {
            (Ok(vs), Ok(fs)) => {
                let link_status = match link(vs, fs) {
                    Ok(program) => LinkStatus::Linked(program),
                    Err(e) => LinkStatus::Failed(e),
                };
                (StageStatus::Compiled, StageStatus::Compiled, link_status)
            }
            (vs, fs) => (status_of(vs), status_of(fs), LinkStatus::Skipped),
        };

        let program = Self {
            label,
            vertex: vertex_status,
            fragment: fragment_status,
            link: link_status,
        };
        program.report();
        program
    }

    fn report(&self) {
        for err in self.diagnostics() {
            log::error!(target: "prism::shader", "program `{}`: {}", self.label, err);
        }
        match &self.link {
            LinkStatus::Linked(_) => {
                log::info!(target: "prism::shader", "program `{}` linked", self.label);
            }
            LinkStatus::Skipped => {
                log::warn!(
                    target: "prism::shader",
                    "program `{}` not linked: a stage failed to compile; draws will be skipped",
                    self.label
                );
            }
            LinkStatus::Failed(_) => {}
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn vertex_status(&self) -> &StageStatus {
        &self.vertex
    }

    #[inline]
    pub fn fragment_status(&self) -> &StageStatus {
        &self.fragment
    }

    #[inline]
    pub fn link_status(&self) -> &LinkStatus {
        &self.link
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        matches!(self.link, LinkStatus::Linked(_))
    }

    pub fn link_attempted(&self) -> bool {
        !matches!(self.link, LinkStatus::Skipped)
    }

    pub fn linked(&self) -> Option<&LinkedProgram> {
        match &self.link {
            LinkStatus::Linked(program) => Some(program),
            _ => None,
        }
    }

    /// Every compile and link error, vertex stage first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &ShaderError> {
        let vertex = stage_error(&self.vertex);
        let fragment = stage_error(&self.fragment);
        let link = match &self.link {
            LinkStatus::Failed(e) => Some(e),
            _ => None,
        };
        vertex.into_iter().chain(fragment).chain(link)
    }
}

fn stage_error(status: &StageStatus) -> Option<&ShaderError> {
    match status {
        StageStatus::Failed(e) => Some(e),
        StageStatus::Compiled => None,
    }
}

fn status_of(result: Result<CompiledStage, ShaderError>) -> StageStatus {
    match result {
        Ok(_) => StageStatus::Compiled,
        Err(e) => StageStatus::Failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::fixtures::{BROKEN_FS, BROKEN_VS, TRIANGLE_FS, TRIANGLE_VS};
    use crate::shader::ShaderStage;

    fn vs(text: &str) -> StageSource {
        StageSource::embedded("vs.wgsl", ShaderStage::Vertex, text)
    }

    fn fs(text: &str) -> StageSource {
        StageSource::embedded("fs.wgsl", ShaderStage::Fragment, text)
    }

    #[test]
    fn valid_sources_link() {
        let program = ShaderProgram::build("triangle", &vs(TRIANGLE_VS), &fs(TRIANGLE_FS));
        assert!(program.is_linked());
        assert!(program.link_attempted());
        assert_eq!(program.diagnostics().count(), 0);
        assert_eq!(program.linked().unwrap().vertex().entry_point(), "vs_main");
    }

    #[test]
    fn broken_fragment_leaves_program_unlinked() {
        let program = ShaderProgram::build("triangle", &vs(TRIANGLE_VS), &fs(BROKEN_FS));
        assert!(!program.is_linked());
        assert_eq!(program.vertex_status(), &StageStatus::Compiled);
        assert!(matches!(
            program.fragment_status(),
            StageStatus::Failed(ShaderError::CompileFailed { stage: ShaderStage::Fragment, .. })
        ));
        assert_eq!(program.link_status(), &LinkStatus::Skipped);
        assert!(!program.link_attempted());
    }

    #[test]
    fn both_stages_failing_reports_both() {
        let program = ShaderProgram::build("broken", &vs(BROKEN_VS), &fs(BROKEN_FS));
        assert_eq!(program.link_status(), &LinkStatus::Skipped);
        assert_eq!(program.diagnostics().count(), 2);
        assert!(program.diagnostics().all(|e| !e.log().is_empty()));
    }

    #[test]
    fn interface_mismatch_fails_link() {
        let fs_reads_varying = r#"
@fragment
fn fs_main(@location(3) c: vec4<f32>) -> @location(0) vec4<f32> {
    return c;
}
"#;
        let program = ShaderProgram::build("mismatch", &vs(TRIANGLE_VS), &fs(fs_reads_varying));
        assert!(program.link_attempted());
        assert!(!program.is_linked());
        assert!(matches!(program.link_status(), LinkStatus::Failed(ShaderError::LinkFailed { .. })));
    }

    #[test]
    fn missing_asset_counts_as_failed_stage() {
        let dir = std::env::temp_dir().join("prism-program-missing-asset");
        let program = ShaderProgram::load(
            "missing",
            dir.join("nope.vert.wgsl"),
            dir.join("nope.frag.wgsl"),
        );
        assert!(!program.is_linked());
        assert!(matches!(
            program.vertex_status(),
            StageStatus::Failed(ShaderError::SourceUnavailable { .. })
        ));
    }
}
