use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::{ShaderError, ShaderStage, StageInterface, StageSource};

/// A successfully compiled stage, ready to be linked.
///
/// Not `Clone`: `link` consumes stage artifacts, so none outlive a link attempt.
#[derive(Debug)]
pub struct CompiledStage {
    pub(super) stage: ShaderStage,
    pub(super) label: String,
    pub(super) source: String,
    pub(super) entry_point: String,
    pub(super) interface: StageInterface,
}

impl CompiledStage {
    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[inline]
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    #[inline]
    pub fn interface(&self) -> &StageInterface {
        &self.interface
    }
}

/// Compiles one stage: parse, validate, then locate the stage's entry point.
///
/// On failure the error carries the rendered toolchain diagnostic (source
/// label, line/column, caret), never an empty log.
pub fn compile(source: &StageSource) -> Result<CompiledStage, ShaderError> {
    let stage = source.stage();
    let text = source.text();

    let module = naga::front::wgsl::parse_str(text)
        .map_err(|e| compile_failed(source, e.emit_to_string(text)))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| compile_failed(source, e.emit_to_string(text)))?;

    let Some(entry) = module.entry_points.iter().find(|ep| ep.stage == stage.to_naga()) else {
        return Err(compile_failed(
            source,
            format!(
                "error: no {stage} entry point found\n  = note: declare a function with the `{}` attribute",
                stage.wgsl_attribute()
            ),
        ));
    };

    let interface = StageInterface::reflect(&module, entry);

    log::debug!(
        target: "prism::shader",
        "compiled {} stage `{}` from {} ({} inputs, {} outputs)",
        stage,
        entry.name,
        source.label(),
        interface.inputs.len(),
        interface.outputs.len()
    );

    Ok(CompiledStage {
        stage,
        label: source.label().to_string(),
        source: text.to_string(),
        entry_point: entry.name.clone(),
        interface,
    })
}

fn compile_failed(source: &StageSource, diagnostic: String) -> ShaderError {
    let mut log = format!("{}:\n", source.label());
    log.push_str(diagnostic.trim_end());
    ShaderError::CompileFailed {
        stage: source.stage(),
        log,
    }
}
