use std::fmt::Write as _;

use crate::geometry::{AttributeFormat, ComponentType};

use super::{Builtin, CompiledStage, ShaderError, ShaderStage};

/// Validated source + entry point of one stage inside a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageModule {
    label: String,
    source: String,
    entry_point: String,
}

impl StageModule {
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }
}

impl From<CompiledStage> for StageModule {
    fn from(stage: CompiledStage) -> Self {
        Self {
            label: stage.label,
            source: stage.source,
            entry_point: stage.entry_point,
        }
    }
}

/// An executable vertex + fragment program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedProgram {
    vertex: StageModule,
    fragment: StageModule,
    vertex_inputs: Vec<(u32, AttributeFormat)>,
}

impl LinkedProgram {
    #[inline]
    pub fn vertex(&self) -> &StageModule {
        &self.vertex
    }

    #[inline]
    pub fn fragment(&self) -> &StageModule {
        &self.fragment
    }

    /// Vertex attributes the program consumes, as `(location, format)`.
    #[inline]
    pub fn vertex_inputs(&self) -> &[(u32, AttributeFormat)] {
        &self.vertex_inputs
    }
}

/// Links a vertex and a fragment stage.
///
/// Both artifacts are consumed whatever the outcome. Every interface problem is
/// collected into one log, one `error:` line each.
pub fn link(vertex: CompiledStage, fragment: CompiledStage) -> Result<LinkedProgram, ShaderError> {
    let mut log = String::new();

    if vertex.stage != ShaderStage::Vertex {
        let _ = writeln!(log, "error: `{}` is a {} stage, expected vertex", vertex.entry_point, vertex.stage);
    }
    if fragment.stage != ShaderStage::Fragment {
        let _ = writeln!(log, "error: `{}` is a {} stage, expected fragment", fragment.entry_point, fragment.stage);
    }

    if !vertex.interface.writes_builtin(Builtin::Position) {
        let _ = writeln!(
            log,
            "error: vertex stage `{}` does not write @builtin(position)",
            vertex.entry_point
        );
    }

    let mut vertex_inputs = Vec::new();
    for (location, format) in vertex.interface.location_inputs() {
        match format {
            Some(format) => vertex_inputs.push((location, format)),
            None => {
                let _ = writeln!(
                    log,
                    "error: vertex input at location {location} has a type that cannot be fed from a vertex buffer"
                );
            }
        }
    }

    for (location, read) in fragment.interface.location_inputs() {
        match vertex.interface.output_at(location) {
            None => {
                let _ = writeln!(
                    log,
                    "error: fragment input at location {location} ({}) is not written by the vertex stage",
                    describe(read)
                );
            }
            Some(written) if written != read => {
                let _ = writeln!(
                    log,
                    "error: location {location} type mismatch: vertex writes {}, fragment reads {}",
                    describe(written),
                    describe(read)
                );
            }
            Some(_) => {}
        }
    }

    match fragment.interface.output_at(0) {
        Some(Some(AttributeFormat { components: 4, ty: ComponentType::F32 })) => {}
        Some(other) => {
            let _ = writeln!(
                log,
                "error: colour output at location 0 must be vec4<f32>, found {}",
                describe(other)
            );
        }
        None => {
            let _ = writeln!(
                log,
                "error: fragment stage `{}` does not write colour location 0",
                fragment.entry_point
            );
        }
    }

    if !log.is_empty() {
        return Err(ShaderError::LinkFailed {
            log: log.trim_end().to_string(),
        });
    }

    log::debug!(
        target: "prism::shader",
        "linked `{}` + `{}` ({} vertex inputs)",
        vertex.entry_point,
        fragment.entry_point,
        vertex_inputs.len()
    );

    Ok(LinkedProgram {
        vertex: vertex.into(),
        fragment: fragment.into(),
        vertex_inputs,
    })
}

fn describe(format: Option<AttributeFormat>) -> String {
    format.map_or_else(|| "non-attribute type".to_string(), |f| f.to_string())
}
