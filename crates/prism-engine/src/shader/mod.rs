//! Shader pipeline builder.
//!
//! Two-phase contract:
//! - `compile` turns one stage's WGSL source into a validated stage artifact
//! - `link` consumes a vertex and a fragment artifact and checks the
//!   inter-stage interface, producing a `LinkedProgram`
//!
//! Failures never panic; they carry the toolchain's rendered diagnostic log.
//! `ShaderProgram::build` runs both phases and records the outcome, skipping
//! the link when either stage failed.

mod compile;
mod error;
mod interface;
mod link;
mod program;
mod source;
mod stage;

pub use compile::{compile, CompiledStage};
pub use error::ShaderError;
pub use interface::{Builtin, InterfaceSlot, StageInterface};
pub use link::{link, LinkedProgram, StageModule};
pub use program::{LinkStatus, ShaderProgram, StageStatus};
pub use source::StageSource;
pub use stage::ShaderStage;

#[cfg(test)]
pub(crate) mod fixtures {
    //! WGSL sources shared by tests across the crate.

    pub const TRIANGLE_VS: &str = r#"
@vertex
fn vs_main(@location(0) a_pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(a_pos.x, a_pos.y, a_pos.z, 1.0);
}
"#;

    pub const TRIANGLE_FS: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.5, 0.2, 1.0);
}
"#;

    /// Fragment stage missing its closing brace.
    pub const BROKEN_FS: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.5, 0.2, 1.0);
"#;

    /// Vertex stage with a syntax error.
    pub const BROKEN_VS: &str = r#"
@vertex
fn vs_main(@location(0) a_pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(a_pos, 1.0)
}
"#;
}
