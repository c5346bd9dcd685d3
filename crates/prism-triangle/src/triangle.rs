use std::path::PathBuf;

use anyhow::{Context, Result};

use prism_engine::core::App;
use prism_engine::frame::RenderSetup;
use prism_engine::geometry::{AttributeLayout, GeometryBuffer};
use prism_engine::gfx::{GraphicsContext, RenderBackend};
use prism_engine::shader::{ShaderProgram, ShaderStage, StageSource};

/// Environment variable overriding the shader asset directory.
pub const SHADER_DIR_ENV: &str = "PRISM_SHADER_DIR";

const VERTEX_FILE: &str = "triangle.vert.wgsl";
const FRAGMENT_FILE: &str = "triangle.frag.wgsl";

const EMBEDDED_VS: &str = include_str!("../assets/shaders/triangle.vert.wgsl");
const EMBEDDED_FS: &str = include_str!("../assets/shaders/triangle.frag.wgsl");

/// Three vertices in normalized device coordinates, z = 0.
const VERTICES: [[f32; 3]; 3] = [
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [0.0, 0.5, 0.0],
];

/// Draws one orange triangle.
#[derive(Debug, Default)]
pub struct TriangleApp;

impl TriangleApp {
    fn shader_dir() -> PathBuf {
        std::env::var_os(SHADER_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/shaders"))
    }

    fn build_program() -> ShaderProgram {
        let dir = Self::shader_dir();
        if dir.is_dir() {
            log::info!("loading shaders from {}", dir.display());
            return ShaderProgram::load("triangle", dir.join(VERTEX_FILE), dir.join(FRAGMENT_FILE));
        }

        log::info!("{} not found; using built-in shaders", dir.display());
        ShaderProgram::build(
            "triangle",
            &StageSource::embedded(VERTEX_FILE, ShaderStage::Vertex, EMBEDDED_VS),
            &StageSource::embedded(FRAGMENT_FILE, ShaderStage::Fragment, EMBEDDED_FS),
        )
    }
}

impl App for TriangleApp {
    fn setup<B: RenderBackend>(&mut self, gfx: &mut GraphicsContext<B>) -> Result<RenderSetup> {
        gfx.on_resize(|width, height| log::debug!("framebuffer resized to {width}x{height}"));

        let program = gfx.create_program(Self::build_program());

        let geometry = GeometryBuffer::upload_vertices(
            gfx,
            "triangle vertices",
            &VERTICES,
            AttributeLayout::position3f(),
        )
        .context("failed to upload triangle geometry")?;

        Ok(RenderSetup { program, geometry })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_shaders_link() {
        let program = ShaderProgram::build(
            "triangle",
            &StageSource::embedded(VERTEX_FILE, ShaderStage::Vertex, EMBEDDED_VS),
            &StageSource::embedded(FRAGMENT_FILE, ShaderStage::Fragment, EMBEDDED_FS),
        );
        assert!(program.is_linked());
    }

    #[test]
    fn asset_files_load_and_link() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/shaders");
        let program = ShaderProgram::load("triangle", dir.join(VERTEX_FILE), dir.join(FRAGMENT_FILE));
        assert!(program.is_linked());
    }

    #[test]
    fn vertex_data_is_three_tightly_packed_positions() {
        let bytes: &[u8] = bytemuck::cast_slice(&VERTICES);
        assert_eq!(bytes.len(), 36);
        assert_eq!(AttributeLayout::position3f().vertex_count(bytes.len()), Ok(3));
    }
}
