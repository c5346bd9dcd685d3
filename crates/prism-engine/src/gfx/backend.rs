use crate::geometry::VertexAttribute;
use crate::shader::LinkedProgram;

use super::{BufferId, FrameCommands, PipelineId, Topology};

/// Layout of one vertex-buffer slot of a pipeline.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct VertexBufferLayoutDesc {
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

/// Everything a backend needs to realise a render pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineDesc<'a> {
    pub label: &'a str,
    pub program: &'a LinkedProgram,
    pub buffers: &'a [VertexBufferLayoutDesc],
    pub topology: Topology,
}

/// Result of presenting one frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentOutcome {
    Presented,
    /// Transient surface problem or zero-area surface; nothing was shown.
    Skipped,
    /// The surface cannot be used again.
    Fatal,
}

/// Executes what a [`GraphicsContext`](super::GraphicsContext) records.
///
/// All validation happens in the context; a backend only allocates, frees and
/// submits.
pub trait RenderBackend {
    /// Creates (or replaces) the storage behind `id` with a copy of `bytes`.
    fn upload_vertex_buffer(&mut self, id: BufferId, label: &str, bytes: &[u8]);

    fn release_buffer(&mut self, id: BufferId);

    fn create_pipeline(&mut self, id: PipelineId, desc: &PipelineDesc<'_>);

    fn release_pipeline(&mut self, id: PipelineId);

    /// Reconfigures the presentable surface. Never called with a zero size.
    fn resize_surface(&mut self, width: u32, height: u32);

    fn present(&mut self, frame: &FrameCommands) -> PresentOutcome;
}
