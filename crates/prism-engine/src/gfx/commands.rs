use crate::coords::Viewport;
use crate::paint::Color;

use super::{BufferId, PipelineId};

/// Primitive assembly mode of a draw.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Topology {
    #[default]
    TriangleList,
    TriangleStrip,
    LineList,
    PointList,
}

impl Topology {
    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
            Topology::LineList => wgpu::PrimitiveTopology::LineList,
            Topology::PointList => wgpu::PrimitiveTopology::PointList,
        }
    }
}

/// One validated draw, ready for the backend.
///
/// `vertex_buffers[i]` feeds vertex-buffer slot `i` of `pipeline`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub pipeline: PipelineId,
    pub vertex_buffers: Vec<BufferId>,
    pub first_vertex: u32,
    pub vertex_count: u32,
}

/// Everything recorded for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameCommands {
    /// Clear colour for the frame; `None` keeps the previous contents.
    pub clear: Option<Color>,
    pub viewport: Viewport,
    pub draws: Vec<DrawCall>,
}

impl FrameCommands {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            clear: None,
            viewport,
            draws: Vec::new(),
        }
    }
}
