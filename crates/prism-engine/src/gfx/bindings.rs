use thiserror::Error;

use super::{BufferId, ProgramId, VertexArrayId};

/// Current binding points of a graphics context.
///
/// Every operation that depends on "what is bound" reads these; nothing is
/// ambient.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Bindings {
    pub program: Option<ProgramId>,
    pub vertex_array: Option<VertexArrayId>,
    pub array_buffer: Option<BufferId>,
}

/// Misuse of the binding discipline.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum BindingError {
    #[error("no vertex array is bound")]
    NoVertexArray,

    #[error("no array buffer is bound")]
    NoArrayBuffer,

    #[error("unknown {0}")]
    UnknownVertexArray(VertexArrayId),

    #[error("unknown {0}")]
    UnknownBuffer(BufferId),

    #[error("unknown {0}")]
    UnknownProgram(ProgramId),

    #[error("attribute slot {0} has no declared layout on the bound vertex array")]
    UndeclaredAttribute(u32),

    #[error("attribute at slot {slot} is invalid for stride {stride}")]
    InvalidAttribute { slot: u32, stride: u64 },
}
