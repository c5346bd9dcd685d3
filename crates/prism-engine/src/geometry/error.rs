use thiserror::Error;

use crate::gfx::BindingError;

/// Errors raised while describing or uploading geometry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("vertex stride must be non-zero")]
    ZeroStride,

    #[error("vertex stride {0} must be a multiple of 4 and at most 2048 bytes")]
    InvalidStride(u64),

    #[error("attribute component count {0} is outside 1..=4")]
    InvalidComponentCount(u8),

    #[error("attribute slot {0} exceeds the supported range")]
    SlotOutOfRange(u32),

    #[error("attribute slot {0} is declared twice")]
    DuplicateSlot(u32),

    #[error("attribute at slot {slot} does not fit in a {stride}-byte vertex")]
    AttributeOutOfBounds { slot: u32, stride: u64 },

    #[error("attribute at slot {slot} has offset {offset}, which is not 4-byte aligned")]
    MisalignedAttribute { slot: u32, offset: u64 },

    #[error("{len} bytes of vertex data is not a multiple of the {stride}-byte stride")]
    MisalignedVertexData { len: usize, stride: u64 },

    #[error("{0} vertices exceed the addressable vertex count")]
    TooManyVertices(u64),

    #[error(transparent)]
    Binding(#[from] BindingError),
}
