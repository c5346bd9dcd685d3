//! Explicit graphics context.
//!
//! Replaces ambient "current binding" state with a [`GraphicsContext`] passed
//! by `&mut` to every operation. The context validates the binding discipline
//! and records per-frame commands; a [`RenderBackend`] executes them.

mod backend;
mod bindings;
mod commands;
mod context;
mod ids;

#[cfg(test)]
pub(crate) mod headless;

pub use backend::{PipelineDesc, PresentOutcome, RenderBackend, VertexBufferLayoutDesc};
pub use bindings::{BindingError, Bindings};
pub use commands::{DrawCall, FrameCommands, Topology};
pub use context::{DrawOutcome, GraphicsContext};
pub use ids::{BufferId, PipelineId, ProgramId, VertexArrayId};
