//! Context bootstrapper: wgpu instance, surface, adapter, device/queue.
//!
//! Bring-up runs in three steps (`GpuBootstrap::initialize`,
//! `create_surface`, `load_function_table`); any failure is a fatal
//! [`ContextError`]. The resulting [`Gpu`] is the production
//! [`RenderBackend`](crate::gfx::RenderBackend).

mod bootstrap;
mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use bootstrap::{GpuBootstrap, PendingSurface};
pub use error::{ContextError, SurfaceErrorAction};
pub use gpu::Gpu;
pub use init::GpuInit;
