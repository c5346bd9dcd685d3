use anyhow::Result;

use crate::frame::{FrameLoopConfig, RenderSetup};
use crate::gfx::{GraphicsContext, RenderBackend};

/// Application contract implemented by binaries.
pub trait App {
    /// One-time setup once the graphics context exists: build the program,
    /// upload the geometry, register resize observers.
    ///
    /// An error here is fatal; the runtime exits before the first frame.
    fn setup<B: RenderBackend>(&mut self, gfx: &mut GraphicsContext<B>) -> Result<RenderSetup>;

    fn frame_config(&self) -> FrameLoopConfig {
        FrameLoopConfig::default()
    }
}
