//! Frame loop controller.
//!
//! A two-state machine (`Running` → `Terminated`). Each iteration polls the
//! close key, clears, binds the program and geometry, issues one draw and
//! presents. The runtime dispatches window events between iterations.

mod config;
mod frame_loop;
mod host;

pub use config::FrameLoopConfig;
pub use frame_loop::{FrameLoop, FrameState, LoopState, RenderSetup, Termination};
pub use host::WindowHost;
