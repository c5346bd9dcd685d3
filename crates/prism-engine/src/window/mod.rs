//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, brings up the graphics context and
//! drives the frame loop once per redraw.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
