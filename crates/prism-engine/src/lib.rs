//! Prism engine crate.
//!
//! A minimal real-time renderer: context bring-up, shader compile/link with
//! diagnostics, geometry upload with an explicit binding discipline, and a
//! frame loop driven by the winit runtime.

pub mod core;
pub mod device;
pub mod frame;
pub mod gfx;
pub mod input;
pub mod time;
pub mod window;

pub mod coords;
pub mod geometry;
pub mod logging;
pub mod paint;
pub mod shader;
