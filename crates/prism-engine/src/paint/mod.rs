//! Colour types shared by the graphics context and the frame loop.

pub mod color;

pub use color::Color;
