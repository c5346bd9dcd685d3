//! Coordinate types.
//!
//! Surface space is physical pixels; geometry is authored in normalized device
//! coordinates and mapped onto the surface through a [`Viewport`].

mod viewport;

pub use viewport::Viewport;
