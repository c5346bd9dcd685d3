//! Geometry buffer management.
//!
//! Uploads raw vertex bytes into GPU-resident storage and records how they map
//! to shader inputs in a persistent vertex array, so drawing only needs to
//! re-bind that vertex array.

mod buffer;
mod error;
mod layout;

pub use buffer::GeometryBuffer;
pub use error::GeometryError;
pub use layout::{AttributeFormat, AttributeLayout, ComponentType, VertexAttribute};
