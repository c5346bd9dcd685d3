//! Core engine-facing contracts.
//!
//! The stable interface between the runtime (platform loop) and the binary
//! that drives it.

mod app;

pub use app::App;
