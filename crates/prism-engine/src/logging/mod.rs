//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else logs through the `log`
//! facade with `prism::<component>` targets.

mod init;

pub use init::{init_logging, LoggingConfig};
